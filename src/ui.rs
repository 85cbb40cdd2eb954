use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode, Role, Status, EXAMPLE_PROMPTS};
use crate::theme::Palette;

const EXAMPLE_ICONS: [&str; 4] = ["🌤️", "☀️", "🌧️", "🌡️"];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.theme.palette();

    // Main layout: header, conversation, input, footer
    let [header_area, body_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background)),
        area,
    );

    render_header(app, frame, header_area, &palette);

    if app.messages.is_empty() {
        render_welcome(app, frame, body_area, &palette);
    } else {
        render_chat(app, frame, body_area, &palette);
    }

    render_input(app, frame, input_area, &palette);
    render_footer(app, frame, footer_area, &palette);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let [title_area, theme_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(12),
    ])
    .areas(area);

    let title = Line::from(vec![
        Span::styled(" ☁ 天气助手 ", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(palette.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    let theme_indicator = Line::from(Span::styled(
        format!("{} {} ", app.theme.glyph(), app.theme.label()),
        Style::default().fg(palette.muted),
    ));
    frame.render_widget(
        Paragraph::new(theme_indicator).alignment(Alignment::Right),
        theme_area,
    );
}

/// Empty conversation: welcome banner and the example-prompt grid.
fn render_welcome(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let [_, banner_area, grid_area, _] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Min(0),
    ])
    .areas(area);

    let banner = Text::from(vec![
        Line::from(Span::styled(
            "欢迎使用天气助手",
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "询问任何城市的天气情况，我会为您提供实时的天气信息和预报",
            Style::default().fg(palette.muted),
        )),
    ]);
    frame.render_widget(
        Paragraph::new(banner).alignment(Alignment::Center),
        banner_area,
    );

    let [top_row, bottom_row] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(4),
    ])
    .areas(grid_area);

    let cells: [Rect; 4] = {
        let [a, b] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(top_row);
        let [c, d] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(bottom_row);
        [a, b, c, d]
    };

    for (i, (prompt, cell)) in EXAMPLE_PROMPTS.iter().zip(cells).enumerate() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border));
        let body = Text::from(vec![
            Line::from(vec![
                Span::styled(
                    format!(" {} ", i + 1),
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                ),
                Span::raw(EXAMPLE_ICONS[i]),
            ]),
            Line::from(Span::styled(
                format!(" {}", prompt),
                Style::default().fg(palette.text),
            )),
        ]);
        frame.render_widget(Paragraph::new(body).block(block), cell);
    }

    // The grid doubles as the chat viewport baseline before any message
    app.chat_height = area.height;
    app.chat_width = area.width;
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();

    for message in &app.messages {
        match message.role {
            Role::User => {
                lines.push(
                    Line::from(Span::styled(
                        "你",
                        Style::default()
                            .fg(palette.user_label)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Right),
                );
                for line in message.text().lines() {
                    lines.push(
                        Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(palette.text),
                        ))
                        .alignment(Alignment::Right),
                    );
                }
                lines.push(Line::default());
            }
            Role::Assistant => {
                lines.push(Line::from(Span::styled(
                    "AI",
                    Style::default()
                        .fg(palette.assistant_label)
                        .add_modifier(Modifier::BOLD),
                )));
                let content = message.text();
                for line in content.lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(palette.text),
                    )));
                }
                if content.is_empty() && app.awaiting_first_content() {
                    // Animated ellipsis: cycles through ".", "..", "..."
                    let dots = ".".repeat((app.animation_frame as usize) + 1);
                    lines.push(Line::from(Span::styled(
                        format!("正在思考{}", dots),
                        Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
                    )));
                }
                lines.push(Line::default());
            }
        }
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let busy = app.status != Status::Ready;
    let border_color = if busy {
        palette.muted
    } else if app.input_mode == InputMode::Editing {
        palette.border_active
    } else {
        palette.border
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = if visible_text.is_empty() && app.input_mode == InputMode::Normal {
        let placeholder = if busy { "等待回复..." } else { "询问任何城市的天气..." };
        Paragraph::new(placeholder)
            .style(Style::default().fg(palette.muted))
            .block(input_block)
    } else {
        Paragraph::new(visible_text)
            .style(Style::default().fg(palette.text))
            .block(input_block)
    };

    frame.render_widget(input, area);

    // Show cursor when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let key_style = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(palette.muted);

    let mut hints: Vec<Span> = Vec::new();

    match app.status {
        Status::Submitting => hints.push(Span::styled(" 连接中... ", label_style)),
        Status::Streaming => hints.push(Span::styled(" 回复中... ", label_style)),
        Status::Ready => {}
    }

    match app.input_mode {
        InputMode::Normal => {
            if app.messages.is_empty() && app.status == Status::Ready {
                hints.extend(vec![
                    Span::styled(" 1-4 ", key_style),
                    Span::styled(" 示例 ", label_style),
                ]);
            } else {
                hints.extend(vec![
                    Span::styled(" j/k ", key_style),
                    Span::styled(" 滚动 ", label_style),
                ]);
            }
            if app.status == Status::Ready {
                hints.extend(vec![
                    Span::styled(" i ", key_style),
                    Span::styled(" 输入 ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" t ", key_style),
                Span::styled(" 主题 ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" 退出 ", label_style),
            ]);
        }
        InputMode::Editing => {
            hints.extend(vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" 发送 ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" 取消 ", label_style),
            ]);
        }
    }

    let [hints_area, credit_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(20),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(Line::from(hints)), hints_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "由 Mastra AI 驱动 ",
            Style::default().fg(palette.muted),
        )))
        .alignment(Alignment::Right),
        credit_area,
    );
}
