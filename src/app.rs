use serde::Serialize;

use crate::agent::{AgentClient, StreamEvent};
use crate::config::Config;
use crate::theme::ThemePreference;

/// Example prompts offered while the conversation is empty. Picking one is
/// equivalent to typing it and pressing Enter.
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "深圳天气怎么样？",
    "北京今天的天气如何？",
    "上海明天会下雨吗？",
    "广州的气温是多少？",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Whether a send may be accepted. Only one request is ever in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Ready,
    Submitting,
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Tagged content part. Only text exists today; the wire may carry more.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Concatenation of all text parts, in arrival order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            let Part::Text { text } = part;
            out.push_str(text);
        }
        out
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub status: Status,

    // Conversation state, append-only
    pub messages: Vec<Message>,
    next_message_id: u64,

    // Input state
    pub input: String,
    pub input_cursor: usize, // char index into input

    // Chat viewport, updated during render for scroll calculations
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state for the loading indicator
    pub animation_frame: u8,

    pub theme: ThemePreference,
    pub agent: AgentClient,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            status: Status::Ready,
            messages: Vec::new(),
            next_message_id: 0,
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            theme: config.resolved_theme(),
            agent: AgentClient::new(&config.resolved_api_url()),
        }
    }

    fn next_id(&mut self) -> String {
        self.next_message_id += 1;
        format!("msg-{}", self.next_message_id)
    }

    /// Validate and record an outgoing message. Returns false (and changes
    /// nothing) when the text is blank or a send is already in flight; the
    /// caller only spawns the request when this accepts.
    pub fn submit(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.status != Status::Ready {
            return false;
        }

        let id = self.next_id();
        self.messages.push(Message {
            id,
            role: Role::User,
            parts: vec![Part::Text {
                text: text.to_string(),
            }],
        });
        self.status = Status::Submitting;
        self.scroll_to_bottom();
        true
    }

    /// Apply one event from the in-flight stream.
    pub fn on_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Opened => {
                if self.status == Status::Submitting {
                    let id = self.next_id();
                    self.messages.push(Message {
                        id,
                        role: Role::Assistant,
                        parts: Vec::new(),
                    });
                    self.status = Status::Streaming;
                    self.scroll_to_bottom();
                }
            }
            StreamEvent::Delta(text) => {
                if self.status != Status::Streaming {
                    return;
                }
                if let Some(message) = self
                    .messages
                    .last_mut()
                    .filter(|m| m.role == Role::Assistant)
                {
                    message.parts.push(Part::Text { text });
                    self.scroll_to_bottom();
                }
            }
            // Both outcomes collapse back to Ready; a partial assistant
            // message is left as-is.
            StreamEvent::Done | StreamEvent::Failed(_) => {
                if self.status != Status::Ready {
                    self.status = Status::Ready;
                }
            }
        }
    }

    /// True while the assistant message exists but nothing has arrived for
    /// it yet; the chat shows the animated indicator in that window.
    pub fn awaiting_first_content(&self) -> bool {
        self.status == Status::Streaming
            && self
                .messages
                .last()
                .map(|m| m.role == Role::Assistant && m.parts.is_empty())
                .unwrap_or(false)
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.cycle();
        let _ = Config::save_theme(self.theme);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.status != Status::Ready {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Manual scrolling; the next conversation change re-sticks to the bottom.
    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Scroll so the newest message (or the indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for message in &self.messages {
            total_lines += 1; // Role line ("你" or "AI")
            let content = message.text();
            for line in content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            if content.is_empty() {
                total_lines += 1;
            }
            total_lines += 1; // Blank line after message
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(&Config::new())
    }

    #[test]
    fn blank_input_is_rejected_without_side_effects() {
        let mut app = test_app();
        assert!(!app.submit(""));
        assert!(!app.submit("   \t\n"));
        assert!(app.messages.is_empty());
        assert_eq!(app.status, Status::Ready);
    }

    #[test]
    fn submit_while_busy_is_a_no_op() {
        let mut app = test_app();
        assert!(app.submit("深圳天气怎么样？"));
        assert_eq!(app.status, Status::Submitting);

        assert!(!app.submit("北京今天的天气如何？"));
        assert_eq!(app.messages.len(), 1);

        app.on_stream_event(StreamEvent::Opened);
        assert_eq!(app.status, Status::Streaming);
        assert!(!app.submit("北京今天的天气如何？"));
        assert_eq!(app.messages.len(), 2);
    }

    #[test]
    fn successful_send_grows_conversation_by_one_exchange() {
        let mut app = test_app();
        assert!(app.submit("深圳天气怎么样？"));
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, Role::User);
        assert_eq!(app.messages[0].text(), "深圳天气怎么样？");

        app.on_stream_event(StreamEvent::Opened);
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[1].role, Role::Assistant);
        assert!(app.awaiting_first_content());

        app.on_stream_event(StreamEvent::Delta("深圳今天".to_string()));
        app.on_stream_event(StreamEvent::Delta("多云，26°C。".to_string()));
        assert!(!app.awaiting_first_content());
        assert_eq!(app.messages[1].text(), "深圳今天多云，26°C。");
        assert_eq!(app.messages[1].parts.len(), 2);

        app.on_stream_event(StreamEvent::Done);
        assert_eq!(app.status, Status::Ready);
        assert_eq!(app.messages.len(), 2);
    }

    #[test]
    fn status_never_reaches_streaming_before_submitting() {
        let mut app = test_app();

        // A stray Opened without a send in flight must not fabricate a
        // message or advance the state machine.
        app.on_stream_event(StreamEvent::Opened);
        assert_eq!(app.status, Status::Ready);
        assert!(app.messages.is_empty());

        app.on_stream_event(StreamEvent::Delta("ghost".to_string()));
        assert!(app.messages.is_empty());

        assert!(app.submit("hello"));
        assert_eq!(app.status, Status::Submitting);
        app.on_stream_event(StreamEvent::Opened);
        assert_eq!(app.status, Status::Streaming);
    }

    #[test]
    fn transport_failure_keeps_partial_message_and_resets_status() {
        let mut app = test_app();
        app.submit("上海明天会下雨吗？");
        app.on_stream_event(StreamEvent::Opened);
        app.on_stream_event(StreamEvent::Delta("上海明天".to_string()));
        app.on_stream_event(StreamEvent::Failed("connection reset".to_string()));

        assert_eq!(app.status, Status::Ready);
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[1].text(), "上海明天");

        // The user can immediately resend.
        assert!(app.submit("上海明天会下雨吗？"));
    }

    #[test]
    fn message_ids_are_unique_and_stable() {
        let mut app = test_app();
        app.submit("a");
        app.on_stream_event(StreamEvent::Opened);
        app.on_stream_event(StreamEvent::Done);
        app.submit("b");

        let ids: Vec<&str> = app.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
        assert_eq!(ids[0], "msg-1");
    }

    #[test]
    fn deltas_arriving_after_failure_are_dropped() {
        let mut app = test_app();
        app.submit("广州的气温是多少？");
        app.on_stream_event(StreamEvent::Opened);
        app.on_stream_event(StreamEvent::Failed("timeout".to_string()));
        app.on_stream_event(StreamEvent::Delta("late".to_string()));

        assert_eq!(app.messages[1].parts.len(), 0);
        assert_eq!(app.status, Status::Ready);
    }

    #[test]
    fn history_serializes_with_typed_parts() {
        let mut app = test_app();
        app.submit("深圳天气怎么样？");
        let json = serde_json::to_value(&app.messages).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["parts"][0]["type"], "text");
        assert_eq!(json[0]["parts"][0]["text"], "深圳天气怎么样？");
    }
}
