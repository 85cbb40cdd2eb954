use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

mod agent;
mod app;
mod config;
mod handler;
mod theme;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::{AppEvent, EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let mut app = App::new(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let sender = events.sender();

    let result = run(&mut terminal, &mut app, &mut events, sender).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
    sender: UnboundedSender<AppEvent>,
) -> Result<()> {
    terminal.draw(|frame| ui::render(app, frame))?;

    while let Some(event) = events.next().await {
        handler::handle_event(app, event, &sender)?;

        if app.should_quit {
            break;
        }

        terminal.draw(|frame| ui::render(app, frame))?;
    }

    Ok(())
}
