//! Terminal setup and the single-threaded event loop.
//!
//! Each iteration draws a frame, then blocks on the next terminal event.
//! Nothing runs in the background: a slow twitch CLI call made while
//! handling an event stalls the whole interface until it returns.

use std::io;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::debug;

use crate::app::{App, KeyAction};
use crate::ui;

/// Run the interactive TUI until the user quits.
///
/// Enters raw mode and the alternate screen, runs the loop, and restores
/// the terminal whether or not setup or the loop succeeded.
pub fn run(app: &mut App) -> anyhow::Result<()> {
    enable_raw_mode()?;
    restoring(|| setup_and_run(app), restore_terminal)
}

/// Run `body`, then `restore` on every exit path of `body`.
fn restoring<T>(
    body: impl FnOnce() -> anyhow::Result<T>,
    restore: impl FnOnce(),
) -> anyhow::Result<T> {
    let result = body();
    restore();
    result
}

fn setup_and_run(app: &mut App) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    let result = run_loop(&mut terminal, app, event::read);
    let _ = terminal.show_cursor();
    result
}

/// Leave raw mode and the alternate screen. Errors are ignored so that
/// every step is attempted.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Draw, read one event, apply it; repeat until the app asks to quit.
pub fn run_loop<B, F>(terminal: &mut Terminal<B>, app: &mut App, mut next_event: F) -> anyhow::Result<()>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
    F: FnMut() -> io::Result<Event>,
{
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match next_event()? {
            Event::Key(key) => {
                // Filter out Release events (Windows emits Press + Release per keystroke)
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                let action = app.handle_key(key);
                if action != KeyAction::None {
                    debug!(?action, "key action");
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse.kind),
            Event::Resize(w, h) => debug!(w, h, "terminal resized"),
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
