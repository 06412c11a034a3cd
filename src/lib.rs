use std::io::{self, IsTerminal, Stderr, Write};
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::{info, warn};

mod app;
mod config;
pub mod error;
pub mod filter;
mod logging;
pub mod matcher;
mod scorer;
pub mod tab;
mod theme;
pub mod types;
mod ui;
mod util;

use app::{App, Outcome};
use tab::{NavigationRequest, TabSnapshot, read_snapshot};
use ui::draw;

/// Run the picker: snapshot on stdin, UI on stderr, result on stdout.
pub fn run() -> io::Result<()> {
    logging::init();
    let config = config::load_config();

    let stdin = io::stdin();
    let snapshot = if stdin.is_terminal() {
        TabSnapshot::default()
    } else {
        read_snapshot(stdin.lock()).map_err(io::Error::other)?
    };

    enable_raw_mode()?;
    let mut stderr = io::stderr();
    restore_on_err(
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture),
        || restore_terminal(false),
    )?;

    let enhanced_keys =
        ratatui::crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        let _ = execute!(
            stderr,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        );
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), PopKeyboardEnhancementFlags);
        let _ = execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    let backend = CrosstermBackend::new(stderr);
    let mut terminal =
        restore_on_err(Terminal::new(backend), || restore_terminal(enhanced_keys))?;

    let mut app = App::new(snapshot, &config);
    let result = run_app(&mut terminal, &mut app);

    restore_terminal(enhanced_keys)?;
    result?;
    emit_outcome(&app)
}

fn restore_terminal(enhanced_keys: bool) -> io::Result<()> {
    disable_raw_mode()?;
    let mut stderr = io::stderr();
    if enhanced_keys {
        let _ = execute!(stderr, PopKeyboardEnhancementFlags);
    }
    execute!(stderr, LeaveAlternateScreen, DisableMouseCapture)
}

/// Run `restore` before handing back a setup error. The setup error wins.
fn restore_on_err<T, F>(result: io::Result<T>, restore: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<()>,
{
    if result.is_err() {
        let _ = restore();
    }
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stderr>>, app: &mut App) -> io::Result<()> {
    loop {
        app.poll_scoring();
        terminal.draw(|f| draw(app, f))?;
        if app.quit {
            return Ok(());
        }
        if event::poll(Duration::from_millis(50))? {
            // Drain everything queued before redrawing.
            loop {
                match event::read()? {
                    Event::Key(key) => {
                        if let Err(err) = app.handle_key(key) {
                            app.set_status(format!("Action failed: {err}"));
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = app.handle_mouse(mouse) {
                            app.set_status(format!("Action failed: {err}"));
                        }
                    }
                    _ => {}
                }
                if app.quit {
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}

fn emit_outcome(app: &App) -> io::Result<()> {
    let selection = match &app.outcome {
        Some(Outcome::Accepted(Some(selection))) => selection,
        Some(Outcome::Accepted(None)) => {
            info!("accepted with nothing highlighted");
            return Ok(());
        }
        Some(Outcome::Cancelled) | None => return Ok(()),
    };
    let request = NavigationRequest::resolve(&app.snapshot, selection);
    if let NavigationRequest::Unsupported { reason } = &request {
        warn!(%reason, "selected tab cannot be opened");
        eprintln!("{reason}");
    }
    let line = serde_json::to_string(&request).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_setup_failure_restores_terminal() {
        let restored = Cell::new(false);
        let result: io::Result<()> = restore_on_err(Err(io::Error::other("no tty")), || {
            restored.set(true);
            Err(io::Error::other("restore failed too"))
        });
        assert!(restored.get());
        assert_eq!(result.unwrap_err().to_string(), "no tty");
    }

    #[test]
    fn test_setup_success_leaves_terminal_alone() {
        let restored = Cell::new(false);
        let value = restore_on_err(Ok(7), || {
            restored.set(true);
            Ok(())
        })
        .unwrap();
        assert_eq!(value, 7);
        assert!(!restored.get());
    }
}
