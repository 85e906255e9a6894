use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    time::Duration,
};

pub mod state;
pub mod ui;

use state::AppState;

const PAGE: i32 = 6;

pub fn run_tui(app: &mut AppState) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    enable_raw_mode()?;
    if let Err(e) = execute!(terminal.backend_mut(), EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(e.into());
    }

    let result = event_loop(&mut terminal, app);
    let cleanup_result = restore_terminal(&mut terminal);

    result.and(cleanup_result)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut AppState) -> Result<()> {
    let debug_keys = std::env::var("STRONGDB_TUI_DEBUG_KEYS").is_ok();
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if debug_keys {
                crate::logger::log_debug(&format!("[tui-ev] {:?}", ev));
            }
            if let Event::Key(key_event) = ev {
                match handle_key(key_event, app) {
                    KeyAction::None => {}
                    KeyAction::Quit => break,
                    KeyAction::Submit => {
                        if submit_cooked(terminal, app)? {
                            break;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    None,
    Submit,
    Quit,
}

/// Run the command line with raw mode off, so Ctrl+C during a long resume is
/// a SIGINT (and reaches gdb as an interrupt) instead of a key press.
fn submit_cooked(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut AppState) -> Result<bool> {
    terminal.draw(|f| ui::draw(f, app))?;
    disable_raw_mode()?;
    let quit = app.submit();
    enable_raw_mode()?;
    // Anything echoed while cooked is not in ratatui's buffer.
    terminal.clear()?;
    Ok(quit)
}

fn handle_key(key: KeyEvent, app: &mut AppState) -> KeyAction {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return KeyAction::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    match key.code {
        KeyCode::Enter => return KeyAction::Submit,
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Esc => app.input.clear(),
        KeyCode::Up => app.log.scroll_by(1),
        KeyCode::Down => app.log.scroll_by(-1),
        KeyCode::PageUp => app.log.scroll_by(PAGE),
        KeyCode::PageDown => app.log.scroll_by(-PAGE),
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::theme::Theme;
    use crate::hud::Hud;
    use crate::interactive::commands::CommandOutput;
    use crate::mi::testing::fake_session;

    fn app() -> AppState {
        let session = fake_session("");
        AppState::new(session, Hud::new(Theme::default(), 48), CommandOutput::default())
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn enter_submits_and_control_keys_quit() {
        let mut app = app();
        for c in "regs".chars() {
            assert_eq!(handle_key(press(KeyCode::Char(c), KeyModifiers::NONE), &mut app), KeyAction::None);
        }
        assert_eq!(app.input, "regs");
        assert_eq!(handle_key(press(KeyCode::Enter, KeyModifiers::NONE), &mut app), KeyAction::Submit);
        // Submitting is left to the caller, which drops raw mode first.
        assert_eq!(app.input, "regs");

        assert_eq!(handle_key(press(KeyCode::Esc, KeyModifiers::NONE), &mut app), KeyAction::None);
        assert!(app.input.is_empty());
        assert_eq!(
            handle_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut app),
            KeyAction::Quit
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('d'), KeyModifiers::CONTROL), &mut app),
            KeyAction::Quit
        );
        app.session.shutdown();
    }
}
