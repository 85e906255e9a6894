use crate::hud::Hud;
use crate::interactive::commands::{execute_command, parse_command, CommandOutcome, CommandOutput};
use crate::mi::MiSession;

const MAX_LOG_LINES: usize = 1000;

/// Scrollback of command output. `scroll` counts lines up from the bottom.
#[derive(Debug, Default)]
pub struct LogView {
    pub lines: Vec<String>,
    pub scroll: u16,
}

impl LogView {
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
        if self.lines.len() > MAX_LOG_LINES {
            let excess = self.lines.len() - MAX_LOG_LINES;
            self.lines.drain(..excess);
        }
        self.scroll = 0;
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let max = self.lines.len().saturating_sub(1) as i32;
        let next = (self.scroll as i32 + delta).clamp(0, max);
        self.scroll = next as u16;
    }

    /// Offset from the top that shows the tail of the log in `visible` rows.
    pub fn top_offset(&self, visible: u16) -> u16 {
        let total = self.lines.len() as u16;
        total.saturating_sub(visible).saturating_sub(self.scroll)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub session: MiSession,
    pub hud: Hud,
    pub log: LogView,
    pub input: String,
    pub running: bool,
}

impl AppState {
    pub fn new(mut session: MiSession, hud: Hud, startup: CommandOutput) -> Self {
        let running = session.is_running();
        let mut app = Self {
            session,
            hud,
            log: LogView::default(),
            input: String::new(),
            running,
        };
        app.absorb(startup);
        app.log.push(
            "Type 'help' for commands. Ctrl+C interrupts a running target and quits when idle."
                .to_string(),
        );
        app
    }

    /// Run the command line. Returns true when the user asked to quit.
    pub fn submit(&mut self) -> bool {
        let input = std::mem::take(&mut self.input);
        self.log.push(format!("--> {}", input));
        let cmd = match parse_command(&input) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return false,
            Err(e) => {
                self.log.push(format!("error: {}", e));
                return false;
            }
        };
        let quit = match execute_command(cmd, &mut self.session, &mut self.hud) {
            CommandOutcome::Quit => true,
            CommandOutcome::Continue(output) => {
                self.absorb(output);
                false
            }
        };
        self.running = self.session.is_running();
        quit
    }

    /// Panes are always on screen here, so only the text goes to the log.
    fn absorb(&mut self, output: CommandOutput) {
        for line in output.lines {
            self.log.push(line);
        }
        for err in output.errors {
            self.log.push(format!("error: {}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(n: usize) -> LogView {
        let mut log = LogView::default();
        for i in 0..n {
            log.push(format!("line {}", i));
        }
        log
    }

    #[test]
    fn log_is_capped() {
        let log = log_with(MAX_LOG_LINES + 5);
        assert_eq!(log.lines.len(), MAX_LOG_LINES);
        assert_eq!(log.lines[0], "line 5");
    }

    #[test]
    fn log_tail_and_scroll() {
        let mut log = log_with(20);
        assert_eq!(log.top_offset(5), 15);
        log.scroll_by(3);
        assert_eq!(log.top_offset(5), 12);
        log.scroll_by(100);
        assert_eq!(log.scroll, 19);
        assert_eq!(log.top_offset(5), 0);
        log.scroll_by(-100);
        assert_eq!(log.scroll, 0);
    }

    #[test]
    fn new_output_snaps_back_to_bottom() {
        let mut log = log_with(20);
        log.scroll_by(4);
        log.push("fresh".to_string());
        assert_eq!(log.scroll, 0);
        assert_eq!(log.top_offset(5), 16);
    }

    #[test]
    fn short_log_starts_at_top() {
        let log = log_with(3);
        assert_eq!(log.top_offset(10), 0);
    }
}
