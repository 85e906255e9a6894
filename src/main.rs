mod config;
mod hud;
mod interactive;
mod logger;
mod mi;
mod tui;

use config::Config;
use hud::ansi::{terminal_width, AnsiWriter};
use hud::theme::Theme;
use hud::Hud;
use interactive::commands::{describe_breakpoint, handle_stop, CommandOutput};
use logger::{log_debug, log_warn};
use mi::{interrupt, MiSession, Result};
use std::io::{self, IsTerminal};

/// Sent once before the first stop.
const INIT_COMMANDS: &[&str] = &["set pagination off", "set $sgdb_stack_width = 4"];

fn main() -> Result<()> {
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if !std::path::Path::new(&cfg.target).exists() {
        eprintln!("target not found: {}", cfg.target);
        std::process::exit(1);
    }
    if let Err(e) = logger::global().init(&cfg.log_path, cfg.verbose) {
        eprintln!("[strongdb] cannot open log file {}: {}", cfg.log_path, e);
    }
    // Queried once; line mode keeps this width for the whole session.
    let width = cfg.width.unwrap_or_else(terminal_width) as usize;

    log_debug(&format!(
        "[strongdb] gdb: {} | target: {} {:?} | width: {} | verbose: {}",
        cfg.gdb_bin, cfg.target, cfg.target_args, width, cfg.verbose
    ));
    let mut session = MiSession::start(&cfg.gdb_bin, &cfg.target, &cfg.target_args, cfg.verbose)?;
    session.drain_initial_output()?;
    session.run_init_commands(INIT_COMMANDS);
    session.ensure_arch();
    let tty = inferior_tty(&cfg);
    if let Err(e) = session.set_inferior_tty(&tty) {
        log_warn(&format!("cannot give the inferior {}: {}", tty, e));
    }
    match interrupt::install() {
        Ok(()) => session.set_interruptible(true),
        Err(e) => log_warn(&format!("Ctrl+C will not interrupt the inferior: {}", e)),
    }

    let mut hud = Hud::new(Theme::default(), cfg.stack_bytes);
    let startup = if cfg.auto_start {
        start_target(&mut session, &mut hud, &cfg.start_location)
    } else {
        CommandOutput::default()
    };

    if cfg.tui {
        let mut app = tui::state::AppState::new(session, hud, startup);
        let result: Result<()> = tui::run_tui(&mut app).map_err(|e| e.into());
        app.session.shutdown();
        result
    } else {
        let writer = AnsiWriter::new(width, cfg.color, hud.theme.clone());
        let result = interactive::repl(&mut session, &mut hud, &writer, startup);
        session.shutdown();
        result
    }
}

/// The inferior gets the user's terminal in line mode. Under `--tui` it would
/// draw over the layout, so it gets /dev/null unless `--tty` says otherwise.
fn inferior_tty(cfg: &Config) -> String {
    if let Some(tty) = &cfg.tty {
        return tty.clone();
    }
    if !cfg.tui && io::stdin().is_terminal() {
        if let Ok(path) = std::fs::read_link("/proc/self/fd/0") {
            return path.to_string_lossy().into_owned();
        }
    }
    "/dev/null".to_string()
}

/// Break at `location`, run, and let the HUD draw the first stop.
fn start_target(session: &mut MiSession, hud: &mut Hud, location: &str) -> CommandOutput {
    let mut out = CommandOutput::default();
    match session.break_insert(location) {
        Ok(bp) => out.lines.push(describe_breakpoint(&bp)),
        Err(e) => {
            out.errors.push(e.to_string());
            return out;
        }
    }
    match session.exec_run() {
        Ok(stop) => handle_stop(session, hud, &stop, &mut out),
        Err(e) => out.errors.push(format!("run error: {}", e)),
    }
    out
}
