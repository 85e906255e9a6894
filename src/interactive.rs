pub mod commands;

use crate::hud::ansi::AnsiWriter;
use crate::hud::Hud;
use crate::mi::{MiSession, Result};
use commands::{execute_command, parse_command, CommandOutcome, CommandOutput, Display};
use std::io::{self, Write};

pub fn repl(
    session: &mut MiSession,
    hud: &mut Hud,
    writer: &AnsiWriter,
    startup: CommandOutput,
) -> Result<()> {
    present(&startup, hud, writer)?;
    println!("Type 'help' for commands.");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}", writer.prompt(session.is_running()));
        io::stdout().flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        match execute_command(cmd, session, hud) {
            CommandOutcome::Quit => break,
            CommandOutcome::Continue(output) => present(&output, hud, writer)?,
        }
    }
    Ok(())
}

/// Panes first (clearing the screen for a full HUD), then text, then errors.
fn present(output: &CommandOutput, hud: &Hud, writer: &AnsiWriter) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match output.display {
        Some(Display::Hud) => writer.write_panes(&mut stdout, &hud.panes(writer.width), true)?,
        Some(Display::Pane(kind)) => {
            if let Some(pane) = hud.pane(kind, writer.width) {
                writer.write_panes(&mut stdout, &[pane], false)?;
            }
        }
        None => {}
    }
    for line in &output.lines {
        writeln!(stdout, "{}", line)?;
    }
    stdout.flush()?;
    for err in &output.errors {
        eprintln!("{}", err);
    }
    Ok(())
}
