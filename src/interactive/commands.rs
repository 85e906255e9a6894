use crate::hud::{describe_stop, Hud, PaneKind, StopOutcome};
use crate::mi::{BreakpointInfo, MiSession, StoppedLocation};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Continue,
    Next,
    Step,
    NextInstruction,
    StepInstruction,
    Finish,
    Break(String),
    Hud,
    Show(PaneKind),
    HelloWorld,
    Help,
    Quit,
    /// Anything strongdb does not handle itself goes to gdb's CLI verbatim.
    Forward(String),
}

/// A strongdb command was called with the wrong number of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError(pub String);

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CommandError {}

/// What the front-end should draw after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Hud,
    Pane(PaneKind),
}

#[derive(Debug, Default)]
pub struct CommandOutput {
    pub lines: Vec<String>,
    pub errors: Vec<String>,
    pub display: Option<Display>,
}

pub enum CommandOutcome {
    Continue(CommandOutput),
    Quit,
}

/// Split `input` into a command. `Ok(None)` for blank input.
pub fn parse_command(input: &str) -> Result<Option<Command>, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    // Execution commands with arguments (`next 3`, `run < in.txt`) are gdb's business.
    let resume = |c: Command| {
        if rest.is_empty() {
            c
        } else {
            Command::Forward(input.to_string())
        }
    };
    let command = match cmd {
        "run" | "r" => resume(Command::Run),
        "continue" | "c" => resume(Command::Continue),
        "next" | "n" => resume(Command::Next),
        "step" | "s" => resume(Command::Step),
        "nexti" | "ni" => resume(Command::NextInstruction),
        "stepi" | "si" => resume(Command::StepInstruction),
        "finish" => resume(Command::Finish),
        // A bare location only; conditions and thread clauses are CLI syntax.
        "break" | "b" if !rest.is_empty() && !rest.contains(char::is_whitespace) => {
            Command::Break(rest.to_string())
        }
        "hello-world" => no_args(cmd, rest, Command::HelloWorld)?,
        "hud" => no_args(cmd, rest, Command::Hud)?,
        "regs" => no_args(cmd, rest, Command::Show(PaneKind::Registers))?,
        "asm" => no_args(cmd, rest, Command::Show(PaneKind::Assembly))?,
        "stack" => no_args(cmd, rest, Command::Show(PaneKind::Stack))?,
        "help" => no_args(cmd, rest, Command::Help)?,
        "quit" | "q" => no_args(cmd, rest, Command::Quit)?,
        _ => Command::Forward(input.to_string()),
    };
    Ok(Some(command))
}

fn no_args(name: &str, rest: &str, cmd: Command) -> Result<Command, CommandError> {
    if rest.is_empty() {
        Ok(cmd)
    } else {
        Err(CommandError(format!("{} takes no arguments", name)))
    }
}

pub fn execute_command(cmd: Command, session: &mut MiSession, hud: &mut Hud) -> CommandOutcome {
    let mut out = CommandOutput::default();
    match cmd {
        Command::Quit => return CommandOutcome::Quit,
        Command::Help => out.lines.extend(help_lines()),
        Command::HelloWorld => out.lines.push("hello world!".to_string()),
        Command::Hud => show(hud, Display::Hud, &mut out),
        Command::Show(kind) => show(hud, Display::Pane(kind), &mut out),
        Command::Break(location) => match session.break_insert(&location) {
            Ok(info) => out.lines.push(describe_breakpoint(&info)),
            Err(e) => out.errors.push(format!("break error: {}", e)),
        },
        Command::Forward(raw) => match session.forward(&raw) {
            Ok(reply) => {
                out.lines.extend(reply.text.lines().map(|l| l.to_string()));
                out.lines.extend(reply.target);
                if let Some(stop) = reply.stop {
                    handle_stop(session, hud, &stop, &mut out);
                }
            }
            Err(e) => out.errors.push(e.to_string()),
        },
        resume => {
            let (label, result) = match resume {
                Command::Run => ("run", session.exec_run()),
                Command::Continue => ("continue", session.exec_continue()),
                Command::Next => ("next", session.exec_next()),
                Command::Step => ("step", session.exec_step()),
                Command::NextInstruction => ("nexti", session.exec_next_instruction()),
                Command::StepInstruction => ("stepi", session.exec_step_instruction()),
                _ => ("finish", session.exec_finish()),
            };
            match result {
                Ok(stop) => handle_stop(session, hud, &stop, &mut out),
                Err(e) => out.errors.push(format!("{} error: {}", label, e)),
            }
        }
    }
    CommandOutcome::Continue(out)
}

/// Feed a stop record through the HUD and note what to draw.
pub fn handle_stop(
    session: &mut MiSession,
    hud: &mut Hud,
    stop: &StoppedLocation,
    out: &mut CommandOutput,
) {
    match hud.on_stop(session, stop) {
        StopOutcome::Halted => {
            out.display = Some(Display::Hud);
            out.lines.push(describe_stop(stop));
        }
        StopOutcome::Exited(msg) => out.lines.push(msg),
    }
}

fn show(hud: &Hud, display: Display, out: &mut CommandOutput) {
    if hud.last_view().is_some() {
        out.display = Some(display);
    } else {
        out.errors.push("no stop captured yet; try 'run'".to_string());
    }
}

pub fn describe_breakpoint(bp: &BreakpointInfo) -> String {
    let loc = match (&bp.file, &bp.line, &bp.func, &bp.addr) {
        (Some(f), Some(l), _, _) => format!("{}:{}", f, l),
        (_, _, Some(func), _) => func.clone(),
        (_, _, _, Some(addr)) => addr.clone(),
        _ => "<unknown>".to_string(),
    };
    format!("breakpoint {} at {}", bp.number, loc)
}

pub fn help_lines() -> Vec<String> {
    [
        "Commands:",
        "  run | r           - start the target",
        "  continue | c      - continue until the next stop",
        "  next | n          - step over one source line",
        "  step | s          - step into functions",
        "  nexti | ni        - step over one instruction",
        "  stepi | si        - step one instruction",
        "  finish            - run until the current function returns",
        "  break <loc> | b   - set breakpoint (e.g. 'break main', 'b *0x8040')",
        "  hud               - redraw all panes",
        "  regs | asm | stack - redraw one pane",
        "  hello-world       - print a greeting",
        "  help              - show this message",
        "  quit | q          - exit",
        "Anything else is passed to gdb.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_builtin_commands_and_aliases() {
        assert_eq!(parse_command("c"), Ok(Some(Command::Continue)));
        assert_eq!(parse_command("si"), Ok(Some(Command::StepInstruction)));
        assert_eq!(parse_command("ni"), Ok(Some(Command::NextInstruction)));
        assert_eq!(parse_command("regs"), Ok(Some(Command::Show(PaneKind::Registers))));
        assert_eq!(parse_command("q"), Ok(Some(Command::Quit)));
        assert_eq!(
            parse_command("b  t.c:42 "),
            Ok(Some(Command::Break("t.c:42".to_string())))
        );
    }

    #[test]
    fn test_hello_world_validates_arity() {
        assert_eq!(parse_command("hello-world"), Ok(Some(Command::HelloWorld)));
        assert_eq!(
            parse_command("hello-world now"),
            Err(CommandError("hello-world takes no arguments".to_string()))
        );
        assert!(parse_command("hud 1").is_err());
    }

    #[test]
    fn test_resume_with_arguments_goes_to_gdb() {
        assert_eq!(
            parse_command("next 3"),
            Ok(Some(Command::Forward("next 3".to_string())))
        );
        assert_eq!(
            parse_command("break"),
            Ok(Some(Command::Forward("break".to_string())))
        );
        assert_eq!(
            parse_command("b foo if x > 1"),
            Ok(Some(Command::Forward("b foo if x > 1".to_string())))
        );
        assert_eq!(
            parse_command("x/4gx $sp"),
            Ok(Some(Command::Forward("x/4gx $sp".to_string())))
        );
    }

    #[test]
    fn test_describe_breakpoint() {
        let bp = BreakpointInfo {
            number: 2,
            addr: Some("0x0000000000401126".to_string()),
            file: Some("t.c".to_string()),
            line: Some(5),
            func: Some("main".to_string()),
        };
        assert_eq!(describe_breakpoint(&bp), "breakpoint 2 at t.c:5");
        let bare = BreakpointInfo {
            number: 3,
            addr: Some("0x8040".to_string()),
            file: None,
            line: None,
            func: None,
        };
        assert_eq!(describe_breakpoint(&bare), "breakpoint 3 at 0x8040");
    }

    #[test]
    fn test_show_without_stop_reports_error() {
        let hud = Hud::new(crate::hud::theme::Theme::default(), 48);
        let mut out = CommandOutput::default();
        show(&hud, Display::Hud, &mut out);
        assert!(out.display.is_none());
        assert_eq!(out.errors.len(), 1);
    }
}
