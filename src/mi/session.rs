use crate::logger::{log_debug, log_warn};
use crate::mi::interrupt::Armed;
use crate::mi::models::{
    BreakpointInfo, Instruction, MemoryBlock, MiResponse, MiStatus, Result, StoppedLocation,
};
use crate::mi::parser::{
    console_text, mi_escape, parse_breakpoint, parse_disassembly, parse_field, parse_hex_u64,
    parse_memory_contents, parse_status, parse_stopped, parse_thread_group_pid,
    parse_value_field, split_glued_record, target_output,
};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::os::fd::AsRawFd;
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Result of a CLI command forwarded through `-interpreter-exec console`.
#[derive(Debug, Default)]
pub struct ConsoleOutput {
    pub text: String,
    pub target: Vec<String>,
    pub stop: Option<StoppedLocation>,
}

#[derive(Debug)]
pub struct MiSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    verbose: bool, // when true, log MI traffic
    interruptible: bool,
    /// Record split off a line that began with inferior output.
    pending: VecDeque<String>,
    pub arch: Option<String>,
}

impl MiSession {
    pub fn start(gdb_bin: &str, target: &str, args: &[String], verbose: bool) -> Result<Self> {
        // Spawn gdb in MI mode (`-i=mi`) with quiet banner. Target args are passed as-is.
        let mut cmd = Command::new(gdb_bin);
        cmd.arg("-q").arg("-i=mi").arg("--args").arg(target);
        for a in args {
            cmd.arg(a);
        }
        // Own process group: the terminal's Ctrl+C goes to strongdb alone.
        cmd.process_group(0);
        let mut child = match cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    return Err(format!(
                        "gdb binary '{}' not found. Install gdb or pass --gdb <path>",
                        gdb_bin
                    )
                    .into());
                } else {
                    return Err(format!("failed to launch gdb '{}': {}", gdb_bin, e).into());
                }
            }
        };

        let stdin = child.stdin.take().ok_or("failed to open gdb stdin")?;
        let stdout = child.stdout.take().ok_or("failed to open gdb stdout")?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            verbose,
            interruptible: false,
            pending: VecDeque::new(),
            arch: None,
        })
    }

    /// Forward SIGINT as `-exec-interrupt` while waiting for a stop.
    /// Needs `interrupt::install` to have run.
    pub fn set_interruptible(&mut self, on: bool) {
        self.interruptible = on;
    }

    /// Point the inferior's stdio at `tty` so it never shares the MI pipes.
    pub fn set_inferior_tty(&mut self, tty: &str) -> Result<()> {
        self.exec_checked(&format!("-inferior-tty-set {}", tty))?;
        Ok(())
    }

    /// Drain gdb banner until the initial prompt (logged only when verbose).
    pub fn drain_initial_output(&mut self) -> Result<()> {
        self.read_until_prompt()?;
        Ok(())
    }

    /// Send a raw MI command and collect the response until the prompt.
    pub fn exec_command(&mut self, cmd: &str) -> Result<MiResponse> {
        self.send_line(cmd)?;
        self.read_response()
    }

    /// Like `exec_command`, but an `^error` record becomes an `Err`.
    fn exec_checked(&mut self, cmd: &str) -> Result<MiResponse> {
        let resp = self.exec_command(cmd)?;
        if let MiStatus::Error(msg) = &resp.status {
            return Err(msg.clone().into());
        }
        Ok(resp)
    }

    /// Run a CLI command and return its console text.
    pub fn console(&mut self, cli: &str) -> Result<String> {
        let cmd = format!("-interpreter-exec console {}", mi_escape(cli));
        let resp = self.exec_checked(&cmd)?;
        Ok(console_text(&resp.oob))
    }

    /// Forward an arbitrary user command to the CLI. If it resumed the
    /// inferior, block until the next stop.
    pub fn forward(&mut self, cli: &str) -> Result<ConsoleOutput> {
        let cmd = format!("-interpreter-exec console {}", mi_escape(cli));
        let resp = self.exec_checked(&cmd)?;
        let mut out = ConsoleOutput {
            text: console_text(&resp.oob),
            target: target_output(&resp.oob),
            stop: resp.stopped_record().map(|l| parse_stopped(l)),
        };
        if out.stop.is_none() && resp.resumed() {
            let (stop, oob) = self.wait_for_stop_capture()?;
            out.text.push_str(&console_text(&oob));
            out.target.extend(target_output(&oob));
            out.stop = Some(stop);
        }
        Ok(out)
    }

    /// Best-effort setup commands; failures are logged, not fatal.
    pub fn run_init_commands(&mut self, cmds: &[&str]) {
        for cli in cmds {
            if let Err(e) = self.console(cli) {
                log_warn(&format!("init command '{}' failed: {}", cli, e));
            }
        }
    }

    /// Detect architecture via `-gdb-show architecture` (best-effort).
    pub fn ensure_arch(&mut self) {
        if self.arch.is_some() {
            return;
        }
        if let Ok(resp) = self.exec_command("-gdb-show architecture") {
            if let Some(val) = parse_value_field(&resp.result) {
                let trimmed = val.trim();
                if !trimmed.is_empty() && trimmed != "auto" {
                    self.arch = Some(trimmed.to_string());
                }
            }
        }
        // Left as None otherwise; the first stop record usually carries it.
    }

    /// Insert breakpoint at given location string.
    pub fn break_insert(&mut self, location: &str) -> Result<BreakpointInfo> {
        let cmd = format!("-break-insert {}", mi_escape(location));
        let resp = self.exec_command(&cmd)?;
        if let MiStatus::Error(msg) = resp.status {
            return Err(format!("break insert failed: {}", msg).into());
        }
        Ok(parse_breakpoint(&resp.result))
    }

    pub fn exec_run(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-run", "run")
    }

    pub fn exec_continue(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-continue", "continue")
    }

    pub fn exec_next(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-next", "next")
    }

    pub fn exec_step(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-step", "step")
    }

    pub fn exec_next_instruction(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-next-instruction", "nexti")
    }

    pub fn exec_step_instruction(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-step-instruction", "stepi")
    }

    pub fn exec_finish(&mut self) -> Result<StoppedLocation> {
        self.resume("-exec-finish", "finish")
    }

    fn resume(&mut self, cmd: &str, label: &str) -> Result<StoppedLocation> {
        let resp = self.exec_command(cmd)?;
        if let MiStatus::Error(msg) = &resp.status {
            return Err(format!("{} failed: {}", label, msg).into());
        }
        if let Some(line) = resp.stopped_record() {
            let loc = parse_stopped(line);
            self.note_arch(&loc);
            return Ok(loc);
        }
        let (stop, _) = self.wait_for_stop_capture()?;
        Ok(stop)
    }

    /// Pid of the first live inferior, `None` when nothing is running.
    pub fn inferior_pid(&mut self) -> Result<Option<u32>> {
        let resp = self.exec_checked("-list-thread-groups")?;
        Ok(parse_thread_group_pid(&resp.result))
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.inferior_pid(), Ok(Some(_)))
    }

    pub fn register_text(&mut self) -> Result<String> {
        self.console("info registers")
    }

    /// Read one register through `info registers <name>` and decode its hex value.
    pub fn read_register_u64(&mut self, name: &str) -> Result<u64> {
        let text = self.console(&format!("info registers {}", name))?;
        let raw = text
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| format!("register '{}' not reported", name))?;
        parse_hex_u64(raw).ok_or_else(|| format!("register '{}' value '{}' is not hex", name, raw).into())
    }

    pub fn frame_pc(&mut self) -> Result<u64> {
        let resp = self.exec_checked("-data-evaluate-expression $pc")?;
        let raw = parse_value_field(&resp.result).ok_or("value not found in MI response")?;
        parse_address_str(&raw).ok_or_else(|| format!("cannot read pc from '{}'", raw).into())
    }

    /// Read memory bytes at an address expression using `-data-read-memory-bytes`.
    pub fn read_memory(&mut self, address: &str, bytes: usize) -> Result<MemoryBlock> {
        let cmd = format!("-data-read-memory-bytes {} {}", address, bytes);
        let resp = self.exec_checked(&cmd)?;
        let begin = parse_field(&resp.result, "begin")
            .and_then(|b| parse_hex_u64(&b))
            .ok_or("memory block has no begin address")?;
        let data = parse_memory_contents(&resp.result)?;
        Ok(MemoryBlock {
            address: begin,
            bytes: data,
        })
    }

    /// Disassemble the function enclosing `pc`.
    pub fn disassemble_function(&mut self, pc: u64) -> Result<Vec<Instruction>> {
        let resp = self.exec_checked(&format!("-data-disassemble -a 0x{:x} -- 0", pc))?;
        Ok(parse_disassembly(&resp.result))
    }

    pub fn disassemble_range(&mut self, start: u64, end: u64) -> Result<Vec<Instruction>> {
        let cmd = format!("-data-disassemble -s 0x{:x} -e 0x{:x} -- 0", start, end);
        let resp = self.exec_checked(&cmd)?;
        Ok(parse_disassembly(&resp.result))
    }

    /// Wait for stopped and parse the location; returns the records seen on the way.
    fn wait_for_stop_capture(&mut self) -> Result<(StoppedLocation, Vec<String>)> {
        let armed = self
            .interruptible
            .then(|| Armed::new(self.stdin.as_raw_fd()));
        let mut stop: Option<StoppedLocation> = None;
        let mut seen = Vec::new();
        let mut acked = 0;
        loop {
            let line = self.next_line()?;
            if line == "(gdb)" {
                let Some(loc) = stop.take() else {
                    continue;
                };
                // Every -exec-interrupt gets its own result record; drain them
                // so the next command does not read a stale one.
                let sent = armed.as_ref().map(|a| a.disarm()).unwrap_or(0);
                if acked >= sent {
                    return Ok((loc, seen));
                }
                stop = Some(loc);
                continue;
            }
            if line.starts_with("*stopped") {
                let loc = parse_stopped(&line);
                self.note_arch(&loc);
                stop = Some(loc);
                continue;
            }
            if line.starts_with('^') {
                let sent = armed.as_ref().map(|a| a.sent()).unwrap_or(0);
                if acked < sent {
                    acked += 1;
                    log_debug(&format!("[mi] interrupt acknowledged: {}", line));
                    continue;
                }
                if line.starts_with("^error") {
                    return Err(format!("gdb error: {}", line).into());
                }
            }
            seen.push(line);
        }
    }

    fn note_arch(&mut self, loc: &StoppedLocation) {
        if self.arch.is_none() {
            self.arch = loc.arch.clone();
        }
    }

    /// Attempt to shut down gdb cleanly.
    pub fn shutdown(&mut self) {
        let _ = self.send_line("-gdb-exit");
        let _ = self.child.wait();
    }

    fn send_line(&mut self, cmd: &str) -> Result<()> {
        let mut line = cmd.to_string();
        line.push('\n');
        if self.verbose {
            log_debug(&format!("[mi->] {}", cmd));
        }
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_response(&mut self) -> Result<MiResponse> {
        // Collect a single result record (^done/^error/...) and any preceding async output.
        let mut oob = Vec::new();
        let mut result_line: Option<String> = None;
        loop {
            let trimmed = self.next_line()?;
            if trimmed == "(gdb)" {
                if result_line.is_some() {
                    break;
                } else {
                    continue;
                }
            }
            if trimmed.starts_with('^') {
                result_line = Some(trimmed);
                continue;
            }
            oob.push(trimmed);
        }
        let res = result_line.unwrap_or_else(|| String::from("^error,msg=\"missing result\""));
        let status = parse_status(&res);
        Ok(MiResponse {
            status,
            result: res,
            oob,
        })
    }

    fn read_until_prompt(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let trimmed = self.next_line()?;
            if trimmed == "(gdb)" {
                break;
            }
            lines.push(trimmed);
        }
        Ok(lines)
    }

    /// Next non-empty line from gdb, trimmed. Inferior output glued in front
    /// of a record comes back first, the record on the following call.
    fn next_line(&mut self) -> Result<String> {
        if let Some(record) = self.pending.pop_front() {
            return Ok(record);
        }
        loop {
            let mut line = String::new();
            let n = self.stdout.read_line(&mut line)?;
            if n == 0 {
                return Err("gdb exited unexpectedly".into());
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if self.verbose {
                log_debug(&format!("[mi<-] {}", trimmed));
            }
            return Ok(match split_glued_record(trimmed) {
                (Some(prefix), record) => {
                    self.pending.push_back(record.to_string());
                    prefix.trim_end().to_string()
                }
                (None, record) => record.to_string(),
            });
        }
    }
}

/// Pull the first `0x...` address out of a printed value such as
/// `(void (*)()) 0x401126 <main+4>`.
fn parse_address_str(s: &str) -> Option<u64> {
    let re = regex::Regex::new(r"0x[0-9a-fA-F]+").ok()?;
    let mat = re.find(s.trim())?;
    parse_hex_u64(mat.as_str())
}
