//! The heads-up display redrawn after every stop: registers, assembly and
//! stack panes, captured from gdb in that order.

pub mod ansi;
pub mod disasm;
pub mod layout;
pub mod registers;
pub mod stack;
pub mod theme;

use crate::logger::log_trace;
use crate::mi::parser::parse_register_lines;
use crate::mi::{Instruction, MemoryBlock, MiSession, StoppedLocation};
use disasm::InstructionSet;
use ratatui::text::{Line, Span};
use registers::{RegisterEntry, RegisterSnapshot};
use std::time::Instant;
use theme::Theme;

/// A pane either captured its data or carries the error text instead.
pub type Section<T> = std::result::Result<T, String>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaneKind {
    Registers,
    Assembly,
    Stack,
}

impl PaneKind {
    pub const ALL: [PaneKind; 3] = [PaneKind::Registers, PaneKind::Assembly, PaneKind::Stack];

    pub fn title(self) -> &'static str {
        match self {
            PaneKind::Registers => "Register",
            PaneKind::Assembly => "Assembly",
            PaneKind::Stack => "Stack",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pane {
    pub kind: PaneKind,
    pub lines: Vec<Line<'static>>,
}

#[derive(Debug, Clone)]
pub struct DisasmView {
    pub pc: u64,
    pub instructions: Vec<Instruction>,
}

/// Everything gathered at one stop.
#[derive(Debug, Clone)]
pub struct HudView {
    pub registers: Section<Vec<RegisterEntry>>,
    pub disasm: Section<DisasmView>,
    pub stack: Section<MemoryBlock>,
}

#[derive(Debug)]
pub enum StopOutcome {
    Halted,
    Exited(String),
}

#[derive(Debug)]
pub struct Hud {
    pub theme: Theme,
    stack_bytes: usize,
    snapshot: RegisterSnapshot,
    last: Option<HudView>,
}

impl Hud {
    pub fn new(theme: Theme, stack_bytes: usize) -> Self {
        Self {
            theme,
            stack_bytes,
            snapshot: RegisterSnapshot::default(),
            last: None,
        }
    }

    pub fn last_view(&self) -> Option<&HudView> {
        self.last.as_ref()
    }

    /// Stop handler: capture every pane, or forget state when the inferior exited.
    pub fn on_stop(&mut self, session: &mut MiSession, stop: &StoppedLocation) -> StopOutcome {
        if stop.is_exit() {
            self.snapshot.reset();
            self.last = None;
            return StopOutcome::Exited(describe_exit(stop));
        }
        let t0 = Instant::now();
        let registers = self.capture_registers(session);
        let t1 = Instant::now();
        let disasm = capture_disasm(session);
        let t2 = Instant::now();
        let stack = session
            .read_memory("$sp", self.stack_bytes)
            .map_err(|e| e.to_string());
        let t3 = Instant::now();
        log_trace(&format!(
            "[hud] on_stop: registers={}ms, disasm={}ms, stack={}ms",
            (t1 - t0).as_millis(),
            (t2 - t1).as_millis(),
            (t3 - t2).as_millis()
        ));
        self.last = Some(HudView {
            registers,
            disasm,
            stack,
        });
        StopOutcome::Halted
    }

    fn capture_registers(&mut self, session: &mut MiSession) -> Section<Vec<RegisterEntry>> {
        let text = session.register_text().map_err(|e| e.to_string())?;
        let raw = parse_register_lines(&text);
        if raw.is_empty() {
            return Err("no registers reported".to_string());
        }
        self.snapshot.update(&raw);
        Ok(self.snapshot.entries().to_vec())
    }

    pub fn pane(&self, kind: PaneKind, width: usize) -> Option<Pane> {
        let view = self.last.as_ref()?;
        Some(build_pane(view, kind, width, &self.theme))
    }

    /// All panes of the last stop, in display order.
    pub fn panes(&self, width: usize) -> Vec<Pane> {
        PaneKind::ALL
            .iter()
            .filter_map(|kind| self.pane(*kind, width))
            .collect()
    }
}

fn capture_disasm(session: &mut MiSession) -> Section<DisasmView> {
    let pc = session.frame_pc().map_err(|e| e.to_string())?;
    let insns = match session.disassemble_function(pc) {
        Ok(insns) if !insns.is_empty() => insns,
        _ => {
            let iset = instruction_set(session);
            let (start, end) = disasm::fallback_range(pc, iset);
            session
                .disassemble_range(start, end)
                .map_err(|e| e.to_string())?
        }
    };
    Ok(DisasmView {
        pc,
        instructions: disasm::window(&insns, pc).to_vec(),
    })
}

fn instruction_set(session: &mut MiSession) -> InstructionSet {
    let arch = session.arch.as_deref().unwrap_or("");
    if disasm::is_aarch64(arch) {
        return InstructionSet::A64;
    }
    if !disasm::is_arm32(arch) {
        return InstructionSet::Variable;
    }
    match session.read_register_u64("cpsr") {
        Ok(cpsr) => InstructionSet::from_cpsr(cpsr),
        Err(e) => {
            log_trace(&format!("[hud] cpsr unreadable, assuming ARM mode: {}", e));
            InstructionSet::Arm
        }
    }
}

pub fn build_pane(view: &HudView, kind: PaneKind, width: usize, theme: &Theme) -> Pane {
    let lines = match kind {
        PaneKind::Registers => match &view.registers {
            Ok(entries) => registers::render(entries, width, theme),
            Err(e) => error_lines(e, theme),
        },
        PaneKind::Assembly => match &view.disasm {
            Ok(d) => disasm::render(&d.instructions, d.pc, theme),
            Err(e) => error_lines(e, theme),
        },
        PaneKind::Stack => match &view.stack {
            Ok(block) => stack::render(block, width, theme),
            Err(e) => error_lines(e, theme),
        },
    };
    Pane { kind, lines }
}

fn error_lines(msg: &str, theme: &Theme) -> Vec<Line<'static>> {
    vec![Line::from(Span::styled(
        format!("  <unavailable: {}>", msg),
        theme.error,
    ))]
}

pub fn describe_stop(loc: &StoppedLocation) -> String {
    let where_str = match (&loc.file, &loc.line, &loc.func, loc.addr) {
        (Some(f), Some(l), Some(func), _) => format!("stopped at {}:{} ({})", f, l, func),
        (Some(f), Some(l), None, _) => format!("stopped at {}:{}", f, l),
        (_, _, Some(func), Some(addr)) => format!("stopped at 0x{:x} in {}", addr, func),
        (_, _, None, Some(addr)) => format!("stopped at 0x{:x}", addr),
        _ => "stopped (location unknown)".to_string(),
    };
    match (&loc.reason, &loc.signal_name) {
        (_, Some(sig)) => format!("{} | signal: {}", where_str, sig),
        (Some(reason), None) => format!("{} | reason: {}", where_str, reason),
        (None, None) => where_str,
    }
}

fn describe_exit(loc: &StoppedLocation) -> String {
    match (&loc.exit_code, &loc.signal_name) {
        (Some(code), _) => format!("inferior exited with code {}", code),
        (None, Some(sig)) => format!("inferior terminated by {}", sig),
        (None, None) => "inferior exited normally".to_string(),
    }
}
