use crate::hud::theme::Theme;
use crate::mi::Instruction;
use ratatui::text::{Line, Span};

/// Instructions shown above the current one.
pub const BEFORE: usize = 4;
/// Total instructions in the window.
pub const COUNT: usize = 10;
/// Upper bound on an instruction's encoding, used to size fallback ranges.
const MAX_INSN_BYTES: u64 = 16;
const THUMB_BIT: u64 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionSet {
    Arm,
    Thumb,
    /// AArch64: always 4 bytes, no mode bit.
    A64,
    /// Variable or unknown encoding width.
    Variable,
}

impl InstructionSet {
    pub fn from_cpsr(cpsr: u64) -> Self {
        if cpsr & THUMB_BIT == 0 {
            InstructionSet::Arm
        } else {
            InstructionSet::Thumb
        }
    }

    pub fn width(self) -> Option<u64> {
        match self {
            InstructionSet::Arm | InstructionSet::A64 => Some(4),
            InstructionSet::Thumb => Some(2),
            InstructionSet::Variable => None,
        }
    }
}

/// 32-bit ARM reports its mode in CPSR; AArch64 does not.
pub fn is_arm32(arch: &str) -> bool {
    let a = arch.to_ascii_lowercase();
    a.starts_with("arm") && !a.contains("aarch64") && a != "arm64"
}

pub fn is_aarch64(arch: &str) -> bool {
    let a = arch.to_ascii_lowercase();
    a.contains("aarch64") || a == "arm64"
}

/// Address range to disassemble when the enclosing function is unknown.
pub fn fallback_range(pc: u64, iset: InstructionSet) -> (u64, u64) {
    let start = match iset.width() {
        Some(w) => pc.saturating_sub(BEFORE as u64 * w),
        None => pc,
    };
    let end = pc.saturating_add(COUNT as u64 * MAX_INSN_BYTES);
    (start, end)
}

/// Up to `COUNT` instructions around `pc`, `BEFORE` of them ahead of it when
/// the listing allows.
pub fn window(insns: &[Instruction], pc: u64) -> &[Instruction] {
    if insns.is_empty() {
        return insns;
    }
    let anchor = insns
        .iter()
        .position(|i| i.address >= pc)
        .unwrap_or(insns.len() - 1);
    let mut start = anchor.saturating_sub(BEFORE);
    let end = (start + COUNT).min(insns.len());
    if end - start < COUNT {
        start = end.saturating_sub(COUNT);
    }
    &insns[start..end]
}

pub fn render(insns: &[Instruction], pc: u64, theme: &Theme) -> Vec<Line<'static>> {
    let digits = insns
        .iter()
        .map(|i| format!("{:x}", i.address).len())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(insns.len() + 2);
    lines.push(Line::default());
    for insn in insns {
        let current = insn.address == pc;
        let marker = if current { "-->  " } else { "     " };
        let mut spans = vec![
            Span::styled(marker, theme.pc_marker),
            Span::styled(
                format!("0x{:0d$x}:  ", insn.address, d = digits),
                theme.address,
            ),
        ];
        if let (Some(func), Some(offset)) = (&insn.func, insn.offset) {
            spans.push(Span::styled(format!("<{}+{}>  ", func, offset), theme.symbol));
        }
        let style = if current { theme.insn_current } else { theme.insn };
        spans.push(Span::styled(insn.text.clone(), style));
        lines.push(Line::from(spans));
    }
    lines.push(Line::default());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(start: u64, step: u64, n: usize) -> Vec<Instruction> {
        (0..n)
            .map(|i| Instruction {
                address: start + i as u64 * step,
                func: Some("main".to_string()),
                offset: Some(i as u64 * step),
                text: format!("nop ; {}", i),
            })
            .collect()
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_instruction_set_from_cpsr() {
        assert_eq!(InstructionSet::from_cpsr(0x6000_01d3), InstructionSet::Arm);
        assert_eq!(InstructionSet::from_cpsr(0x6000_0030), InstructionSet::Thumb);
        assert_eq!(InstructionSet::Arm.width(), Some(4));
        assert_eq!(InstructionSet::Thumb.width(), Some(2));
        assert_eq!(InstructionSet::Variable.width(), None);
    }

    #[test]
    fn test_is_arm32() {
        assert!(is_arm32("arm"));
        assert!(is_arm32("armv7"));
        assert!(!is_arm32("aarch64"));
        assert!(!is_arm32("i386:x86-64"));
        assert!(is_aarch64("aarch64"));
        assert!(!is_aarch64("armv7"));
    }

    #[test]
    fn test_fallback_range() {
        assert_eq!(fallback_range(0x8040, InstructionSet::Arm), (0x8030, 0x8040 + 160));
        assert_eq!(fallback_range(0x8040, InstructionSet::Thumb), (0x8038, 0x8040 + 160));
        assert_eq!(fallback_range(0x400580, InstructionSet::A64).0, 0x400570);
        assert_eq!(fallback_range(0x401000, InstructionSet::Variable).0, 0x401000);
        assert_eq!(fallback_range(4, InstructionSet::Arm).0, 0);
    }

    #[test]
    fn test_window_centers_on_pc() {
        let insns = listing(0x1000, 4, 30);
        let w = window(&insns, 0x1000 + 12 * 4);
        assert_eq!(w.len(), COUNT);
        assert_eq!(w[BEFORE].address, 0x1000 + 12 * 4);
    }

    #[test]
    fn test_window_near_function_edges() {
        let insns = listing(0x1000, 4, 30);
        let w = window(&insns, 0x1004);
        assert_eq!(w[0].address, 0x1000);
        assert_eq!(w.len(), COUNT);

        let w = window(&insns, 0x1000 + 29 * 4);
        assert_eq!(w.len(), COUNT);
        assert_eq!(w[COUNT - 1].address, 0x1000 + 29 * 4);

        let short = listing(0x1000, 4, 3);
        assert_eq!(window(&short, 0x1004).len(), 3);
        assert!(window(&[], 0x1000).is_empty());
    }

    #[test]
    fn test_render_marks_current_instruction() {
        let theme = Theme::default();
        let insns = listing(0x401120, 2, 3);
        let lines = render(&insns, 0x401122, &theme);
        assert_eq!(lines.len(), 5);
        assert_eq!(line_text(&lines[1]), "     0x401120:  <main+0>  nop ; 0");
        assert_eq!(line_text(&lines[2]), "-->  0x401122:  <main+2>  nop ; 1");
        let last = lines[2].spans.last().unwrap();
        assert_eq!(last.style, theme.insn_current);
        assert_eq!(lines[3].spans.last().unwrap().style, theme.insn);
    }
}
