use crate::hud::theme::Theme;
use crate::mi::MemoryBlock;
use ratatui::text::{Line, Span};

pub const BYTES_PER_ROW: usize = 8;
const NARROW_BYTES_PER_ROW: usize = 4;
const MIN_ADDR_DIGITS: usize = 8;
const NON_PRINTABLE: char = '·';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLine {
    pub address: u64,
    pub bytes: Vec<u8>,
}

impl StackLine {
    pub fn printable(&self) -> String {
        self.bytes.iter().map(|b| printable_char(*b)).collect()
    }
}

/// Graphic ASCII only; space and control bytes collapse to a dot.
pub fn printable_char(b: u8) -> char {
    if b > 0x20 && b < 0x7f {
        b as char
    } else {
        NON_PRINTABLE
    }
}

pub fn split_rows(block: &MemoryBlock, per_row: usize) -> Vec<StackLine> {
    let per_row = per_row.max(1);
    block
        .bytes
        .chunks(per_row)
        .enumerate()
        .map(|(i, chunk)| StackLine {
            address: block.address.wrapping_add((i * per_row) as u64),
            bytes: chunk.to_vec(),
        })
        .collect()
}

fn addr_digits(block: &MemoryBlock) -> usize {
    let last = block
        .address
        .wrapping_add(block.bytes.len().saturating_sub(1) as u64);
    let digits = format!("{:x}", last.max(block.address)).len();
    digits.max(MIN_ADDR_DIGITS)
}

fn row_width(per_row: usize, digits: usize) -> usize {
    // "  0x" + addr + "  " + "aa bb .." + "  │ " + chars
    4 + digits + 2 + (per_row * 3 - 1) + 4 + per_row
}

/// Eight bytes per row when the terminal allows it, four otherwise.
pub fn bytes_per_row(width: usize, block: &MemoryBlock) -> usize {
    if row_width(BYTES_PER_ROW, addr_digits(block)) <= width {
        BYTES_PER_ROW
    } else {
        NARROW_BYTES_PER_ROW
    }
}

pub fn render(block: &MemoryBlock, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let per_row = bytes_per_row(width, block);
    let digits = addr_digits(block);
    let hex_width = per_row * 3 - 1;

    split_rows(block, per_row)
        .into_iter()
        .map(|row| {
            let hex = row
                .bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            Line::from(vec![
                Span::styled(
                    format!("  0x{:0d$x}  ", row.address, d = digits),
                    theme.address,
                ),
                Span::styled(format!("{:<w$}", hex, w = hex_width), theme.stack_byte),
                Span::raw("  "),
                Span::styled("│", theme.stack_separator),
                Span::raw(" "),
                Span::styled(row.printable(), theme.stack_ascii),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn block(address: u64, bytes: &[u8]) -> MemoryBlock {
        MemoryBlock {
            address,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn printable_char_boundaries() {
        assert_eq!(printable_char(b'A'), 'A');
        assert_eq!(printable_char(b'~'), '~');
        assert_eq!(printable_char(b'!'), '!');
        assert_eq!(printable_char(b' '), '·');
        assert_eq!(printable_char(0x7f), '·');
        assert_eq!(printable_char(0x00), '·');
        assert_eq!(printable_char(0xff), '·');
    }

    #[test]
    fn split_rows_advances_addresses() {
        let data: Vec<u8> = (0u8..20).collect();
        let rows = split_rows(&block(0x1000, &data), 8);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].address, 0x1008);
        assert_eq!(rows[2].address, 0x1010);
        assert_eq!(rows[2].bytes.len(), 4);
    }

    #[test]
    fn render_row_layout() {
        let data = b"Hi!\n\x00strongdb";
        let lines = render(&block(0xbefff000, data), 80, &Theme::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(
            line_text(&lines[0]),
            "  0xbefff000  48 69 21 0a 00 73 74 72  │ Hi!··str"
        );
        // Short rows keep the separator in the same column.
        assert_eq!(
            line_text(&lines[1]),
            format!("  0xbefff008  6f 6e 67 64 62{}│ ongdb", " ".repeat(9 + 2))
        );
    }

    #[test]
    fn narrow_terminal_uses_four_byte_rows() {
        let data = [0u8; 16];
        let b = block(0x7ffe_3b2c_1a40, &data);
        assert_eq!(bytes_per_row(120, &b), 8);
        assert_eq!(bytes_per_row(40, &b), 4);
        assert_eq!(render(&b, 40, &Theme::default()).len(), 4);
    }

    #[test]
    fn stack_window_of_48_bytes_is_six_rows() {
        let data = [0x41u8; 48];
        let lines = render(&block(0x7ffe_0000, &data), 100, &Theme::default());
        assert_eq!(lines.len(), 6);
        assert!(line_text(&lines[5]).ends_with("│ AAAAAAAA"));
    }
}
