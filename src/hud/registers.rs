use crate::hud::layout;
use crate::hud::theme::Theme;
use crate::mi::RawRegister;
use ratatui::text::{Line, Span};
use std::collections::HashMap;

pub const MIN_CELL_WIDTH: usize = 25;
const CELL_MARGIN: usize = 5;
const MIN_NAME_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterEntry {
    pub name: String,
    pub value: String,
    pub changed: bool,
}

/// The registers seen at the last stop. Only one prior snapshot is kept.
#[derive(Debug, Default)]
pub struct RegisterSnapshot {
    entries: Vec<RegisterEntry>,
    values: HashMap<String, String>,
}

impl RegisterSnapshot {
    /// Replace the snapshot with `raw`, flagging values that differ from the
    /// previous stop. Nothing is flagged on the first update.
    pub fn update(&mut self, raw: &[RawRegister]) {
        let first = self.values.is_empty();
        let mut entries = Vec::with_capacity(raw.len());
        let mut values = HashMap::with_capacity(raw.len());
        for reg in raw {
            let value = normalize_value(&reg.value);
            let changed = !first
                && self
                    .values
                    .get(&reg.name)
                    .is_some_and(|old| *old != value);
            values.insert(reg.name.clone(), value.clone());
            entries.push(RegisterEntry {
                name: reg.name.clone(),
                value,
                changed,
            });
        }
        self.entries = entries;
        self.values = values;
    }

    pub fn entries(&self) -> &[RegisterEntry] {
        &self.entries
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.values.clear();
    }
}

/// Hex values get at least eight digits; anything else is padded to 18 columns.
pub fn normalize_value(raw: &str) -> String {
    match raw.strip_prefix("0x") {
        Some(digits) => format!("0x{:0>8}", digits),
        None => format!("{:<18}", raw),
    }
}

fn column_widths(entries: &[RegisterEntry]) -> (usize, usize) {
    let name_w = entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_NAME_WIDTH);
    let value_w = entries
        .iter()
        .map(|e| e.value.chars().count())
        .max()
        .unwrap_or(0);
    (name_w, value_w)
}

pub fn cell_width(entries: &[RegisterEntry]) -> usize {
    let (name_w, value_w) = column_widths(entries);
    (CELL_MARGIN + name_w + 1 + value_w + CELL_MARGIN).max(MIN_CELL_WIDTH)
}

pub fn render(entries: &[RegisterEntry], width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let (name_w, value_w) = column_widths(entries);
    let cell = cell_width(entries);
    let cols = layout::fit(width, cell);
    let slot = cell + cols.padding;
    let margin = " ".repeat(CELL_MARGIN);

    entries
        .chunks(cols.per_line)
        .map(|row| {
            let mut spans = Vec::with_capacity(row.len() * 4);
            for entry in row {
                let value_style = if entry.changed {
                    theme.value_changed
                } else {
                    theme.value_unchanged
                };
                spans.push(Span::styled(
                    format!("{}{:>w$}", margin, entry.name, w = name_w),
                    theme.register_name,
                ));
                spans.push(Span::raw("-"));
                spans.push(Span::styled(
                    format!("{:<w$}", entry.value, w = value_w),
                    value_style,
                ));
                let used = CELL_MARGIN + name_w + 1 + value_w;
                spans.push(Span::raw(" ".repeat(slot.saturating_sub(used))));
            }
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> Vec<RawRegister> {
        pairs
            .iter()
            .map(|(n, v)| RawRegister {
                name: n.to_string(),
                value: v.to_string(),
            })
            .collect()
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("0x1c"), "0x0000001c");
        assert_eq!(normalize_value("0x00007ffff7fe3a40"), "0x00007ffff7fe3a40");
        assert_eq!(normalize_value("[ZF]"), format!("{:<18}", "[ZF]"));
    }

    #[test]
    fn test_first_snapshot_flags_nothing() {
        let mut snap = RegisterSnapshot::default();
        snap.update(&raw(&[("r0", "0x1"), ("r1", "0x2")]));
        assert!(snap.entries().iter().all(|e| !e.changed));
        assert_eq!(snap.entries()[0].value, "0x00000001");
    }

    #[test]
    fn test_changed_flags_follow_previous_stop_only() {
        let mut snap = RegisterSnapshot::default();
        snap.update(&raw(&[("r0", "0x1"), ("r1", "0x2")]));
        snap.update(&raw(&[("r0", "0x1"), ("r1", "0x3")]));
        let flags: Vec<bool> = snap.entries().iter().map(|e| e.changed).collect();
        assert_eq!(flags, vec![false, true]);

        // Same values again: the flag clears.
        snap.update(&raw(&[("r0", "0x1"), ("r1", "0x3")]));
        assert!(snap.entries().iter().all(|e| !e.changed));
    }

    #[test]
    fn test_new_register_is_not_flagged_and_order_is_kept() {
        let mut snap = RegisterSnapshot::default();
        snap.update(&raw(&[("r0", "0x1")]));
        snap.update(&raw(&[("sp", "0x10"), ("r0", "0x2")]));
        let names: Vec<&str> = snap.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["sp", "r0"]);
        assert!(!snap.entries()[0].changed);
        assert!(snap.entries()[1].changed);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut snap = RegisterSnapshot::default();
        snap.update(&raw(&[("r0", "0x1")]));
        snap.reset();
        snap.update(&raw(&[("r0", "0x2")]));
        assert!(!snap.entries()[0].changed);
    }

    #[test]
    fn test_render_grid_fits_width() {
        let mut snap = RegisterSnapshot::default();
        snap.update(&raw(&[
            ("r0", "0x1"),
            ("r1", "0x2"),
            ("r2", "0x3"),
            ("r3", "0x4"),
            ("sp", "0xbefff000"),
        ]));
        // 5 + 4 + 1 + 10 + 5 = 25 columns per cell, three cells on 80 columns.
        assert_eq!(cell_width(snap.entries()), 25);
        let lines = render(snap.entries(), 80, &Theme::default());
        assert_eq!(lines.len(), 2);
        let first = line_text(&lines[0]);
        assert_eq!(first.chars().count(), 78);
        assert!(first.starts_with("       r0-0x00000001"));
        assert!(line_text(&lines[1]).contains("  sp-0xbefff000"));
    }

    #[test]
    fn test_render_styles_changed_values() {
        let theme = Theme::default();
        let mut snap = RegisterSnapshot::default();
        snap.update(&raw(&[("r0", "0x1"), ("r1", "0x2")]));
        snap.update(&raw(&[("r0", "0x9"), ("r1", "0x2")]));
        let lines = render(snap.entries(), 80, &theme);
        let spans = &lines[0].spans;
        assert_eq!(spans[2].style, theme.value_changed);
        assert_eq!(spans[6].style, theme.value_unchanged);
    }

    #[test]
    fn test_long_names_widen_cells() {
        let mut snap = RegisterSnapshot::default();
        snap.update(&raw(&[("fs_base", "0x00007ffff7d8a740"), ("rax", "0x1c")]));
        assert_eq!(cell_width(snap.entries()), 5 + 7 + 1 + 18 + 5);
        let lines = render(snap.entries(), 40, &Theme::default());
        assert_eq!(lines.len(), 2);
        let expected = format!("{}rax-0x0000001c", " ".repeat(5 + 4));
        assert!(line_text(&lines[1]).starts_with(&expected));
    }
}
