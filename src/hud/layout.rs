/// How many fixed-width cells fit on one terminal line, and the spare
/// columns handed to each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub per_line: usize,
    pub padding: usize,
}

pub fn fit(term_width: usize, cell_width: usize) -> ColumnLayout {
    let cell_width = cell_width.max(1);
    let per_line = (term_width / cell_width).max(1);
    let padding = (term_width % cell_width) / per_line;
    ColumnLayout { per_line, padding }
}

/// `┌─ Title ───…─┐`, exactly `width` columns unless the title alone is wider.
pub fn top_border(title: &str, width: usize) -> String {
    let head = format!("┌─ {} ", title);
    let used = head.chars().count() + 1;
    let dashes = width.saturating_sub(used);
    format!("{}{}┐", head, "─".repeat(dashes))
}

pub fn bottom_border(width: usize) -> String {
    format!("└{}┘", "─".repeat(width.saturating_sub(2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_spreads_leftover_columns() {
        assert_eq!(fit(80, 25), ColumnLayout { per_line: 3, padding: 1 });
        assert_eq!(fit(100, 25), ColumnLayout { per_line: 4, padding: 0 });
        assert_eq!(fit(120, 33), ColumnLayout { per_line: 3, padding: 7 });
    }

    #[test]
    fn fit_never_drops_below_one_column() {
        assert_eq!(fit(10, 25), ColumnLayout { per_line: 1, padding: 10 });
        assert_eq!(fit(0, 25), ColumnLayout { per_line: 1, padding: 0 });
        assert_eq!(fit(30, 0).per_line, 30);
    }

    #[test]
    fn borders_match_width() {
        let top = top_border("Register", 80);
        assert!(top.starts_with("┌─ Register ─"));
        assert!(top.ends_with('┐'));
        assert_eq!(top.chars().count(), 80);
        assert_eq!(top_border("Stack", 40).chars().count(), 40);

        let bottom = bottom_border(80);
        assert_eq!(bottom.chars().count(), 80);
        assert!(bottom.starts_with('└') && bottom.ends_with('┘'));
    }

    #[test]
    fn top_border_keeps_title_when_narrow() {
        assert_eq!(top_border("Assembly", 5), "┌─ Assembly ┐");
    }
}
