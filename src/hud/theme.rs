use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub border: Color,
    pub title: Color,

    pub register_name: Style,
    pub value_changed: Style,
    pub value_unchanged: Style,

    pub address: Style,
    pub stack_byte: Style,
    pub stack_separator: Style,
    pub stack_ascii: Style,

    pub pc_marker: Style,
    pub insn_current: Style,
    pub insn: Style,
    pub symbol: Style,

    pub error: Style,
    pub log: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let dim = Style::default().fg(Color::DarkGray);
        let red = Style::default().fg(Color::Red);
        Self {
            border: Color::Cyan,
            title: Color::Cyan,

            register_name: red,
            value_changed: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            value_unchanged: dim,

            address: red,
            stack_byte: dim,
            stack_separator: Style::default().fg(Color::Cyan),
            stack_ascii: dim,

            pc_marker: red,
            insn_current: Style::default().fg(Color::Green),
            insn: Style::default().fg(Color::White),
            symbol: dim,

            error: Style::default().fg(Color::Yellow),
            log: Style::default().fg(Color::Gray),
        }
    }
}
