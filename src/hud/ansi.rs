//! Line-mode output: panes written straight to the terminal with SGR colors.

use crate::hud::layout::{bottom_border, top_border};
use crate::hud::theme::Theme;
use crate::hud::Pane;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor, Stylize},
    terminal::{self, Clear, ClearType},
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use std::io::{self, Write};

const FALLBACK_WIDTH: u16 = 80;

/// Column count of the controlling terminal.
pub fn terminal_width() -> u16 {
    match terminal::size() {
        Ok((cols, _)) if cols > 0 => cols,
        _ => FALLBACK_WIDTH,
    }
}

#[derive(Debug, Clone)]
pub struct AnsiWriter {
    pub width: usize,
    pub color: bool,
    pub theme: Theme,
}

impl AnsiWriter {
    pub fn new(width: usize, color: bool, theme: Theme) -> Self {
        Self {
            width,
            color,
            theme,
        }
    }

    /// Cursor home, then wipe everything below it.
    pub fn clear_screen<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, MoveTo(0, 0), Clear(ClearType::FromCursorDown))
    }

    pub fn write_panes<W: Write>(&self, out: &mut W, panes: &[Pane], clear: bool) -> io::Result<()> {
        if clear {
            self.clear_screen(out)?;
        }
        for pane in panes {
            self.write_pane(out, pane)?;
        }
        out.flush()
    }

    pub fn write_pane<W: Write>(&self, out: &mut W, pane: &Pane) -> io::Result<()> {
        let border = Style::default().fg(self.theme.border);
        self.write_text(out, &top_border(pane.kind.title(), self.width), border)?;
        queue!(out, Print("\n"))?;
        for line in &pane.lines {
            self.write_line(out, line)?;
            queue!(out, Print("\n"))?;
        }
        self.write_text(out, &bottom_border(self.width), border)?;
        queue!(out, Print("\n"))
    }

    pub fn write_line<W: Write>(&self, out: &mut W, line: &Line<'_>) -> io::Result<()> {
        for span in &line.spans {
            self.write_text(out, &span.content, span.style)?;
        }
        Ok(())
    }

    fn write_text<W: Write>(&self, out: &mut W, text: &str, style: Style) -> io::Result<()> {
        let styled = self.color && (style.fg.is_some() || style.add_modifier.contains(Modifier::BOLD));
        if !styled {
            return queue!(out, Print(text));
        }
        if let Some(fg) = style.fg {
            queue!(out, SetForegroundColor(to_term_color(fg)))?;
        }
        if style.add_modifier.contains(Modifier::BOLD) {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)
    }

    /// `-->` in green while the inferior runs, bold red otherwise.
    pub fn prompt(&self, running: bool) -> String {
        if !self.color {
            return "--> ".to_string();
        }
        if running {
            format!("{} ", "-->".dark_green())
        } else {
            format!("{} ", "-->".dark_red().bold())
        }
    }
}

/// ratatui's named colors are the standard ANSI eight plus their bright
/// variants; crossterm calls the standard ones `Dark*` and writes every
/// named color as a palette index (`38;5;N`, N being the classic 0-15).
pub fn to_term_color(color: Color) -> TermColor {
    match color {
        Color::Reset => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    }
}
