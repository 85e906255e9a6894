use crate::hud::theme::Theme;
use crate::hud::PaneKind;
use crate::tui::state::AppState;
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

const LOG_HEIGHT: u16 = 8;
const MIN_PANE_HEIGHT: u16 = 3;

pub fn panel_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(theme.border))
        .title(title)
        .title_style(Style::default().fg(theme.title))
}

pub fn draw(f: &mut Frame, app: &AppState) {
    let full = f.size();
    f.render_widget(Clear, full);

    // Registers take as many rows as their grid needs, up to a third of the screen.
    let reg_lines = app
        .hud
        .pane(PaneKind::Registers, inner_width(full))
        .map(|p| p.lines.len() as u16)
        .unwrap_or(1);
    let reg_height = (reg_lines + 2).clamp(MIN_PANE_HEIGHT, (full.height / 3).max(MIN_PANE_HEIGHT));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(reg_height),
            Constraint::Min(MIN_PANE_HEIGHT),
            Constraint::Length(LOG_HEIGHT),
            Constraint::Length(1),
        ])
        .split(full);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    render_pane(f, app, PaneKind::Registers, rows[0]);
    render_pane(f, app, PaneKind::Assembly, middle[0]);
    render_pane(f, app, PaneKind::Stack, middle[1]);
    render_log(f, app, rows[2]);
    render_cmdline(f, app, rows[3]);
}

fn inner_width(area: Rect) -> usize {
    area.width.saturating_sub(2) as usize
}

fn render_pane(f: &mut Frame, app: &AppState, kind: PaneKind, area: Rect) {
    let theme = &app.hud.theme;
    let title = format!(" {} ", kind.title());
    let lines = match app.hud.pane(kind, inner_width(area)) {
        Some(pane) => pane.lines,
        None => vec![Line::from(Span::styled(
            "  (waiting for the target to stop)",
            theme.log,
        ))],
    };
    let para = Paragraph::new(lines).block(panel_block(&title, theme));
    f.render_widget(para, area);
}

fn render_log(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = &app.hud.theme;
    let visible = area.height.saturating_sub(2);
    let lines: Vec<Line> = app
        .log
        .lines
        .iter()
        .map(|l| Line::from(Span::styled(l.as_str(), theme.log)))
        .collect();
    let para = Paragraph::new(lines)
        .block(panel_block(" Output ", theme))
        .scroll((app.log.top_offset(visible), 0));
    f.render_widget(para, area);
}

fn render_cmdline(f: &mut Frame, app: &AppState, area: Rect) {
    let prompt_style = if app.running {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };
    let line = Line::from(vec![
        Span::styled("-->", prompt_style),
        Span::raw(" "),
        Span::raw(app.input.as_str()),
    ]);
    f.render_widget(Paragraph::new(line), area);

    let cursor_x = area.x + 4 + app.input.chars().count() as u16;
    f.set_cursor(cursor_x.min(area.right().saturating_sub(1)), area.y);
}
