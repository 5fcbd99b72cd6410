use crate::constants::{TOGGLER_CLOSE_LABEL, TOGGLER_OPEN_LABEL};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Draws the toggler at the right end of `row` and returns its area.
pub fn draw_toggler(f: &mut Frame<'_>, row: Rect, open: bool) -> Rect {
    let label = if open {
        TOGGLER_CLOSE_LABEL
    } else {
        TOGGLER_OPEN_LABEL
    };
    let width = (label.width() as u16).min(row.width);
    let area = Rect {
        x: row.x + row.width - width,
        y: row.y,
        width,
        height: 1,
    };

    let style = Style::default()
        .fg(Color::Black)
        .bg(Color::LightGreen)
        .add_modifier(Modifier::BOLD);
    f.render_widget(Paragraph::new(Span::styled(label, style)), area);

    area
}
