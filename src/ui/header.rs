use crate::constants::{CLOSE_LABEL, WIDGET_TITLE};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Draws the title bar and returns the area of the close control.
pub fn draw_header(f: &mut Frame<'_>, area: Rect) -> Rect {
    let title = Paragraph::new(Span::styled(
        WIDGET_TITLE,
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Left);
    f.render_widget(title, area);

    let close_width = (CLOSE_LABEL.width() as u16).min(area.width);
    let close = Rect {
        x: area.x + area.width - close_width,
        y: area.y,
        width: close_width,
        height: 1,
    };
    f.render_widget(
        Paragraph::new(Span::styled(CLOSE_LABEL, Style::default().fg(Color::LightRed))),
        close,
    );

    close
}
