use crate::chat_message::ChatBubble;
use crate::widget::ChatWidget;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

/// Draws the transcript, honouring the widget's scroll position.
pub fn draw_transcript(f: &mut Frame<'_>, area: Rect, widget: &mut ChatWidget) -> Rect {
    if widget.transcript.is_empty() {
        let hint = Paragraph::new("Ask about software used in law, construction or tech.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, area);
        return area;
    }

    let dots = widget.status_indicator.thinking_dots();
    let mut lines: Vec<Line> = Vec::new();
    for message in widget.transcript.iter() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(ChatBubble::new(message, &dots).render(area.width));
    }

    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let scroll = widget.effective_scroll(total_lines, area.height);

    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
    area
}
