use crate::constants::{INPUT_PLACEHOLDER, SEND_LABEL};
use crate::widget::ChatWidget;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Draws the input box and the send control. Returns the send control's area.
pub fn draw_input(f: &mut Frame<'_>, area: Rect, widget: &ChatWidget) -> Rect {
    let send_width = SEND_LABEL.width() as u16 + 1;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(send_width)])
        .split(area);

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(chunks[0]);

    // Only the last line of a multi-line draft is visible.
    let last_line = widget.input().rsplit('\n').next().unwrap_or("");
    let line_count = widget.input().split('\n').count();
    let prefix = if line_count > 1 {
        format!("{}↵ ", line_count - 1)
    } else {
        "→ ".to_string()
    };

    let content = if widget.input().is_empty() {
        Line::from(vec![
            Span::styled(prefix.clone(), Style::default().fg(Color::DarkGray)),
            Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            Span::styled(prefix.clone(), Style::default().fg(Color::DarkGray)),
            Span::styled(last_line.to_string(), Style::default().fg(Color::White)),
        ])
    };

    let text_width = (prefix.width() + last_line.width()) as u16;
    let visible_width = inner.width.saturating_sub(1);
    let scroll_offset = text_width.saturating_sub(visible_width);

    f.render_widget(block, chunks[0]);
    f.render_widget(Paragraph::new(content).scroll((0, scroll_offset)), inner);

    if inner.width > 0 && inner.height > 0 {
        f.set_cursor_position((inner.x + text_width - scroll_offset, inner.y));
    }

    let send_style = if widget.send_enabled() {
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let send = Rect {
        x: chunks[1].x + 1,
        y: chunks[1].y + chunks[1].height / 2,
        width: chunks[1].width.saturating_sub(1),
        height: 1,
    };
    f.render_widget(Paragraph::new(Span::styled(SEND_LABEL, send_style)), send);

    send
}
