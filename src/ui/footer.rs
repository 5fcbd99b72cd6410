use crate::app::View;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Draws the key hints on the bottom row.
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, view: View, open: bool) {
    let instructions = match view {
        View::Chat if open => {
            "Enter send · Shift/Alt+Enter new line · Esc close · PgUp/PgDn scroll · F3 pipeline · F4 evaluation · Ctrl+C quit"
        }
        View::Chat => "Ctrl+T or F2 to open the chat · F3 pipeline · F4 evaluation · Ctrl+C quit",
        View::Pipeline => "1-5 run a step · f full pipeline · ↑/↓ scroll · Esc back to chat · Ctrl+C quit",
        View::Evaluation => "r refresh · ↑/↓ select · Esc back to chat · Ctrl+C quit",
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Left);

    f.render_widget(footer, area);
}
