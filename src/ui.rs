// src/ui.rs

pub mod chat;
pub mod evaluation;
pub mod footer;
pub mod header;
pub mod input;
pub mod pipeline;
pub mod toggler;

use crate::app::View;
use crate::evaluation::EvaluationTable;
use crate::key_handlers::ControlLayout;
use crate::log_view::LogView;
use crate::widget::ChatWidget;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Clear},
    Frame,
};

const PANEL_WIDTH: u16 = 64;
const PANEL_HEIGHT: u16 = 26;

/// Draws the whole screen and returns where the clickable controls ended up.
pub fn draw(f: &mut Frame, widget: &mut ChatWidget) -> ControlLayout {
    let size = f.area();
    let mut layout = ControlLayout::default();
    if size.height == 0 || size.width == 0 {
        return layout;
    }

    let bottom_row = Rect {
        x: size.x,
        y: size.y + size.height - 1,
        width: size.width,
        height: 1,
    };
    footer::draw_footer(f, bottom_row, View::Chat, widget.is_open());
    layout.toggler = Some(toggler::draw_toggler(f, bottom_row, widget.is_open()));

    if !widget.is_open() {
        return layout;
    }

    let panel = panel_area(size);
    if panel.height < 8 {
        return layout;
    }

    f.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(panel);
    f.render_widget(block, panel);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(inner);

    layout.close = Some(header::draw_header(f, chunks[0]));
    layout.transcript = Some(chat::draw_transcript(f, chunks[1], widget));
    widget.status_indicator.render(f, chunks[2]);
    layout.send = Some(input::draw_input(f, chunks[3], widget));

    layout
}

/// Draws the pipeline or evaluation panel over the whole screen. Panels have no
/// clickable controls.
pub fn draw_panel(f: &mut Frame, view: View, log: &mut LogView, table: &EvaluationTable) {
    let size = f.area();
    if size.height < 2 || size.width == 0 {
        return;
    }

    let body = Rect {
        height: size.height - 1,
        ..size
    };
    let bottom_row = Rect {
        y: size.y + size.height - 1,
        height: 1,
        ..size
    };
    match view {
        View::Pipeline => pipeline::draw_pipeline(f, body, log),
        View::Evaluation => evaluation::draw_evaluation(f, body, table),
        View::Chat => return,
    }
    footer::draw_footer(f, bottom_row, view, false);
}

/// The widget floats above the bottom row, anchored to the right edge.
fn panel_area(size: Rect) -> Rect {
    let width = size.width.min(PANEL_WIDTH);
    let height = size.height.saturating_sub(1).min(PANEL_HEIGHT);
    Rect {
        x: size.x + size.width - width,
        y: size.y + size.height - 1 - height,
        width,
        height,
    }
}
