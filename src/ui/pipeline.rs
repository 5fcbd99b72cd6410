use crate::log_view::LogView;
use crate::pipeline::PipelineStep;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// Draws the pipeline panel: the step list with the run status, then the live log.
pub fn draw_pipeline(f: &mut Frame<'_>, area: Rect, view: &mut LogView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let steps: Vec<Span> = PipelineStep::ALL
        .iter()
        .flat_map(|step| {
            let style = if view.running() == Some(*step) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            [
                Span::styled(format!("[{}] {}", step.shortcut(), step), style),
                Span::raw("  "),
            ]
        })
        .collect();

    let status = match (view.running(), view.outcome()) {
        (Some(step), _) => Line::from(Span::styled(
            format!("Running {}...", step),
            Style::default().fg(Color::Yellow),
        )),
        (None, Some(outcome)) => Line::from(Span::styled(
            outcome.to_string(),
            Style::default().fg(if outcome.contains("failed") {
                Color::LightRed
            } else {
                Color::LightGreen
            }),
        )),
        (None, None) => Line::from(Span::styled(
            "Pick a step to run.",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let header = Paragraph::new(vec![Line::from(steps), status]).block(
        Block::default()
            .title(" Pipeline ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, chunks[0]);

    let block = Block::default()
        .title(" Log ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(chunks[1]);
    let scroll = view.effective_scroll(inner.height);
    let lines: Vec<Line> = view
        .entries()
        .iter()
        .map(|entry| Line::from(entry.as_str()))
        .collect();
    let log = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(log, chunks[1]);
}
