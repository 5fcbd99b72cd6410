use crate::evaluation::EvaluationTable;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// Draws the evaluation results table and the answers of the selected row.
pub fn draw_evaluation(f: &mut Frame<'_>, area: Rect, table: &EvaluationTable) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Min(3)])
        .split(area);

    let title = if table.is_loading() {
        " Evaluation (loading...) "
    } else {
        " Evaluation "
    };

    if table.rows().is_empty() {
        let text = match table.error() {
            Some(error) => Span::styled(error.to_string(), Style::default().fg(Color::LightRed)),
            None if table.is_loading() || !table.has_loaded() => Span::styled(
                "Loading evaluation results...",
                Style::default().fg(Color::DarkGray),
            ),
            None => Span::styled("No evaluation results.", Style::default().fg(Color::DarkGray)),
        };
        f.render_widget(Paragraph::new(text).block(panel_block(title)), area);
        return;
    }

    let header = Row::new(["Question", "RAG", "LLM"]).style(
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
    );
    let rows = table.rows().iter().map(|row| {
        Row::new([
            Cell::from(row.question.as_str()),
            Cell::from(row.rag_relevance.as_str()),
            Cell::from(row.llm_relevance.as_str()),
        ])
    });
    let widths = [
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(8),
    ];
    let mut block = panel_block(title);
    if let Some(error) = table.error() {
        block = block.title_bottom(Span::styled(
            format!(" {} ", error),
            Style::default().fg(Color::LightRed),
        ));
    }
    let widget = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = TableState::default().with_selected(Some(table.selected()));
    f.render_stateful_widget(widget, chunks[0], &mut state);

    let detail = match table.selected_row() {
        Some(row) => vec![
            Line::from(Span::styled(
                "RAG answer",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(row.rag_answer.as_str()),
            Line::from(""),
            Line::from(Span::styled(
                "LLM-only answer",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(row.llm_answer.as_str()),
        ],
        None => Vec::new(),
    };
    f.render_widget(
        Paragraph::new(detail)
            .block(panel_block(" Answers "))
            .wrap(Wrap { trim: false }),
        chunks[1],
    );
}
