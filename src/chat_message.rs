use crate::constants::{BUBBLE_BOTTOM, BUBBLE_SIDE, BUBBLE_TOP, USER_INDENT};
use crate::message::{Message, MessageState};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

/// Renders one message as a bubble of terminal lines.
pub struct ChatBubble<'a> {
    message: &'a Message,
    thinking_dots: &'a str,
}

impl<'a> ChatBubble<'a> {
    pub fn new(message: &'a Message, thinking_dots: &'a str) -> Self {
        Self {
            message,
            thinking_dots,
        }
    }

    pub fn render(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let base_style = self.get_base_style();

        self.render_header(&mut lines, base_style);
        self.render_content(&mut lines, width, base_style);
        self.render_footer(&mut lines, base_style);

        lines
    }

    fn indent(&self) -> &'static str {
        if self.message.from_user() {
            USER_INDENT
        } else {
            ""
        }
    }

    fn get_base_style(&self) -> Style {
        let style = Style::default().fg(if self.message.from_user() {
            Color::Rgb(255, 223, 128)
        } else {
            Color::Rgb(144, 238, 144)
        });

        match self.message.state() {
            MessageState::Error => style.fg(Color::Red),
            MessageState::Pending => style.add_modifier(Modifier::DIM),
            MessageState::Final => style,
        }
    }

    fn render_header(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let timestamp = self.message.created_at().format("%H:%M").to_string();
        let who = if self.message.from_user() { "You" } else { "Bot" };

        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled(BUBBLE_TOP.to_string(), style),
            Span::styled(who.to_string(), style.add_modifier(Modifier::BOLD)),
            Span::styled(" ", style),
            Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
        ]));
    }

    fn render_content(&self, lines: &mut Vec<Line<'static>>, width: u16, style: Style) {
        if self.message.is_pending() {
            lines.push(Line::from(vec![
                Span::styled(self.indent().to_string(), style),
                Span::styled(BUBBLE_SIDE.to_string(), style),
                Span::styled(self.thinking_dots.to_string(), style),
            ]));
            return;
        }

        let gutter = self.indent().width() + BUBBLE_SIDE.width();
        let wrap_width = (width as usize).saturating_sub(gutter).max(1);

        for raw_line in self.message.text().split('\n') {
            for wrapped_line in wrap(raw_line, wrap_width) {
                lines.push(Line::from(vec![
                    Span::styled(self.indent().to_string(), style),
                    Span::styled(BUBBLE_SIDE.to_string(), style),
                    Span::styled(wrapped_line.into_owned(), style),
                ]));
            }
        }
    }

    fn render_footer(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled(BUBBLE_BOTTOM.to_string(), style),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChatError;
    use crate::message::Transcript;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_pending_bubble_shows_dots_only() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending_bot();
        let lines = ChatBubble::new(transcript.get(id).unwrap(), "● ○ ○").render(40);

        assert_eq!(lines.len(), 3);
        assert_eq!(plain(&lines[1]), "│ ● ○ ○");
    }

    #[test]
    fn test_reply_replaces_dots() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending_bot();
        transcript.resolve(id, Ok("Hello!".into())).unwrap();
        let lines = ChatBubble::new(transcript.get(id).unwrap(), "● ○ ○").render(40);

        assert_eq!(plain(&lines[1]), "│ Hello!");
        assert!(!lines.iter().any(|l| plain(l).contains('●')));
    }

    #[test]
    fn test_user_bubble_is_indented_and_wrapped() {
        let mut transcript = Transcript::new();
        let id = transcript.push_user("one two three four five six");
        let lines = ChatBubble::new(transcript.get(id).unwrap(), "").render(20);

        let body: Vec<String> = lines[1..lines.len() - 1].iter().map(plain).collect();
        assert!(body.len() > 1);
        assert!(body.iter().all(|l| l.starts_with("    │ ")));
        assert!(body.iter().all(|l| l.width() <= 20));
    }

    #[test]
    fn test_error_bubble_is_red() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending_bot();
        transcript
            .resolve(id, Err(ChatError::api_error("refused")))
            .unwrap();
        let lines = ChatBubble::new(transcript.get(id).unwrap(), "").render(60);

        assert_eq!(lines[1].spans[2].style.fg, Some(Color::Red));
        assert_eq!(plain(&lines[1]), "│ ⚠️ Error: Unable to reach the server.");
    }

    #[test]
    fn test_markup_is_kept_literal() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending_bot();
        transcript
            .resolve(id, Ok("<b>bold</b>\n\nnext".into()))
            .unwrap();
        let lines = ChatBubble::new(transcript.get(id).unwrap(), "").render(60);
        let body: Vec<String> = lines[1..lines.len() - 1].iter().map(plain).collect();
        assert_eq!(body, vec!["│ <b>bold</b>", "│ ", "│ next"]);
    }
}
