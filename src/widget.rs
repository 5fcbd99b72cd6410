// src/widget.rs

use crate::message::{MessageId, ReplyOutcome, Transcript};
use crate::status_indicator::StatusIndicator;
use log::{debug, warn};

/// One accepted submission: the text to send and the bubble its reply belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub reply_to: MessageId,
    pub text: String,
}

/// The chat widget controller. Owns the transcript, the input field and the
/// open/closed flag. All mutation happens on the UI loop.
#[derive(Debug)]
pub struct ChatWidget {
    pub transcript: Transcript,
    pub status_indicator: StatusIndicator,
    input: String,
    send_enabled: bool,
    open: bool,
    scroll: u16,
    follow_tail: bool,
}

impl ChatWidget {
    pub fn new(open: bool) -> Self {
        Self {
            transcript: Transcript::new(),
            status_indicator: StatusIndicator::new(),
            input: String::new(),
            send_enabled: false,
            open,
            scroll: 0,
            follow_tail: true,
        }
    }

    /// Accepts the current input as a new submission.
    ///
    /// Returns `None` without touching anything when the trimmed input is empty.
    /// Otherwise the user bubble and the pending bot bubble are both in the
    /// transcript before this returns.
    pub fn submit(&mut self) -> Option<Submission> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.clear_input();
        self.transcript.push_user(text.clone());
        let reply_to = self.transcript.push_pending_bot();
        self.scroll_to_end();
        self.refresh_status();

        debug!("Accepted submission {} ({} chars)", reply_to, text.len());
        Some(Submission { reply_to, text })
    }

    /// Settles the pending bubble created by a submission.
    pub fn apply_reply(&mut self, reply_to: MessageId, outcome: ReplyOutcome) {
        // The cause stays out of the log, the same as it stays off the screen.
        if outcome.is_err() {
            warn!("Reply {} failed", reply_to);
        }
        if let Err(e) = self.transcript.resolve(reply_to, outcome) {
            warn!("Dropping reply: {}", e);
            return;
        }
        self.scroll_to_end();
        self.refresh_status();
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.push(c);
        self.input_changed();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        self.input.pop();
        self.input_changed();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.input_changed();
    }

    fn input_changed(&mut self) {
        self.send_enabled = !self.input.trim().is_empty();
    }

    pub fn scroll_up(&mut self) {
        self.follow_tail = false;
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.follow_tail = false;
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_to_end(&mut self) {
        self.follow_tail = true;
    }

    pub fn follows_tail(&self) -> bool {
        self.follow_tail
    }

    /// Resolves the scroll offset against the rendered height of the transcript.
    pub fn effective_scroll(&mut self, total_lines: u16, visible: u16) -> u16 {
        let max_scroll = total_lines.saturating_sub(visible);
        if self.follow_tail || self.scroll >= max_scroll {
            self.scroll = max_scroll;
        }
        self.scroll
    }

    pub fn tick(&mut self) {
        if self.transcript.pending_count() > 0 {
            self.status_indicator.update_spinner();
        }
    }

    fn refresh_status(&mut self) {
        let pending = self.transcript.pending_count();
        self.status_indicator.set_thinking(pending > 0);
        match pending {
            0 => self.status_indicator.clear_status(),
            1 => self.status_indicator.set_status("Waiting for a reply..."),
            n => self
                .status_indicator
                .set_status(format!("Waiting for {} replies...", n)),
        }
    }
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new(true)
    }
}
