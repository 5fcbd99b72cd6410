// src/log_view.rs

use crate::constants::MAX_LOG_ENTRIES;
use crate::pipeline::{PipelineEvent, PipelineStep};

/// Live log of the current (or last) pipeline run.
#[derive(Debug, Default)]
pub struct LogView {
    entries: Vec<String>,
    running: Option<PipelineStep>,
    outcome: Option<String>,
    scroll_offset: u16,
    follow_tail: bool,
}

impl LogView {
    pub fn new() -> Self {
        Self {
            follow_tail: true,
            ..Self::default()
        }
    }

    /// Claims the panel for `step`. Only one run streams at a time.
    pub fn begin(&mut self, step: PipelineStep) -> bool {
        if self.running.is_some() {
            return false;
        }
        self.entries.clear();
        self.outcome = None;
        self.running = Some(step);
        self.scroll_to_end();
        true
    }

    pub fn apply(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Started(step) => self.running = Some(step),
            PipelineEvent::Line(data) => {
                for line in data.split('\n') {
                    self.add(line.to_string());
                }
            }
            PipelineEvent::Finished(step) => {
                self.running = None;
                self.outcome = Some(format!("{} finished", step));
            }
            PipelineEvent::Failed { step, reason } => {
                self.running = None;
                self.outcome = Some(format!("{} failed: {}", step, reason));
            }
        }
    }

    pub fn add(&mut self, entry: String) {
        self.entries.push(entry);
        if self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.remove(0);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn running(&self) -> Option<PipelineStep> {
        self.running
    }

    pub fn outcome(&self) -> Option<&str> {
        self.outcome.as_deref()
    }

    pub fn scroll_up(&mut self) {
        self.follow_tail = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.follow_tail = false;
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_to_end(&mut self) {
        self.follow_tail = true;
    }

    pub fn effective_scroll(&mut self, visible: u16) -> u16 {
        let total = u16::try_from(self.entries.len()).unwrap_or(u16::MAX);
        let max_scroll = total.saturating_sub(visible);
        if self.follow_tail || self.scroll_offset >= max_scroll {
            self.scroll_offset = max_scroll;
        }
        self.scroll_offset
    }
}
