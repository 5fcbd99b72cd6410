// src/dispatcher.rs

use crate::api::ChatBackend;
use crate::config::Config;
use crate::errors::ChatResult;
use crate::evaluation::{EvaluationClient, EvaluationRow};
use crate::message::{MessageId, ReplyOutcome};
use crate::pipeline::{PipelineClient, PipelineEvent, PipelineStep};
use crate::widget::Submission;
use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A finished exchange, tagged with the bubble it belongs to.
#[derive(Debug)]
pub struct Reply {
    pub reply_to: MessageId,
    pub outcome: ReplyOutcome,
}

/// Runs each submission as its own task. Nothing is queued or de-duplicated.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
    replies: mpsc::UnboundedSender<Reply>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>) -> (Self, mpsc::UnboundedReceiver<Reply>) {
        let (replies, receiver) = mpsc::unbounded_channel();
        (Self { backend, replies }, receiver)
    }

    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, submission: Submission) {
        let backend = Arc::clone(&self.backend);
        let replies = self.replies.clone();

        tokio::spawn(async move {
            let outcome = backend.send(&submission.text).await;
            debug!("Reply {} ready (ok: {})", submission.reply_to, outcome.is_ok());
            // The receiver is gone once the UI has quit; the reply is abandoned.
            let _ = replies.send(Reply {
                reply_to: submission.reply_to,
                outcome,
            });
        });
    }
}

/// Results from the pipeline and evaluation panels' background tasks.
#[derive(Debug)]
pub enum PanelUpdate {
    Pipeline(PipelineEvent),
    Evaluation(ChatResult<Vec<EvaluationRow>>),
}

/// Spawns the pipeline and evaluation requests the panels ask for.
#[derive(Clone)]
pub struct PanelRunner {
    pipeline: PipelineClient,
    evaluation: EvaluationClient,
    updates: mpsc::UnboundedSender<PanelUpdate>,
}

impl PanelRunner {
    pub fn new(config: &Config) -> (Self, mpsc::UnboundedReceiver<PanelUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let runner = Self {
            pipeline: PipelineClient::from_config(config),
            evaluation: EvaluationClient::from_config(config),
            updates,
        };
        (runner, receiver)
    }

    /// Must be called from within a tokio runtime.
    pub fn run_step(&self, step: PipelineStep) {
        let pipeline = self.pipeline.clone();
        let updates = self.updates.clone();

        tokio::spawn(async move {
            pipeline
                .stream(step, |event| {
                    let _ = updates.send(PanelUpdate::Pipeline(event));
                })
                .await;
        });
    }

    /// Must be called from within a tokio runtime.
    pub fn refresh_evaluation(&self) {
        let evaluation = self.evaluation.clone();
        let updates = self.updates.clone();

        tokio::spawn(async move {
            let result = evaluation.fetch().await;
            let _ = updates.send(PanelUpdate::Evaluation(result));
        });
    }
}
