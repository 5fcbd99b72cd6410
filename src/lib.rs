// src/lib.rs

pub mod api;
pub mod app;
pub mod chat_message;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod evaluation;
pub mod key_handlers;
pub mod log_view;
pub mod logging;
pub mod message;
pub mod pipeline;
pub mod status_indicator;
pub mod ui;
pub mod widget;

pub use errors::{ChatError, ChatResult};
pub use app::View;
pub use message::{Message, MessageId, MessageState, Sender, Transcript};
pub use widget::{ChatWidget, Submission};
