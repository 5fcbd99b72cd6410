// src/errors.rs

use crate::message::MessageId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("No message with id {0}")]
    UnknownMessage(MessageId),

    #[error("Message {0} has already been resolved")]
    AlreadyResolved(MessageId),

    #[error("Message {0} is not a bot reply")]
    NotABotMessage(MessageId),
}

impl ChatError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        ChatError::Config(msg.into())
    }

    pub fn api_error(msg: impl Into<String>) -> Self {
        ChatError::Api(msg.into())
    }

    pub fn terminal_error(msg: impl Into<String>) -> Self {
        ChatError::Terminal(msg.into())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
