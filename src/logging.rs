// src/logging.rs

use crate::errors::{ChatError, ChatResult};
use chrono::{DateTime, Utc};
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};
use log::{info, warn};
use std::path::Path;

/// One request/response exchange with the chat backend.
#[derive(Debug)]
pub struct ExchangeLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: Option<u16>,
    pub response_time_ms: u128,
}

impl ExchangeLog {
    pub fn line(&self) -> String {
        let status = match self.response_status {
            Some(code) => code.to_string(),
            None => "unreachable".to_string(),
        };
        format!(
            "[{}] {} - {} - Status: {} - Time: {}ms",
            self.timestamp.to_rfc3339(),
            self.endpoint,
            self.request_summary,
            status,
            self.response_time_ms
        )
    }
}

pub fn log_exchange(log: &ExchangeLog) {
    match log.response_status {
        Some(_) => info!("{}", log.line()),
        None => warn!("{}", log.line()),
    }
}

/// Sends all log output to a file in `dir`; the terminal belongs to the UI.
///
/// `RUST_LOG` takes precedence over `level`. Keep the handle alive for the
/// lifetime of the program.
pub fn init_logging(dir: &Path, level: &str) -> ChatResult<LoggerHandle> {
    Logger::try_with_env_or_str(level)
        .map_err(|e| ChatError::config_error(format!("Invalid log level '{}': {}", level, e)))?
        .log_to_file(FileSpec::default().directory(dir).basename("insight-chat"))
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .start()
        .map_err(|e| ChatError::config_error(format!("Failed to start logger: {}", e)))
}
