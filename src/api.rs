use crate::{
    config::Config,
    constants::MESSAGE_FIELD,
    errors::{ChatError, ChatResult},
    logging::{log_exchange, ExchangeLog},
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Instant;

/// Anything that can turn one user message into one reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, text: &str) -> ChatResult<String>;
}

/// Posts each message as a form-encoded `msg` field and returns the body as text.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.chat_url())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, text: &str) -> ChatResult<String> {
        let started = Instant::now();

        let result = async {
            let response = self
                .client
                .post(&self.url)
                .form(&[(MESSAGE_FIELD, text)])
                .send()
                .await
                .map_err(|e| ChatError::api_error(format!("Request failed: {}", e)))?;

            // The body is shown whatever the status, as long as it can be read.
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| ChatError::api_error(format!("Failed to read response: {}", e)))?;
            Ok::<_, ChatError>((status, body))
        }
        .await;

        log_exchange(&ExchangeLog {
            timestamp: Utc::now(),
            endpoint: self.url.clone(),
            request_summary: summarize(text),
            response_status: result.as_ref().ok().map(|(status, _)| *status),
            response_time_ms: started.elapsed().as_millis(),
        });

        result.map(|(_, body)| body)
    }
}

fn summarize(text: &str) -> String {
    const LIMIT: usize = 40;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{}…", head)
    }
}
