// src/evaluation.rs

use crate::{
    config::Config,
    constants::EVALUATION_PATH,
    errors::{ChatError, ChatResult},
};
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One row of the RAG versus plain-LLM comparison.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvaluationRow {
    #[serde(default, deserialize_with = "cell")]
    pub question: String,
    #[serde(default, deserialize_with = "cell")]
    pub rag_answer: String,
    #[serde(default, deserialize_with = "cell")]
    pub llm_answer: String,
    #[serde(default, deserialize_with = "cell")]
    pub rag_relevance: String,
    #[serde(default, deserialize_with = "cell")]
    pub llm_relevance: String,
}

/// Table cells come from a CSV with blanks filled in, so any of them may be a
/// number, a string or empty.
fn cell<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EvaluationResponse {
    Rows(Vec<EvaluationRow>),
    Error { error: String },
}

#[derive(Debug, Clone)]
pub struct EvaluationClient {
    client: Client,
    url: String,
}

impl EvaluationClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            url: config.url_for(EVALUATION_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the latest evaluation results. A server-side `{"error": ...}`
    /// payload becomes an `Api` error carrying that message.
    pub async fn fetch(&self) -> ChatResult<Vec<EvaluationRow>> {
        let response = self.client.get(&self.url).send().await.map_err(|_| {
            warn!("Evaluation results could not be fetched from {}", self.url);
            ChatError::api_error("Unable to reach the server.")
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|_| ChatError::api_error("Failed to read evaluation results."))?;

        match serde_json::from_str::<EvaluationResponse>(&body) {
            Ok(EvaluationResponse::Rows(rows)) if status.is_success() => {
                info!("Loaded {} evaluation rows", rows.len());
                Ok(rows)
            }
            Ok(EvaluationResponse::Error { error }) => Err(ChatError::api_error(error)),
            Ok(EvaluationResponse::Rows(_)) | Err(_) => Err(ChatError::api_error(format!(
                "Unexpected evaluation response (status {})",
                status.as_u16()
            ))),
        }
    }
}

/// State behind the evaluation panel.
#[derive(Debug, Default)]
pub struct EvaluationTable {
    rows: Vec<EvaluationRow>,
    selected: usize,
    loading: bool,
    loaded: bool,
    error: Option<String>,
}

impl EvaluationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a refresh as started. Returns false while one is already running.
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Applies a finished fetch. A failed refresh keeps the previous rows.
    pub fn apply(&mut self, result: ChatResult<Vec<EvaluationRow>>) {
        self.loading = false;
        self.loaded = true;
        match result {
            Ok(rows) => {
                self.rows = rows;
                self.error = None;
                self.selected = self.selected.min(self.rows.len().saturating_sub(1));
            }
            Err(ChatError::Api(message)) => self.error = Some(message),
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn rows(&self) -> &[EvaluationRow] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&EvaluationRow> {
        self.rows.get(self.selected)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> EvaluationClient {
        EvaluationClient::from_config(&Config {
            server_url: server.uri(),
            ..Config::default()
        })
    }

    fn row(question: &str) -> EvaluationRow {
        EvaluationRow {
            question: question.to_string(),
            rag_answer: String::new(),
            llm_answer: String::new(),
            rag_relevance: String::new(),
            llm_relevance: String::new(),
        }
    }

    #[tokio::test]
    async fn test_rows_are_loaded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_evaluation_results"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "question": "What do lawyers use for e-discovery?",
                    "rag_answer": "Relativity, per r/law.",
                    "llm_answer": "Various tools.",
                    "rag_relevance": 0.82,
                    "llm_relevance": ""
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = client_for(&server).fetch().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question, "What do lawyers use for e-discovery?");
        assert_eq!(rows[0].rag_relevance, "0.82");
        assert_eq!(rows[0].llm_relevance, "");
    }

    #[tokio::test]
    async fn test_missing_results_surface_the_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_evaluation_results"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "No evaluation results found. Run evaluation first."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch().await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Api(ref m) if m == "No evaluation results found. Run evaluation first."
        ));
    }

    #[tokio::test]
    async fn test_garbage_payload_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_evaluation_results"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API error: Unexpected evaluation response (status 502)"
        );
    }

    #[test]
    fn test_only_one_refresh_at_a_time() {
        let mut table = EvaluationTable::new();
        assert!(table.begin_refresh());
        assert!(!table.begin_refresh());
        table.apply(Ok(vec![row("a")]));
        assert!(!table.is_loading());
        assert!(table.begin_refresh());
    }

    #[test]
    fn test_failed_refresh_keeps_rows() {
        let mut table = EvaluationTable::new();
        table.apply(Ok(vec![row("a"), row("b")]));
        table.select_next();
        table.apply(Err(ChatError::api_error("Evaluation file is empty.")));
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.error(), Some("Evaluation file is empty."));
        assert_eq!(table.selected_row().unwrap().question, "b");
    }

    #[test]
    fn test_selection_stays_in_range() {
        let mut table = EvaluationTable::new();
        table.select_next();
        assert_eq!(table.selected(), 0);
        table.apply(Ok(vec![row("a"), row("b"), row("c")]));
        table.select_next();
        table.select_next();
        table.select_next();
        assert_eq!(table.selected(), 2);
        table.apply(Ok(vec![row("a")]));
        assert_eq!(table.selected(), 0);
        table.select_prev();
        assert_eq!(table.selected(), 0);
    }
}
