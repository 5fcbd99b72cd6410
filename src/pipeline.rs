// src/pipeline.rs

use crate::config::Config;
use futures::StreamExt;
use log::{info, warn};
use reqwest::{header::ACCEPT, Client};
use std::fmt;

/// A data pipeline step the insights server can run and stream logs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    Collect,
    Clean,
    Sentiment,
    Index,
    Evaluate,
    /// Every step except `Evaluate`, in order.
    Full,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 6] = [
        PipelineStep::Collect,
        PipelineStep::Clean,
        PipelineStep::Sentiment,
        PipelineStep::Index,
        PipelineStep::Evaluate,
        PipelineStep::Full,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PipelineStep::Collect => "collect",
            PipelineStep::Clean => "clean",
            PipelineStep::Sentiment => "sentiment",
            PipelineStep::Index => "index",
            PipelineStep::Evaluate => "evaluate",
            PipelineStep::Full => "full",
        }
    }

    pub fn path(self) -> String {
        format!("/stream/{}", self.name())
    }

    /// Key that starts the step in the pipeline panel.
    pub fn shortcut(self) -> char {
        match self {
            PipelineStep::Collect => '1',
            PipelineStep::Clean => '2',
            PipelineStep::Sentiment => '3',
            PipelineStep::Index => '4',
            PipelineStep::Evaluate => '5',
            PipelineStep::Full => 'f',
        }
    }

    pub fn from_shortcut(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.shortcut() == c)
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress of one pipeline run, as seen by the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Started(PipelineStep),
    Line(String),
    Finished(PipelineStep),
    Failed { step: PipelineStep, reason: String },
}

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

impl SseEvent {
    /// `close` events only mark the end of a single script; a full run sends
    /// several of them on one stream.
    pub fn is_close(&self) -> bool {
        self.event.as_deref() == Some("close")
    }
}

/// Incremental `text/event-stream` decoder.
///
/// Chunks may split lines (and UTF-8 sequences) anywhere; only complete lines
/// are interpreted. An event is dispatched on a blank line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line[..]).to_string();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flushes whatever the stream ended on without a trailing blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            if let Some(event) = self.process_line(&line) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => {
                self.data.push(value.to_string());
                self.has_data = true;
            }
            "event" => self.event = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if !std::mem::take(&mut self.has_data) {
            return None;
        }
        Some(SseEvent {
            event,
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}

/// Streams the live log of a pipeline run from the insights server.
#[derive(Debug, Clone)]
pub struct PipelineClient {
    client: Client,
    config: Config,
}

impl PipelineClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    pub fn url_for(&self, step: PipelineStep) -> String {
        self.config.url_for(&step.path())
    }

    /// Runs `step` and reports every log line through `emit`.
    ///
    /// Always emits `Started` first and exactly one of `Finished` or `Failed`
    /// last. The run counts as finished when the server closes the stream.
    pub async fn stream<F>(&self, step: PipelineStep, mut emit: F)
    where
        F: FnMut(PipelineEvent) + Send,
    {
        let url = self.url_for(step);
        emit(PipelineEvent::Started(step));
        info!("Starting pipeline step {} at {}", step, url);

        let response = match self
            .client
            .get(&url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
        {
            Ok(response) => response,
            Err(_) => {
                warn!("Pipeline step {} could not reach the server", step);
                emit(PipelineEvent::Failed {
                    step,
                    reason: "Unable to reach the server.".to_string(),
                });
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Pipeline step {} rejected with {}", step, status.as_u16());
            emit(PipelineEvent::Failed {
                step,
                reason: format!("Server returned {}: {}", status.as_u16(), body.trim()),
            });
            return;
        }

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(_) => {
                    warn!("Pipeline step {} stream was interrupted", step);
                    emit(PipelineEvent::Failed {
                        step,
                        reason: "The log stream was interrupted.".to_string(),
                    });
                    return;
                }
            };
            for event in decoder.feed(&chunk) {
                if !event.is_close() {
                    emit(PipelineEvent::Line(event.data));
                }
            }
        }
        if let Some(event) = decoder.finish().filter(|e| !e.is_close()) {
            emit(PipelineEvent::Line(event.data));
        }

        info!("Pipeline step {} finished", step);
        emit(PipelineEvent::Finished(step));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server_url: String) -> PipelineClient {
        PipelineClient::from_config(&Config {
            server_url,
            ..Config::default()
        })
    }

    async fn collect(client: &PipelineClient, step: PipelineStep) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        client.stream(step, |e| events.push(e)).await;
        events
    }

    #[test]
    fn test_step_paths_and_shortcuts() {
        assert_eq!(PipelineStep::Sentiment.path(), "/stream/sentiment");
        assert_eq!(PipelineStep::Full.path(), "/stream/full");
        assert_eq!(PipelineStep::from_shortcut('1'), Some(PipelineStep::Collect));
        assert_eq!(PipelineStep::from_shortcut('5'), Some(PipelineStep::Evaluate));
        assert_eq!(PipelineStep::from_shortcut('f'), Some(PipelineStep::Full));
        assert_eq!(PipelineStep::from_shortcut('6'), None);
    }

    #[test]
    fn test_decoder_strips_one_leading_space() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data:no space\n\ndata: one space\n\ndata:  two\n\n");
        let data: Vec<_> = events.into_iter().map(|e| e.data).collect();
        assert_eq!(data, vec!["no space", "one space", " two"]);
    }

    #[test]
    fn test_decoder_handles_split_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data:Fetch").is_empty());
        assert!(decoder.feed(b"ing r/law").is_empty());
        assert!(decoder.feed(b"\r\n").is_empty());
        let events = decoder.feed(b"\r\nevent: close\ndata: done\n\n");
        assert_eq!(
            events,
            vec![
                SseEvent {
                    event: None,
                    data: "Fetching r/law".to_string()
                },
                SseEvent {
                    event: Some("close".to_string()),
                    data: "done".to_string()
                },
            ]
        );
        assert!(events[1].is_close());
    }

    #[test]
    fn test_decoder_keeps_utf8_split_across_chunks() {
        let text = "data:é\n\n".as_bytes();
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&text[..6]).is_empty());
        let events = decoder.feed(&text[6..]);
        assert_eq!(events[0].data, "é");
    }

    #[test]
    fn test_decoder_joins_multiline_data_and_skips_comments() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b": keepalive\ndata:a\ndata:b\nid: 4\n\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn test_decoder_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: last words").is_empty());
        assert_eq!(decoder.finish().unwrap().data, "last words");
        assert!(decoder.finish().is_none());
    }

    #[tokio::test]
    async fn test_step_streams_lines_until_the_server_closes() {
        let server = MockServer::start().await;
        let body = "data:Collecting posts\n\ndata:Saved 120 rows\n\ndata: Step finished.\n\nevent: close\ndata: done\n\n";
        Mock::given(method("GET"))
            .and(path("/stream/collect"))
            .and(header("accept", "text/event-stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&server)
            .await;

        let events = collect(&client_for(server.uri()), PipelineStep::Collect).await;
        assert_eq!(
            events,
            vec![
                PipelineEvent::Started(PipelineStep::Collect),
                PipelineEvent::Line("Collecting posts".to_string()),
                PipelineEvent::Line("Saved 120 rows".to_string()),
                PipelineEvent::Line("Step finished.".to_string()),
                PipelineEvent::Finished(PipelineStep::Collect),
            ]
        );
    }

    #[tokio::test]
    async fn test_full_run_survives_intermediate_close_events() {
        let server = MockServer::start().await;
        let body = concat!(
            "data:===== Starting COLLECT =====\n\n",
            "data: Step finished.\n\nevent: close\ndata: done\n\n",
            "data:===== Finished COLLECT =====\n\n",
            "data:===== Starting CLEAN =====\n\n",
            "data: Step finished.\n\nevent: close\ndata: done\n\n",
            "data:===== Finished CLEAN =====\n\n",
            "data: Full pipeline completed successfully!\n\n",
        );
        Mock::given(method("GET"))
            .and(path("/stream/full"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let events = collect(&client_for(server.uri()), PipelineStep::Full).await;
        assert_eq!(events.len(), 9);
        assert_eq!(
            events[events.len() - 2],
            PipelineEvent::Line("Full pipeline completed successfully!".to_string())
        );
        assert_eq!(events.last(), Some(&PipelineEvent::Finished(PipelineStep::Full)));
    }

    #[tokio::test]
    async fn test_rejected_step_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream/evaluate"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid step"))
            .mount(&server)
            .await;

        let events = collect(&client_for(server.uri()), PipelineStep::Evaluate).await;
        assert_eq!(
            events,
            vec![
                PipelineEvent::Started(PipelineStep::Evaluate),
                PipelineEvent::Failed {
                    step: PipelineStep::Evaluate,
                    reason: "Server returned 400: Invalid step".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_the_run() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = client_for(format!("http://127.0.0.1:{}", port));

        let events = collect(&client, PipelineStep::Clean).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            PipelineEvent::Failed {
                step: PipelineStep::Clean,
                ..
            }
        ));
    }
}
