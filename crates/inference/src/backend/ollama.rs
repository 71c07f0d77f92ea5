//! Ollama backend implementation
//!
//! Talks to a running Ollama daemon over its native REST API. Generation
//! responses arrive as newline-delimited JSON, one object per token batch;
//! network chunks do not respect line boundaries, so lines are reassembled
//! before decoding.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{future, stream, StreamExt};

use super::{
    BackendCapabilities, BackendError, EmbeddingResult, GenerateChunk, GenerateStream,
    InferenceBackend,
};
use crate::config::GatewayConfig;
use crate::constants::{defaults, endpoints};
use crate::types::{EmbedResponse, GenerateLine, GenerateRequest, ListModelsResponse, ModelInfo};

/// Ollama backend using the Ollama daemon
pub struct OllamaBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// Base URL of the Ollama server, without trailing slash
    base_url: String,
    /// Deadline for non-streaming calls
    request_timeout: Option<Duration>,
}

impl OllamaBackend {
    /// Backend for the default local daemon
    pub fn new() -> Self {
        Self::with_base_url(defaults::OLLAMA_URL)
    }

    /// Backend for a daemon at a custom URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Some(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS)),
        }
    }

    /// Backend as described by `config`.
    ///
    /// The client only carries a connect timeout. A client-wide timeout
    /// would also cover reading the body and abort long generations midway.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| BackendError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// Get static capabilities
    pub fn static_capabilities() -> BackendCapabilities {
        BackendCapabilities {
            embeddings: true,
            streaming: true,
            json_mode: true,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Apply the non-streaming deadline to a request
    fn bounded(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.request_timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Turn the raw byte stream into generation chunks
    fn parse_ndjson_stream(response: reqwest::Response) -> GenerateStream {
        let stream = response
            .bytes_stream()
            .map(Some)
            .chain(stream::once(future::ready(None)))
            .scan(LineBuffer::default(), |buffer, item| {
                let chunks: Vec<Result<GenerateChunk, BackendError>> = match item {
                    Some(Ok(bytes)) => buffer
                        .push(&bytes)
                        .iter()
                        .filter_map(|line| decode_line(line))
                        .collect(),
                    Some(Err(e)) => vec![Err(BackendError::Http(e))],
                    // End of body: flush a final line without trailing newline
                    None => buffer
                        .finish()
                        .and_then(|line| decode_line(&line))
                        .into_iter()
                        .collect(),
                };
                future::ready(Some(stream::iter(chunks)))
            })
            .flatten();

        Box::pin(stream)
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        format!("API error {}: {}", status, body)
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    fn capabilities(&self) -> BackendCapabilities {
        Self::static_capabilities()
    }

    fn base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }

    async fn health_check(&self) -> bool {
        let request = self
            .http_client
            .get(self.url(endpoints::TAGS))
            .timeout(Duration::from_secs(defaults::HEALTH_CHECK_TIMEOUT_SECS));
        match request.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                log::debug!("Ollama health check failed: {}", e);
                false
            }
        }
    }

    async fn generate_stream(
        &self,
        mut request: GenerateRequest,
    ) -> Result<GenerateStream, BackendError> {
        request.stream = true;
        let url = self.url(endpoints::GENERATE);

        log::debug!(
            "Sending generate request to {} with model '{}' ({} prompt chars)",
            url,
            request.model,
            request.prompt.len()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                BackendError::NotReady(format!(
                    "Failed to connect to Ollama at {}: {}. Is Ollama running?",
                    self.base_url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(BackendError::Inference(Self::error_body(response).await));
        }

        Ok(Self::parse_ndjson_stream(response))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        let response = self
            .bounded(self.http_client.get(self.url(endpoints::TAGS)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Inference(Self::error_body(response).await));
        }

        let tags: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse model list: {}", e)))?;

        log::info!(
            "Available models: {:?}",
            tags.models.iter().map(|m| m.name.as_str()).collect::<Vec<_>>()
        );
        Ok(tags.models)
    }

    async fn embeddings(
        &self,
        texts: Vec<String>,
        model: &str,
    ) -> Result<Vec<EmbeddingResult>, BackendError> {
        let expected = texts.len();
        let request = serde_json::json!({
            "model": model,
            "input": texts,
        });

        let response = self
            .bounded(self.http_client.post(self.url(endpoints::EMBED)))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Inference(Self::error_body(response).await));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse embeddings: {}", e)))?;

        if body.embeddings.len() != expected {
            return Err(BackendError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                expected,
                body.embeddings.len()
            )));
        }

        let token_count = body.prompt_eval_count.unwrap_or(0);
        Ok(body
            .embeddings
            .into_iter()
            .map(|vector| EmbeddingResult {
                vector,
                token_count,
            })
            .collect())
    }
}

/// Reassembles newline-delimited records from arbitrary byte chunks
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append bytes and return every line completed by them
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Whatever is left after the body ended
    pub(crate) fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Decode one stream line. Blank and undecodable lines are skipped.
pub(crate) fn decode_line(line: &str) -> Option<Result<GenerateChunk, BackendError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<GenerateLine>(line) {
        Ok(GenerateLine {
            error: Some(error), ..
        }) => Some(Err(BackendError::Inference(error))),
        Ok(parsed) => Some(Ok(GenerateChunk {
            content: (!parsed.response.is_empty()).then_some(parsed.response),
            done: parsed.done,
        })),
        Err(e) => {
            log::error!("Error parsing stream line: {} ({})", e, line);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Read one HTTP request, body included
    async fn read_request(socket: &mut TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    /// Answer a single request with a chunked NDJSON body. Waits `delay`
    /// before the headers and `delay` again before every line.
    async fn serve_once(lines: Vec<String>, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;

            tokio::time::sleep(delay).await;
            let head = b"HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nTransfer-Encoding: chunked\r\n\r\n";
            // The client may already have given up
            if socket.write_all(head).await.is_err() {
                return;
            }

            for line in lines {
                tokio::time::sleep(delay).await;
                let data = format!("{}\n", line);
                let chunk = format!("{:x}\r\n{}\r\n", data.len(), data);
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
            let _ = socket.flush().await;
        });

        format!("http://{}", addr)
    }

    fn backend_with_timeout(base_url: String, secs: u64) -> OllamaBackend {
        let config = GatewayConfig {
            base_url,
            request_timeout_secs: Some(secs),
            ..Default::default()
        };
        OllamaBackend::from_config(&config).unwrap()
    }

    #[test]
    fn test_backend_name() {
        let backend = OllamaBackend::new();
        assert_eq!(backend.name(), "Ollama");
    }

    #[test]
    fn test_capabilities() {
        let caps = OllamaBackend::static_capabilities();
        assert!(caps.embeddings);
        assert!(caps.streaming);
        assert!(caps.json_mode);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = OllamaBackend::with_base_url("http://custom:8080/");
        assert_eq!(backend.base_url(), Some("http://custom:8080".to_string()));
        assert_eq!(backend.url(endpoints::TAGS), "http://custom:8080/api/tags");
    }

    #[test]
    fn test_from_config() {
        let config = GatewayConfig {
            base_url: "http://gpu-box:11434".to_string(),
            ..Default::default()
        };
        let backend = OllamaBackend::from_config(&config).unwrap();
        assert_eq!(backend.base_url(), Some("http://gpu-box:11434".to_string()));
    }

    #[test]
    fn test_line_buffer_split_across_chunks() {
        let mut buffer = LineBuffer::default();
        assert!(buffer.push(b"{\"response\":\"Hel").is_empty());
        let lines = buffer.push(b"lo\"}\n{\"response\":\" there\"}\n{\"done\"");
        assert_eq!(
            lines,
            vec![
                "{\"response\":\"Hello\"}".to_string(),
                "{\"response\":\" there\"}".to_string()
            ]
        );
        assert_eq!(buffer.push(b":true}"), Vec::<String>::new());
        assert_eq!(buffer.finish(), Some("{\"done\":true}".to_string()));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_keeps_multibyte_chars_intact() {
        let mut buffer = LineBuffer::default();
        let text = "{\"response\":\"é\"}\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = text.iter().position(|b| *b == 0xC3).unwrap() + 1;
        assert!(buffer.push(&text[..split]).is_empty());
        assert_eq!(buffer.push(&text[split..]), vec!["{\"response\":\"é\"}".to_string()]);
    }

    #[test]
    fn test_decode_line() {
        let chunk = decode_line("{\"response\":\"[{\",\"done\":false}").unwrap().unwrap();
        assert_eq!(
            chunk,
            GenerateChunk {
                content: Some("[{".to_string()),
                done: false
            }
        );

        let chunk = decode_line("{\"response\":\"\",\"done\":true}").unwrap().unwrap();
        assert_eq!(chunk.content, None);
        assert!(chunk.done);

        assert!(decode_line("   ").is_none());
        assert!(decode_line("not json").is_none());
        assert!(matches!(
            decode_line("{\"error\":\"model not found\"}"),
            Some(Err(BackendError::Inference(msg))) if msg == "model not found"
        ));
    }

    #[tokio::test]
    async fn test_slow_generation_outlives_request_timeout() {
        let mut lines: Vec<String> = (0..4)
            .map(|i| format!("{{\"response\":\"t{}\",\"done\":false}}", i))
            .collect();
        lines.push("{\"response\":\"\",\"done\":true}".to_string());
        let base_url = serve_once(lines, Duration::from_millis(700)).await;
        let backend = backend_with_timeout(base_url, 1);

        let stream = backend
            .generate_stream(GenerateRequest::new("llama3.2", "count"))
            .await
            .unwrap();
        let chunks: Vec<_> = stream.collect().await;

        let mut text = String::new();
        for chunk in chunks {
            if let Some(content) = chunk.unwrap().content {
                text.push_str(&content);
            }
        }
        assert_eq!(text, "t0t1t2t3");
    }

    #[tokio::test]
    async fn test_model_list_honours_request_timeout() {
        let base_url = serve_once(vec![], Duration::from_millis(1500)).await;
        let backend = backend_with_timeout(base_url, 1);

        let error = backend.list_models().await.unwrap_err();
        assert!(matches!(error, BackendError::Http(ref e) if e.is_timeout()));
    }
}
