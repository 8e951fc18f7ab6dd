use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{OnChunk, TextGenerator};
use crate::error::{PulseError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Sampling settings sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// Gemini REST client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    config: GenerationConfig,
}

fn transport_error(e: reqwest::Error) -> PulseError {
    PulseError::GenAi {
        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
        message: e.to_string(),
    }
}

fn empty_response() -> PulseError {
    PulseError::GenAi {
        status: 200,
        message: "response contained no text".to_string(),
    }
}

/// Extract the text carried by one SSE line, if it is a `data:` line.
fn parse_sse_line(line: &str) -> Result<Option<String>> {
    let Some(data) = line.trim_end_matches('\r').strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let chunk: GenerateResponse = serde_json::from_str(data).map_err(|e| PulseError::GenAi {
        status: 200,
        message: format!("malformed stream event: {}", e),
    })?;
    Ok(Some(chunk.text()))
}

/// Splits a byte stream into lines. Bytes are only decoded once a line is
/// complete, so a character split across network chunks survives.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream ends.
    fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            config: GenerationConfig::default(),
        }
    }

    /// Point the client at another host (a local mock in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }

    fn body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": self.config,
        })
    }

    async fn post(&self, url: String, prompt: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.body(prompt))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PulseError::GenAi {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, chars = prompt.len(), "generating report");

        let response = self.post(self.endpoint("generateContent"), prompt).await?;
        let parsed: GenerateResponse = response.json().await.map_err(transport_error)?;

        let text = parsed.text();
        if text.is_empty() {
            return Err(empty_response());
        }
        Ok(text)
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        on_chunk: &mut OnChunk<'_>,
    ) -> Result<String> {
        tracing::debug!(model = %self.model, chars = prompt.len(), "streaming report");

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.post(url, prompt).await?;

        let mut bytes_stream = response.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut full = String::new();

        let mut emit = |line: &str, full: &mut String| -> Result<()> {
            if let Some(text) = parse_sse_line(line)? {
                if !text.is_empty() {
                    on_chunk(&text);
                    full.push_str(&text);
                }
            }
            Ok(())
        };

        while let Some(chunk) = bytes_stream.next().await {
            let chunk = chunk.map_err(transport_error)?;
            for line in lines.push(&chunk) {
                emit(&line, &mut full)?;
            }
        }
        if let Some(line) = lines.finish() {
            emit(&line, &mut full)?;
        }

        if full.is_empty() {
            return Err(empty_response());
        }
        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_reply(text: &str) -> serde_json::Value {
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
    }

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", "gemini-2.0-flash").with_base_url(&server.uri())
    }

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let value = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(value["topK"], 40);
        assert_eq!(value["maxOutputTokens"], 8192);
        assert_eq!(value["responseMimeType"], "text/plain");
    }

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), None);
        assert_eq!(parse_sse_line("").unwrap(), None);
        let line = format!("data: {}\r", text_reply("hi"));
        assert_eq!(parse_sse_line(&line).unwrap(), Some("hi".to_string()));
        assert!(parse_sse_line("data: {not json").is_err());
    }

    #[tokio::test]
    async fn test_generate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "summarize"}]}],
                "generationConfig": {"topK": 40, "responseMimeType": "text/plain"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("## Overview")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).generate("summarize").await.unwrap();
        assert_eq!(text, "## Overview");
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client(&server).generate("summarize").await.unwrap_err();
        match err {
            PulseError::GenAi { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected GenAi, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_without_text_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client(&server).generate("summarize").await.unwrap_err();
        assert!(matches!(err, PulseError::GenAi { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_generate_stream() {
        let server = MockServer::start().await;
        let body = format!(
            "data: {}\r\n\r\ndata: {}\r\n\r\ndata: {}\r\n\r\n",
            text_reply("Hello"),
            text_reply(", "),
            text_reply("world")
        );
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let mut seen = Vec::new();
        let mut on_chunk = |text: &str| seen.push(text.to_string());
        let full = client(&server)
            .generate_stream("summarize", &mut on_chunk)
            .await
            .unwrap();

        assert_eq!(full, "Hello, world");
        assert_eq!(seen, vec!["Hello", ", ", "world"]);
    }

    #[tokio::test]
    async fn test_generate_stream_without_trailing_newline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!("data: {}", text_reply("tail"))),
            )
            .mount(&server)
            .await;

        let mut on_chunk = |_: &str| {};
        let full = client(&server)
            .generate_stream("summarize", &mut on_chunk)
            .await
            .unwrap();

        assert_eq!(full, "tail");
    }

    #[test]
    fn test_line_buffer_keeps_split_characters() {
        let line = "data: café\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut lines = LineBuffer::default();
        assert!(lines.push(&line[..split]).is_empty());
        assert_eq!(lines.push(&line[split..]), vec!["data: café".to_string()]);
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_line_buffer_trailing_partial_line() {
        let mut lines = LineBuffer::default();
        assert_eq!(lines.push(b"a\nb\nc"), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(lines.finish(), Some("c".to_string()));
    }

    /// One-shot HTTP server that answers with a chunked body, flushing each
    /// part separately so the client sees them as distinct reads.
    async fn serve_chunked(parts: Vec<Vec<u8>>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\n\
                      transfer-encoding: chunked\r\nconnection: close\r\n\r\n",
                )
                .await
                .unwrap();
            for part in parts {
                socket
                    .write_all(format!("{:x}\r\n", part.len()).as_bytes())
                    .await
                    .unwrap();
                socket.write_all(&part).await.unwrap();
                socket.write_all(b"\r\n").await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            socket.write_all(b"0\r\n\r\n").await.unwrap();
            socket.flush().await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_generate_stream_multibyte_across_chunks() {
        let event = format!("data: {}\n\n", text_reply("café")).into_bytes();
        let split = event.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let base_url = serve_chunked(vec![event[..split].to_vec(), event[split..].to_vec()]).await;

        let mut seen = Vec::new();
        let mut on_chunk = |text: &str| seen.push(text.to_string());
        let full = GeminiClient::new("test-key", "gemini-2.0-flash")
            .with_base_url(&base_url)
            .generate_stream("summarize", &mut on_chunk)
            .await
            .unwrap();

        assert_eq!(full, "café");
        assert_eq!(seen, vec!["café"]);
    }
}
