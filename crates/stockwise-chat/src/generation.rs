//! Streaming client for the external text-generation service.
//!
//! Sends one Ollama-style `/api/generate` request with `stream: true` and
//! assembles the reply from the newline-delimited JSON units that come back.
//! A call ends in one of three ways:
//!
//! - **Completed**: a unit with `done: true` arrived. Reading stops there and
//!   the connection is dropped without waiting for the server to close it.
//! - **Degraded**: the stream closed before any `done` unit. The text gathered
//!   so far is returned as a normal reply.
//! - **Failed**: non-success status or a transport fault (including
//!   timeouts). Partial text is discarded.
//!
//! Lines that fail to decode are skipped; upstream encodings are best-effort.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stockwise_core::config::GenerationConfig;
use stockwise_core::StockwiseError;

/// Persona line that opens every prompt.
pub const PERSONA_PREAMBLE: &str =
    "You are a friendly stock market tutor. Answer concisely (<=120 words).\n";

/// Cue after which the model writes its answer.
const ASSISTANT_CUE: &str = "Assistant:";

/// Markers of the model starting to invent the next user turn.
pub const STOP_SEQUENCES: [&str; 2] = ["\nUser:", "\nuser:"];

/// Maximum characters of an error body kept for diagnostics.
pub const BODY_EXCERPT_CHARS: usize = 500;

// 4 bytes per char upper bound for UTF-8.
const BODY_EXCERPT_BYTES: usize = BODY_EXCERPT_CHARS * 4;

/// Longest stream line buffered while waiting for its newline. Longer lines
/// are discarded like any other undecodable unit.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

// =============================================================================
// Request / unit types
// =============================================================================

/// Parameters of one generation call. Built per request and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
}

impl GenerationRequest {
    /// Wrap the user's message in the tutor persona and assistant cue.
    pub fn for_message(user_text: &str, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt_text: format!("{PERSONA_PREAMBLE}User: {user_text}\n{ASSISTANT_CUE}"),
            max_tokens,
            temperature,
            stop_sequences: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Serialize)]
struct GenerateOptions<'a> {
    num_predict: u32,
    temperature: f32,
    stop: &'a [String],
}

/// One decoded line of the response stream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationChunk {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}

impl GenerationChunk {
    /// Decode a single line. Returns `None` for anything that is not a JSON
    /// object of the expected shape.
    pub fn parse(line: &str) -> Option<Self> {
        serde_json::from_str(line).ok()
    }

    pub fn is_final(&self) -> bool {
        self.done.unwrap_or(false)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Coarse cause of a transport failure. The display text is safe to show to
/// end users; raw transport errors are only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    Connect,
    Timeout,
    Interrupted,
    Request,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TransportFailure::Connect => "could not connect to the generation service",
            TransportFailure::Timeout => "the generation service timed out",
            TransportFailure::Interrupted => "the generation stream was interrupted",
            TransportFailure::Request => "the generation request could not be sent",
        };
        f.write_str(msg)
    }
}

impl From<&reqwest::Error> for TransportFailure {
    fn from(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Connect
        } else if err.is_body() || err.is_decode() {
            TransportFailure::Interrupted
        } else {
            TransportFailure::Request
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        TransportFailure::from(&err)
    }
}

impl From<std::io::Error> for TransportFailure {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => TransportFailure::Timeout,
            std::io::ErrorKind::ConnectionRefused => TransportFailure::Connect,
            _ => TransportFailure::Interrupted,
        }
    }
}

/// Failure of a generation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The service answered with a non-success status.
    #[error("generation service returned status {code}")]
    UpstreamStatus { code: u16, body_excerpt: String },
    /// Connection, timeout or mid-stream failure.
    #[error("generation request failed: {0}")]
    Transport(TransportFailure),
}

impl GenerationError {
    /// Transport failures are worth retrying; status failures usually are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Transport(_))
    }
}

impl From<TransportFailure> for GenerationError {
    fn from(failure: TransportFailure) -> Self {
        GenerationError::Transport(failure)
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// How an assembled reply terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Terminated by a `done: true` unit.
    Completed,
    /// Stream closed without a `done` unit.
    Degraded,
}

/// Final text of a successful call plus how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledReply {
    text: String,
    pub completion: Completion,
}

impl AssembledReply {
    /// Reply text with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn into_text(self) -> String {
        self.text().to_string()
    }
}

/// Incremental accumulator over the raw response body.
///
/// Bytes are buffered until a newline so units split across network chunks
/// are decoded whole. A line that outgrows [`MAX_LINE_BYTES`] is dropped up
/// to its newline. Once a final unit is seen every further input is ignored.
#[derive(Debug, Default)]
pub struct ReplyAssembler {
    text: String,
    pending: Vec<u8>,
    // Inside an overlong line whose bytes are being skipped.
    skipping: bool,
    finished: bool,
    discarded: usize,
}

impl ReplyAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of non-blank lines dropped because they did not decode.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Feed a chunk of body bytes. Returns `true` once the final unit has
    /// been seen; lines after it in the same chunk are not processed.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        if self.finished {
            return true;
        }
        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if self.skipping {
                self.skipping = false;
                continue;
            }
            if self.push_line(&String::from_utf8_lossy(&line)) {
                self.pending.clear();
                return true;
            }
        }

        if self.pending.len() > MAX_LINE_BYTES {
            if !self.skipping {
                self.skipping = true;
                self.discarded += 1;
                debug!(limit = MAX_LINE_BYTES, "Discarding overlong stream line");
            }
            self.pending.clear();
        }
        false
    }

    /// Process one complete line. Returns `true` once finished.
    pub fn push_line(&mut self, line: &str) -> bool {
        if self.finished {
            return true;
        }
        let line = line.trim();
        if line.is_empty() {
            return false;
        }

        match GenerationChunk::parse(line) {
            Some(chunk) => {
                if let Some(fragment) = chunk.response.as_deref() {
                    self.text.push_str(fragment);
                }
                if chunk.is_final() {
                    self.finished = true;
                }
            }
            None => {
                self.discarded += 1;
                debug!(len = line.len(), "Discarding undecodable stream line");
            }
        }
        self.finished
    }

    /// Close the accumulator at end of stream. A trailing line without a
    /// newline is still decoded.
    pub fn finish(mut self) -> AssembledReply {
        if !self.finished && !self.skipping && !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.push_line(&String::from_utf8_lossy(&rest));
        }
        let completion = if self.finished {
            Completion::Completed
        } else {
            Completion::Degraded
        };
        AssembledReply {
            text: self.text,
            completion,
        }
    }
}

/// Drive a byte stream through a [`ReplyAssembler`].
///
/// Stops pulling from `stream` as soon as the final unit is seen. Any stream
/// error fails the whole call and drops the partial text.
pub async fn assemble_stream<S, B, E>(stream: S) -> Result<AssembledReply, GenerationError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<TransportFailure>,
{
    let mut stream = std::pin::pin!(stream);
    let mut assembler = ReplyAssembler::new();

    while let Some(item) = stream.next().await {
        let bytes = item.map_err(|e| GenerationError::Transport(e.into()))?;
        if assembler.feed(bytes.as_ref()) {
            break;
        }
    }

    if assembler.discarded() > 0 {
        debug!(discarded = assembler.discarded(), "Stream contained malformed units");
    }
    Ok(assembler.finish())
}

/// Truncate `text` to at most `max_chars` characters.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// =============================================================================
// TextGenerator
// =============================================================================

/// Anything that can turn a user message into generated reply text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, user_text: &str) -> Result<String, GenerationError>;
}

/// HTTP client for an Ollama-compatible streaming generate endpoint.
#[derive(Clone)]
pub struct StreamingGenerationClient {
    http: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl StreamingGenerationClient {
    /// Build a client with independent connect and total-request timeouts.
    pub fn new(config: &GenerationConfig) -> Result<Self, StockwiseError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .build()
            .map_err(|e| StockwiseError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            endpoint = %config.endpoint,
            model = %config.model,
            connect_timeout_secs = config.connect_timeout_secs,
            read_timeout_secs = config.read_timeout_secs,
            "Generation client ready"
        );

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.num_predict,
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The request that would be sent for `user_text`.
    pub fn build_request(&self, user_text: &str) -> GenerationRequest {
        GenerationRequest::for_message(user_text, self.max_tokens, self.temperature)
    }

    /// Run one generation call and report how it terminated.
    pub async fn generate_reply(&self, user_text: &str) -> Result<AssembledReply, GenerationError> {
        let request = self.build_request(user_text);
        let body = GenerateBody {
            model: &self.model,
            prompt: &request.prompt_text,
            stream: true,
            options: GenerateOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
                stop: &request.stop_sequences,
            },
        };

        debug!(model = %self.model, prompt_chars = request.prompt_text.len(), "Sending generation request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, endpoint = %self.endpoint, "Generation request failed");
                GenerationError::Transport(TransportFailure::from(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_excerpt = read_excerpt(response).await;
            warn!(status = status.as_u16(), "Generation service returned non-success status");
            return Err(GenerationError::UpstreamStatus {
                code: status.as_u16(),
                body_excerpt,
            });
        }

        let stream = response
            .bytes_stream()
            .inspect_err(|e| warn!(error = %e, "Generation stream failed"));
        let reply = assemble_stream(stream).await?;

        info!(
            completion = ?reply.completion,
            reply_chars = reply.text().chars().count(),
            "Generation finished"
        );
        Ok(reply)
    }
}

#[async_trait]
impl TextGenerator for StreamingGenerationClient {
    async fn generate(&self, user_text: &str) -> Result<String, GenerationError> {
        Ok(self.generate_reply(user_text).await?.into_text())
    }
}

/// Read at most a bounded prefix of an error body.
async fn read_excerpt(mut response: reqwest::Response) -> String {
    let mut buf = Vec::new();
    while buf.len() < BODY_EXCERPT_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "Could not read error body");
                break;
            }
        }
    }
    excerpt(&String::from_utf8_lossy(&buf), BODY_EXCERPT_CHARS)
}
