use reqwest::Client;
use serde::{Deserialize, Serialize};
use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::Message;

/// Events delivered from an in-flight agent stream to the UI event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The endpoint answered with a success status; bytes will follow.
    Opened,
    /// An incremental piece of assistant text.
    Delta(String),
    /// The stream finished normally.
    Done,
    /// Transport or protocol failure. The partial response stays as-is.
    Failed(String),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
}

/// One typed chunk off the wire. Only `text-delta` and `step-finish` are
/// recognized; everything else is skipped.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat/weatherAgent", self.base_url)
    }

    /// Post the full message history and forward stream events until the
    /// response ends. Runs as a spawned task; all outcomes are reported
    /// through `tx`, never returned.
    pub async fn stream_chat(&self, messages: Vec<Message>, tx: UnboundedSender<StreamEvent>) {
        let request = ChatRequest {
            messages: &messages,
        };

        let response = match self.client.post(self.chat_url()).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                let _ = tx.send(StreamEvent::Failed(e.to_string()));
                return;
            }
        };

        if !response.status().is_success() {
            let _ = tx.send(StreamEvent::Failed(format!(
                "agent request failed with status {}",
                response.status()
            )));
            return;
        }

        let _ = tx.send(StreamEvent::Opened);

        let mut stream = response.bytes_stream();
        let mut decoder = ChunkDecoder::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(bytes) => {
                    for event in decoder.push(&bytes) {
                        let finished = matches!(event, StreamEvent::Done);
                        if tx.send(event).is_err() {
                            return;
                        }
                        if finished {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(StreamEvent::Failed(e.to_string()));
                    return;
                }
            }
        }

        // Stream ended without a terminal chunk; treat it as completion.
        let _ = tx.send(StreamEvent::Done);
    }
}

/// Reassembles newline-delimited chunks across network reads and turns the
/// recognized ones into events.
struct ChunkDecoder {
    buf: Vec<u8>,
    saw_delta: bool,
}

impl ChunkDecoder {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            saw_delta: false,
        }
    }

    fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.buf.extend_from_slice(bytes);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let Ok(line) = std::str::from_utf8(&line) else {
                continue;
            };
            self.decode_line(line.trim(), &mut events);
            if events.last() == Some(&StreamEvent::Done) {
                break;
            }
        }

        events
    }

    fn decode_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        // Chunks may arrive bare or framed as SSE data lines.
        let payload = line.strip_prefix("data:").map(str::trim_start).unwrap_or(line);
        if payload.is_empty() || payload == "[DONE]" {
            return;
        }

        let Ok(chunk) = serde_json::from_str::<StreamChunk>(payload) else {
            return;
        };
        match chunk.kind.as_str() {
            "text-delta" => {
                if let Some(delta) = chunk.delta {
                    self.saw_delta = true;
                    events.push(StreamEvent::Delta(delta));
                }
            }
            "step-finish" => {
                // A terminal chunk may carry the whole output when nothing
                // was streamed incrementally.
                if !self.saw_delta {
                    if let Some(text) = chunk.text.filter(|t| !t.is_empty()) {
                        self.saw_delta = true;
                        events.push(StreamEvent::Delta(text));
                    }
                }
                events.push(StreamEvent::Done);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(decoder: &mut ChunkDecoder, input: &str) -> Vec<StreamEvent> {
        decoder.push(input.as_bytes())
    }

    #[test]
    fn text_deltas_accumulate_in_order() {
        let mut decoder = ChunkDecoder::new();
        let events = drain(
            &mut decoder,
            "{\"type\":\"text-delta\",\"delta\":\"今天\"}\n{\"type\":\"text-delta\",\"delta\":\"晴\"}\n",
        );
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("今天".to_string()),
                StreamEvent::Delta("晴".to_string()),
            ]
        );
    }

    #[test]
    fn step_finish_terminates_the_stream() {
        let mut decoder = ChunkDecoder::new();
        let events = drain(
            &mut decoder,
            "{\"type\":\"text-delta\",\"delta\":\"hi\"}\n{\"type\":\"step-finish\"}\n",
        );
        assert_eq!(
            events,
            vec![StreamEvent::Delta("hi".to_string()), StreamEvent::Done]
        );
    }

    #[test]
    fn step_finish_text_is_used_only_when_nothing_streamed() {
        let mut decoder = ChunkDecoder::new();
        let events = drain(&mut decoder, "{\"type\":\"step-finish\",\"text\":\"多云转晴\"}\n");
        assert_eq!(
            events,
            vec![StreamEvent::Delta("多云转晴".to_string()), StreamEvent::Done]
        );

        let mut decoder = ChunkDecoder::new();
        let events = drain(
            &mut decoder,
            "{\"type\":\"text-delta\",\"delta\":\"多云\"}\n{\"type\":\"step-finish\",\"text\":\"多云转晴\"}\n",
        );
        assert_eq!(
            events,
            vec![StreamEvent::Delta("多云".to_string()), StreamEvent::Done]
        );
    }

    #[test]
    fn unknown_chunk_types_and_malformed_lines_are_skipped() {
        let mut decoder = ChunkDecoder::new();
        let events = drain(
            &mut decoder,
            "{\"type\":\"tool-call\",\"name\":\"getWeather\"}\nnot json at all\n{\"type\":\"text-delta\",\"delta\":\"ok\"}\n",
        );
        assert_eq!(events, vec![StreamEvent::Delta("ok".to_string())]);
    }

    #[test]
    fn chunks_split_across_reads_reassemble_at_newlines() {
        let mut decoder = ChunkDecoder::new();
        let first = drain(&mut decoder, "{\"type\":\"text-de");
        assert!(first.is_empty());
        let second = drain(&mut decoder, "lta\",\"delta\":\"rain\"}\n");
        assert_eq!(second, vec![StreamEvent::Delta("rain".to_string())]);
    }

    #[test]
    fn sse_framed_lines_are_unwrapped() {
        let mut decoder = ChunkDecoder::new();
        let events = drain(
            &mut decoder,
            "data: {\"type\":\"text-delta\",\"delta\":\"sun\"}\n\ndata: [DONE]\n",
        );
        assert_eq!(events, vec![StreamEvent::Delta("sun".to_string())]);
    }

    #[test]
    fn chat_url_joins_base_without_double_slash() {
        let client = AgentClient::new("http://localhost:4111/");
        assert_eq!(client.chat_url(), "http://localhost:4111/api/chat/weatherAgent");
    }
}
