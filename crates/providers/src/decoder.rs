//! Stream decoder — uniform wire chunks in, token events out.
//!
//! Every backend's stream is reduced upstream to lines of `data: <json>`
//! with a `data: [DONE]` terminator. The decoder reassembles lines from
//! arbitrarily split chunks and turns them into [`TokenEvent`]s. It is a
//! plain synchronous push parser so it can be tested without a transport.

use serde::Deserialize;
use tracing::trace;

use fablecraft_core::TokenEvent;

/// Prefix of a payload-bearing wire line.
const DATA_PREFIX: &str = "data: ";

/// Payload that terminates a stream.
const DONE_MARKER: &str = "[DONE]";

/// Incremental decoder for the uniform streaming wire format.
///
/// Feed it raw text chunks as they arrive; chunk boundaries carry no meaning
/// (a logical line may be split across two chunks, and one chunk may hold
/// many lines). Once a terminal event has been emitted the decoder ignores
/// all further input.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: String,
    finished: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been emitted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one raw chunk and collect the events it completed.
    pub fn feed(&mut self, chunk: &str) -> Vec<TokenEvent> {
        if self.finished {
            return Vec::new();
        }

        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        while let Some(line_end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=line_end).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            // Skip blank lines and SSE comments
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            let payload = payload.trim();

            if payload == DONE_MARKER {
                self.finished = true;
                events.push(TokenEvent::Complete);
                break;
            }

            match serde_json::from_str::<StreamPayload>(payload) {
                Ok(parsed) => {
                    if let Some(text) = parsed.into_delta_text() {
                        if !text.is_empty() {
                            events.push(TokenEvent::Token { text });
                        }
                    }
                }
                Err(e) => {
                    // One bad line never fails the stream.
                    trace!(payload = %payload, error = %e, "Ignoring unparseable stream line");
                }
            }
        }

        events
    }

    /// Signal end of input.
    ///
    /// A stream that ends without a terminator still completes normally;
    /// cancellation takes this same path.
    pub fn finish(&mut self) -> Option<TokenEvent> {
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(TokenEvent::Complete)
    }
}

// --- Wire payload types (internal) ---

#[derive(Debug, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

impl StreamPayload {
    fn into_delta_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.delta.content)
    }
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_line_decodes_to_token_event() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.feed("data: {\"choices\":[{\"delta\":{\"content\":\"Once\"}}]}\n\n");
        assert_eq!(events, vec![TokenEvent::token("Once")]);
    }

    #[test]
    fn line_split_across_chunks_emits_after_second_chunk() {
        let mut decoder = StreamDecoder::new();

        let first = decoder.feed("data: {\"choices\":[{\"delta\":{\"con");
        assert!(first.is_empty());

        let second = decoder.feed("tent\":\"hi\"}}]}\n\n");
        assert_eq!(second, vec![TokenEvent::token("hi")]);
    }

    #[test]
    fn many_lines_in_one_chunk_decode_in_order() {
        let mut decoder = StreamDecoder::new();
        let chunk = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n";
        let events = decoder.feed(chunk);
        assert_eq!(events, vec![TokenEvent::token("a"), TokenEvent::token("b")]);
    }

    #[test]
    fn done_marker_completes_and_latches() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.feed("data: [DONE]\n\n");
        assert_eq!(events, vec![TokenEvent::Complete]);
        assert!(decoder.is_finished());

        // Further input is ignored entirely.
        let after = decoder.feed("data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n");
        assert!(after.is_empty());
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn content_after_done_in_same_chunk_is_ignored() {
        let mut decoder = StreamDecoder::new();
        let chunk = "data: [DONE]\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n";
        let events = decoder.feed(chunk);
        assert_eq!(events, vec![TokenEvent::Complete]);
    }

    #[test]
    fn end_of_stream_without_terminator_completes() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.feed("data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}\n");
        assert_eq!(events, vec![TokenEvent::token("tail")]);

        assert_eq!(decoder.finish(), Some(TokenEvent::Complete));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn malformed_line_is_skipped_and_stream_continues() {
        let mut decoder = StreamDecoder::new();
        let chunk = "data: this is not json\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n";
        let events = decoder.feed(chunk);
        assert_eq!(events, vec![TokenEvent::token("ok")]);
        assert!(!decoder.is_finished());
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut decoder = StreamDecoder::new();
        let chunk = ": keep-alive\n\
                     event: ping\n\
                     \n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n";
        let events = decoder.feed(chunk);
        assert_eq!(events, vec![TokenEvent::token("x")]);
    }

    #[test]
    fn empty_and_absent_deltas_emit_nothing() {
        let mut decoder = StreamDecoder::new();
        let chunk = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n\
                     data: {\"choices\":[]}\n";
        let events = decoder.feed(chunk);
        assert!(events.is_empty());
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.feed("data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\r\n");
        assert_eq!(events, vec![TokenEvent::token("hi")]);
    }
}
