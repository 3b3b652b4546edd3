//! Incremental decoding of streamed generation responses
//!
//! The service streams NDJSON: one JSON object per line, each carrying a
//! `response` text fragment. Lines arrive split across arbitrary network
//! chunks, so raw bytes are buffered until a full line is present before
//! decoding. A line that is not valid JSON is skipped, never fatal.

use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

/// Stream of response text fragments in arrival order.
///
/// Finite: ends when the connection closes, a read fails, or a read times
/// out. Dropping it drops the underlying response body, which releases the
/// connection mid-stream.
pub type ResponseStream = Pin<Box<dyn Stream<Item = String> + Send>>;

#[derive(Debug, Deserialize)]
struct GenerateFrame {
    #[serde(default)]
    response: String,
}

/// Buffers raw bytes and yields decoded fragments as NDJSON lines complete.
#[derive(Debug, Default)]
pub(crate) struct FrameDecoder {
    pending: Vec<u8>,
}

impl FrameDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning every fragment it completed.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut fragments = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(fragment) = decode_frame(&line) {
                fragments.push(fragment);
            }
        }
        fragments
    }

    /// Decode whatever is left once the stream has closed.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        decode_frame(&rest)
    }
}

fn decode_frame(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<GenerateFrame>(trimmed) {
        Ok(frame) if !frame.response.is_empty() => Some(frame.response),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("Skipping malformed response frame: {}", e);
            None
        }
    }
}

/// Turn a streaming HTTP response into a [`ResponseStream`].
///
/// Each network read is bounded by `read_timeout`; a timeout ends the
/// sequence quietly, exactly like the connection closing.
pub(crate) fn response_stream(
    response: reqwest::Response,
    read_timeout: Duration,
) -> ResponseStream {
    let bytes = response.bytes_stream();
    let state = (bytes, FrameDecoder::new(), VecDeque::new(), false);

    Box::pin(futures::stream::unfold(
        state,
        move |(mut bytes, mut decoder, mut ready, mut done)| async move {
            loop {
                if let Some(fragment) = ready.pop_front() {
                    return Some((fragment, (bytes, decoder, ready, done)));
                }
                if done {
                    return None;
                }
                match tokio::time::timeout(read_timeout, bytes.next()).await {
                    Ok(Some(Ok(chunk))) => {
                        ready.extend(decoder.push(&chunk));
                    }
                    Ok(Some(Err(e))) => {
                        tracing::debug!("Response stream ended early: {}", e);
                        done = true;
                        ready.extend(decoder.finish());
                    }
                    Ok(None) => {
                        done = true;
                        ready.extend(decoder.finish());
                    }
                    Err(_) => {
                        tracing::debug!("Response stream read timed out after {:?}", read_timeout);
                        done = true;
                        ready.extend(decoder.finish());
                    }
                }
            }
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_complete_frames() {
        let mut decoder = FrameDecoder::new();
        let fragments =
            decoder.push(b"{\"response\":\"Hello\"}\n{\"response\":\" world\"}\n");
        assert_eq!(fragments, vec!["Hello", " world"]);
    }

    #[test]
    fn test_buffers_frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"{\"respon").is_empty());
        assert!(decoder.push(b"se\":\"par").is_empty());
        let fragments = decoder.push(b"tial\"}\n");
        assert_eq!(fragments, vec!["partial"]);
    }

    #[test]
    fn test_skips_malformed_frames() {
        let mut decoder = FrameDecoder::new();
        let fragments = decoder.push(b"not json at all\n{\"response\":\"ok\"}\n");
        assert_eq!(fragments, vec!["ok"]);
    }

    #[test]
    fn test_skips_frames_without_payload() {
        let mut decoder = FrameDecoder::new();
        let fragments = decoder.push(b"{\"response\":\"\",\"done\":true}\n{\"model\":\"m\"}\n");
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_skips_blank_lines() {
        let mut decoder = FrameDecoder::new();
        let fragments = decoder.push(b"\n\n{\"response\":\"x\"}\n\n");
        assert_eq!(fragments, vec!["x"]);
    }

    #[test]
    fn test_finish_decodes_unterminated_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"{\"response\":\"tail\"}").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("tail"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_multibyte_utf8_split_across_chunks_survives() {
        let mut decoder = FrameDecoder::new();
        let encoded = "{\"response\":\"caf\u{e9}\"}\n".as_bytes();
        let (a, b) = encoded.split_at(encoded.len() - 4);
        assert!(decoder.push(a).is_empty());
        let fragments = decoder.push(b);
        assert_eq!(fragments, vec!["caf\u{e9}"]);
    }
}
