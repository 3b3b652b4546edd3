//! Line-by-line stream draining with chunked delivery

use super::buffer::ChunkBuffer;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Receiver for chunks flushed while a stream is being drained.
///
/// `on_chunk` fires for every flushed chunk in arrival order; `on_complete`
/// fires exactly once with the full accumulated text after the stream ends.
/// Errors from a sink are logged and never interrupt the drain.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Handle one flushed chunk.
    async fn on_chunk(&self, chunk: &str) -> Result<()>;

    /// Handle end of stream with the complete drained text.
    async fn on_complete(&self, full_text: &str) -> Result<()>;
}

/// Sink that forwards chunks into a bounded channel.
///
/// Sending awaits when the channel is full, so a slow consumer applies
/// backpressure to the drain instead of growing an unbounded queue.
pub struct ChannelSink {
    sender: mpsc::Sender<String>,
}

impl ChannelSink {
    /// Create a sink that sends each chunk through `sender`.
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ChunkSink for ChannelSink {
    async fn on_chunk(&self, chunk: &str) -> Result<()> {
        self.sender
            .send(chunk.to_string())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send chunk: {}", e))
    }

    async fn on_complete(&self, _full_text: &str) -> Result<()> {
        Ok(())
    }
}

/// Sink that records everything it receives, for assertions and plumbing.
#[derive(Default)]
pub struct CollectSink {
    chunks: Mutex<Vec<String>>,
    completed: Mutex<Option<String>>,
}

impl CollectSink {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// All chunks received so far, in arrival order.
    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().unwrap().clone()
    }

    /// The full text passed to `on_complete`, if the stream has ended.
    pub fn completed(&self) -> Option<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChunkSink for CollectSink {
    async fn on_chunk(&self, chunk: &str) -> Result<()> {
        self.chunks.lock().unwrap().push(chunk.to_string());
        Ok(())
    }

    async fn on_complete(&self, full_text: &str) -> Result<()> {
        *self.completed.lock().unwrap() = Some(full_text.to_string());
        Ok(())
    }
}

/// Sink that discards everything, for callers with no interest in chunks.
pub struct NullSink;

#[async_trait]
impl ChunkSink for NullSink {
    async fn on_chunk(&self, _chunk: &str) -> Result<()> {
        Ok(())
    }

    async fn on_complete(&self, _full_text: &str) -> Result<()> {
        Ok(())
    }
}

/// Reads a byte stream line by line, delivering chunks to a sink while
/// accumulating the complete text.
///
/// Lines are split on `\n` and decoded lossily, so invalid UTF-8 becomes
/// replacement characters instead of an error. A read error ends the drain
/// early; everything read up to that point is preserved and the buffered
/// remainder is still delivered.
pub struct StreamDrain {
    buffer: ChunkBuffer,
    sink: Arc<dyn ChunkSink>,
}

impl StreamDrain {
    /// Create a drain that flushes chunks of at least `min_chunk_size` bytes.
    pub fn new(min_chunk_size: usize, sink: Arc<dyn ChunkSink>) -> Self {
        Self {
            buffer: ChunkBuffer::new(min_chunk_size),
            sink,
        }
    }

    /// Drain `reader` to exhaustion, returning the complete text exactly once.
    pub async fn drain<R: AsyncRead + Unpin>(self, reader: R) -> String {
        let mut reader = BufReader::new(reader);
        let mut segment = Vec::new();
        let mut total = String::new();

        loop {
            segment.clear();
            match reader.read_until(b'\n', &mut segment).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&segment);
                    total.push_str(&text);
                    if let Some(chunk) = self.buffer.append_and_flush(&text) {
                        self.deliver(&chunk).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("Stream read failed, treating as end of stream: {}", e);
                    break;
                }
            }
        }

        if let Some(remainder) = self.buffer.take_remainder() {
            self.deliver(&remainder).await;
        }

        if let Err(e) = self.sink.on_complete(&total).await {
            tracing::warn!("Chunk sink failed on completion: {}", e);
        }

        total
    }

    async fn deliver(&self, chunk: &str) {
        if let Err(e) = self.sink.on_chunk(chunk).await {
            tracing::warn!("Chunk sink failed to handle chunk: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_drain_returns_complete_text() {
        let sink = Arc::new(CollectSink::new());
        let drain = StreamDrain::new(50, sink.clone());
        let text = drain.drain(&b"error: something broke\n"[..]).await;
        assert_eq!(text, "error: something broke\n");
        assert_eq!(sink.completed().as_deref(), Some("error: something broke\n"));
    }

    #[tokio::test]
    async fn test_chunks_concatenate_to_input() {
        let line = "x".repeat(19) + "\n";
        let input = format!("{}{}{}tail\n", line, line, line);

        let sink = Arc::new(CollectSink::new());
        let drain = StreamDrain::new(50, sink.clone());
        let text = drain.drain(input.as_bytes()).await;

        let chunks = sink.chunks();
        // Three 20-byte lines cross the 50-byte threshold on the third
        // append; the short tail arrives as the end-of-stream remainder.
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 60);
        assert_eq!(chunks[1], "tail\n");
        assert_eq!(chunks.concat(), input);
        assert_eq!(text, input);
    }

    #[tokio::test]
    async fn test_no_trailing_newline_still_delivered() {
        let sink = Arc::new(CollectSink::new());
        let drain = StreamDrain::new(1000, sink.clone());
        let text = drain.drain(&b"no newline at end"[..]).await;
        assert_eq!(text, "no newline at end");
        assert_eq!(sink.chunks(), vec!["no newline at end".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_stream_completes_without_chunks() {
        let sink = Arc::new(CollectSink::new());
        let drain = StreamDrain::new(50, sink.clone());
        let text = drain.drain(&b""[..]).await;
        assert_eq!(text, "");
        assert!(sink.chunks().is_empty());
        assert_eq!(sink.completed().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced_not_fatal() {
        let sink = Arc::new(CollectSink::new());
        let drain = StreamDrain::new(1000, sink.clone());
        let text = drain.drain(&b"bad \xff byte\n"[..]).await;
        assert_eq!(text, "bad \u{fffd} byte\n");
        assert_eq!(sink.chunks().concat(), text);
    }

    #[tokio::test]
    async fn test_read_error_preserves_partial_output() {
        let reader = tokio_test::io::Builder::new()
            .read(b"first line\n")
            .read_error(std::io::Error::other("pipe burst"))
            .build();

        let sink = Arc::new(CollectSink::new());
        let drain = StreamDrain::new(1000, sink.clone());
        let text = drain.drain(reader).await;

        assert_eq!(text, "first line\n");
        assert_eq!(sink.chunks(), vec!["first line\n".to_string()]);
        assert_eq!(sink.completed().as_deref(), Some("first line\n"));
    }

    #[tokio::test]
    async fn test_channel_sink_preserves_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let drain = StreamDrain::new(1, Arc::new(ChannelSink::new(tx)));
        drain.drain(&b"one\ntwo\nthree\n"[..]).await;

        let mut received = Vec::new();
        while let Some(chunk) = rx.recv().await {
            received.push(chunk);
        }
        assert_eq!(received, vec!["one\n", "two\n", "three\n"]);
    }
}
