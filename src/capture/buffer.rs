//! Bounded accumulation of streamed text into delivery-sized chunks
//!
//! `ChunkBuffer` sits between a line-by-line stream reader and whatever
//! consumes the output. Lines are appended as they arrive; once the
//! accumulated text reaches the configured threshold the whole buffer is
//! handed over as one chunk. Chunking only paces delivery, it never alters
//! content: concatenating every chunk (plus the final remainder) reproduces
//! the input byte for byte.

use std::sync::Mutex;

/// Default minimum chunk size in bytes before a flush is triggered.
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 50;

/// Thread-safe text accumulator that releases its contents in chunks of at
/// least `min_chunk_size` bytes.
///
/// All operations lock a single internal mutex, so appends and drains can
/// race freely across threads without tearing a chunk.
#[derive(Debug)]
pub struct ChunkBuffer {
    contents: Mutex<String>,
    min_chunk_size: usize,
}

impl ChunkBuffer {
    /// Create a buffer that flushes once `min_chunk_size` bytes accumulate.
    pub fn new(min_chunk_size: usize) -> Self {
        Self {
            contents: Mutex::new(String::new()),
            min_chunk_size,
        }
    }

    /// Append text without checking the flush policy.
    pub fn append(&self, text: &str) {
        self.contents.lock().unwrap().push_str(text);
    }

    /// Whether the accumulated text has reached the flush threshold.
    pub fn should_flush(&self) -> bool {
        self.contents.lock().unwrap().len() >= self.min_chunk_size
    }

    /// Take the accumulated text, leaving the buffer empty.
    pub fn drain(&self) -> String {
        std::mem::take(&mut *self.contents.lock().unwrap())
    }

    /// Append `text` and, if the threshold is now reached, drain and return
    /// the chunk. Runs as one critical section so a concurrent append can
    /// never land between the check and the drain.
    pub fn append_and_flush(&self, text: &str) -> Option<String> {
        let mut contents = self.contents.lock().unwrap();
        contents.push_str(text);
        if contents.len() >= self.min_chunk_size {
            Some(std::mem::take(&mut *contents))
        } else {
            None
        }
    }

    /// Take whatever is left below the threshold at end of stream.
    ///
    /// Returns `None` only when the buffer holds no bytes at all; a
    /// whitespace-only tail is still delivered so no input is ever dropped.
    pub fn take_remainder(&self) -> Option<String> {
        let mut contents = self.contents.lock().unwrap();
        if contents.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut *contents))
        }
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.contents.lock().unwrap().len()
    }

    /// Whether the buffer currently holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.contents.lock().unwrap().is_empty()
    }
}

impl Default for ChunkBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CHUNK_SIZE)
    }
}
