//! Fixed-capacity sliding window over a byte stream.
//!
//! A [`SlidingBuffer`] holds a contiguous slice of a stream plus enough
//! trailing history to satisfy back-references.  It tracks three cursors:
//!
//! ```text
//! 0            index                end          capacity
//! |  history   |  pending (unread)  |   unused   |
//! ```
//!
//! plus `array_start_position`, the absolute stream offset of storage
//! offset 0.  Compaction ([`SlidingBuffer::shift`]) is the only operation
//! that re-bases the storage, and it adjusts `array_start_position` by
//! exactly the number of bytes discarded, so `start_position() + offset`
//! is always the absolute position of a storage byte.  All position
//! arithmetic for the codec lives here; the encoder and decoder only deal
//! in storage offsets and absolute positions.

use std::io::{self, Read, Write};

/// Bounded byte window with absolute-position tracking.
#[derive(Debug)]
pub struct SlidingBuffer {
    storage: Box<[u8]>,
    /// Next unconsumed storage offset.  Bytes before it are retained history.
    index: usize,
    /// First storage offset without valid data.
    end: usize,
    /// Absolute stream position of storage offset 0.
    array_start_position: u64,
}

impl SlidingBuffer {
    /// Create an empty buffer with the given fixed capacity.
    pub fn new(capacity: usize) -> SlidingBuffer {
        SlidingBuffer {
            storage: vec![0u8; capacity].into_boxed_slice(),
            index: 0,
            end: 0,
            array_start_position: 0,
        }
    }

    /// Total storage size.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of pending (valid, unconsumed) bytes.
    pub fn len(&self) -> usize {
        self.end - self.index
    }

    /// Whether no pending bytes remain.
    pub fn is_empty(&self) -> bool {
        self.index == self.end
    }

    /// Free space at the tail.
    pub fn remaining_space(&self) -> usize {
        self.storage.len() - self.end
    }

    /// Next unconsumed storage offset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// First storage offset without valid data.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Absolute stream position of storage offset 0.
    pub fn start_position(&self) -> u64 {
        self.array_start_position
    }

    /// Absolute stream position of the next unconsumed byte.
    pub fn position(&self) -> u64 {
        self.array_start_position + self.index as u64
    }

    /// All valid bytes, history included (`storage[..end]`).
    pub fn filled(&self) -> &[u8] {
        &self.storage[..self.end]
    }

    /// Pending bytes only (`storage[index..end]`).
    pub fn pending(&self) -> &[u8] {
        &self.storage[self.index..self.end]
    }

    /// Storage offset of an absolute position, if it is still retained.
    pub fn offset_of(&self, position: u64) -> Option<usize> {
        let offset = position.checked_sub(self.array_start_position)? as usize;
        (offset < self.end).then_some(offset)
    }

    /// Fill the unused tail with one read from `source`.
    ///
    /// Returns the number of bytes appended; 0 means either the source is
    /// exhausted or the buffer is full.
    pub fn append_from(&mut self, source: &mut impl Read) -> io::Result<usize> {
        if self.remaining_space() == 0 {
            return Ok(0);
        }
        let read = loop {
            match source.read(&mut self.storage[self.end..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        self.end += read;
        Ok(read)
    }

    /// Copy as much of `src` as fits into the unused tail.
    ///
    /// Returns the number of bytes copied.
    pub fn append_from_slice(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.remaining_space());
        self.storage[self.end..self.end + n].copy_from_slice(&src[..n]);
        self.end += n;
        n
    }

    /// Append one byte.  Caller guarantees capacity.
    pub fn push(&mut self, byte: u8) {
        debug_assert!(self.end < self.storage.len());
        self.storage[self.end] = byte;
        self.end += 1;
    }

    /// Append a whole slice.  Caller guarantees capacity.
    pub fn extend_from_slice(&mut self, src: &[u8]) {
        debug_assert!(src.len() <= self.remaining_space());
        self.storage[self.end..self.end + src.len()].copy_from_slice(src);
        self.end += src.len();
    }

    /// Replay `length` bytes starting `distance` bytes before `end`.
    ///
    /// This is the self-referential back-reference copy: when
    /// `distance < length` the ranges overlap and the copy proceeds byte by
    /// byte, front to back, so short periodic patterns replicate correctly.
    ///
    /// Caller guarantees `1 <= distance <= end` and capacity for `length`.
    pub fn extend_from_history(&mut self, distance: usize, length: usize) {
        debug_assert!(distance >= 1 && distance <= self.end);
        debug_assert!(length <= self.remaining_space());
        let mut from = self.end - distance;
        for _ in 0..length {
            self.storage[self.end] = self.storage[from];
            self.end += 1;
            from += 1;
        }
    }

    /// Mark `n` pending bytes as consumed (they stay retained as history).
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len());
        self.index += n;
    }

    /// Write pending bytes to `sink`, holding back the newest
    /// `bytes_to_keep` bytes, and advance `index` past what was written.
    ///
    /// Returns the number of bytes written.
    pub fn drain_to(&mut self, sink: &mut impl Write, bytes_to_keep: usize) -> io::Result<usize> {
        let to_write = self.len().saturating_sub(bytes_to_keep);
        sink.write_all(&self.storage[self.index..self.index + to_write])?;
        self.index += to_write;
        Ok(to_write)
    }

    /// Copy pending bytes into `dst`, advancing `index`.
    ///
    /// Returns the number of bytes copied (`min(len, dst.len())`).
    pub fn drain_to_slice(&mut self, dst: &mut [u8]) -> usize {
        let n = self.len().min(dst.len());
        dst[..n].copy_from_slice(&self.storage[self.index..self.index + n]);
        self.index += n;
        n
    }

    /// Compact the buffer, keeping `keep_before_index` bytes of history.
    ///
    /// Moves `[index - keep_before_index, end)` to offset 0 and advances
    /// `array_start_position` by the number of bytes discarded.  Bytes less
    /// than `keep_before_index` behind `index` are never discarded, so any
    /// absolute position within that distance stays resolvable.
    pub fn shift(&mut self, keep_before_index: usize) {
        let discard = self.index.saturating_sub(keep_before_index);
        if discard == 0 {
            return;
        }
        self.storage.copy_within(discard..self.end, 0);
        self.index -= discard;
        self.end -= discard;
        self.array_start_position += discard as u64;
    }
}
