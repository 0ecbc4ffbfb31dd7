//! Streaming greedy encoder.
//!
//! Input bytes accumulate in a sliding uncompressed buffer; a compression
//! pass runs only when that buffer is completely full (or at
//! [`Encoder::finish`]), so the emitted token stream depends on the input
//! bytes alone and never on how callers chunk their writes.  Each pass
//! scans the pending region with a rolling 4-byte key, takes the longest
//! verified match greedily, and spills encoded tokens through a second
//! sliding buffer into the sink.
//!
//! Memory use is fixed at construction: two buffers of four windows each
//! plus the match index.

use std::io::{self, Write};

use crate::buffer::SlidingBuffer;
use crate::format::{Format, TokenFormat};
use crate::hashing;
use crate::match_finder::MatchFinder;
use crate::token::Token;

/// Uncompressed and compressed staging buffers both span this many
/// back-reference windows.  Large enough that a full pass always frees
/// space and a worst-case encoded token always fits after a drain.
const BUFFER_WINDOWS: usize = 4;

/// Push-style compressor writing one complete stream to `sink`.
///
/// Implements [`std::io::Write`].  The stream is not valid until
/// [`Encoder::finish`] has run; `finish` consumes the encoder, so a stream
/// cannot be closed twice or written to after closing.
pub struct Encoder<W: Write> {
    sink: W,
    format: Format,
    uncompressed: SlidingBuffer,
    compressed: SlidingBuffer,
    finder: MatchFinder,
    /// Bytes at the front of the pending region already scanned and held
    /// back as an open literal run.  Carried between passes so positions
    /// are never scanned twice.
    pending_literals: usize,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder for one stream in the given format.
    ///
    /// The preamble is staged immediately; nothing reaches `sink` until a
    /// compression pass drains, so construction cannot fail.
    pub fn new(sink: W, format: Format) -> Encoder<W> {
        let layout = format.token_format();
        let window = layout.max_copy_distance();
        let mut compressed = SlidingBuffer::new(BUFFER_WINDOWS * window);
        compressed.extend_from_slice(layout.preamble());
        Encoder {
            sink,
            format,
            uncompressed: SlidingBuffer::new(BUFFER_WINDOWS * window),
            compressed,
            finder: MatchFinder::new(window),
            pending_literals: 0,
        }
    }

    /// The stream format this encoder writes.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Match-index probes so far; see [`MatchFinder::probe_count`].
    pub fn probe_count(&self) -> u64 {
        self.finder.probe_count()
    }

    /// Flush the open literal run, emit the end-of-stream token, drain
    /// everything to the sink, and return it.
    pub fn finish(mut self) -> io::Result<W> {
        self.compress_pending(true)?;
        self.emit_token(Token::END_OF_STREAM, 0)?;
        self.compressed.drain_to(&mut self.sink, 0)?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    /// One compression pass over the scannable part of the pending region.
    ///
    /// When `finishing`, the scan runs to the true end of input and every
    /// leftover byte is emitted as literals; otherwise it stops a full
    /// token-length short of the end so that match decisions near the tail
    /// are never truncated by buffer arrival boundaries.
    fn compress_pending(&mut self, finishing: bool) -> io::Result<()> {
        let layout = self.format.token_format();
        let min_copy = layout.min_copy_length();
        let max_token = layout.max_token_length();
        let window = layout.max_copy_distance();

        let end = self.uncompressed.end();
        let scan_end = if finishing {
            end
        } else {
            end.saturating_sub(max_token)
        };
        let mut literal_start = self.uncompressed.index();
        let mut i = literal_start + self.pending_literals;

        while i < scan_end && i + min_copy <= end {
            if i - literal_start == max_token {
                self.emit_token(Token::literal(max_token), literal_start)?;
                literal_start = i;
            }
            let key = hashing::match_key(self.uncompressed.filled(), i);
            let budget = (max_token - (i - literal_start)).min(end - i);
            let found = self.finder.longest_match(&self.uncompressed, i, key, budget);
            match found {
                Some(m) if m.length >= min_copy => {
                    let position = self.uncompressed.start_position() + i as u64;
                    let token = Token {
                        literal_length: i - literal_start,
                        copy_length: m.length,
                        copy_distance: (position - m.position) as usize,
                    };
                    self.emit_token(token, literal_start)?;
                    // Positions inside the copied span are still useful
                    // history for later matches.
                    for j in i + 1..(i + m.length).min(end - min_copy + 1) {
                        let key = hashing::match_key(self.uncompressed.filled(), j);
                        self.finder
                            .insert(self.uncompressed.start_position() + j as u64, key);
                    }
                    i += m.length;
                    literal_start = i;
                }
                _ => i += 1,
            }
        }

        if finishing {
            // The tail (too short to hold a key) and any open run are all
            // literals now, chunked to the token cap.
            while literal_start < end {
                let run = (end - literal_start).min(max_token);
                self.emit_token(Token::literal(run), literal_start)?;
                literal_start += run;
            }
            i = end;
        }

        self.pending_literals = i - literal_start;
        let emitted = literal_start - self.uncompressed.index();
        self.uncompressed.consume(emitted);
        self.uncompressed.shift(window);
        Ok(())
    }

    /// Stage one encoded token, draining the compressed buffer first when a
    /// worst-case token might not fit.
    fn emit_token(&mut self, token: Token, literal_start: usize) -> io::Result<()> {
        let layout = self.format.token_format();
        if self.compressed.remaining_space() < layout.max_encoded_length() {
            self.compressed.drain_to(&mut self.sink, 0)?;
            self.compressed.shift(layout.max_copy_distance());
        }
        let literals =
            &self.uncompressed.filled()[literal_start..literal_start + token.literal_length];
        layout.write_token(token, literals, &mut self.compressed);
        Ok(())
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.uncompressed.remaining_space() == 0 {
            self.compress_pending(false)?;
        }
        Ok(self.uncompressed.append_from_slice(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        // Buffered input cannot be flushed early without changing the token
        // stream; only pass already-encoded bytes through.
        self.compressed.drain_to(&mut self.sink, 0)?;
        self.compressed
            .shift(self.format.token_format().max_copy_distance());
        self.sink.flush()
    }
}
