//! Streaming token-interpreting decoder.
//!
//! Compressed bytes are pulled from the source into a sliding buffer; a
//! token is only interpreted once every one of its bytes is present, so a
//! partial tail is never half-consumed.  Decoded output accumulates in a
//! second sliding buffer that retains one full window of history for
//! back-references, and callers drain it through `std::io::Read`.
//!
//! The stream walks three states: preamble validation, token streaming,
//! ended.  After the end-of-stream token every read returns 0 and trailing
//! source bytes are left untouched.

use std::io::{self, Read};

use crate::buffer::SlidingBuffer;
use crate::error::CodecError;
use crate::format::{Format, ParsedToken, TokenFormat};

/// Staging buffers span this many back-reference windows, matching the
/// encoder so a worst-case token always fits.
const BUFFER_WINDOWS: usize = 4;

enum State {
    AwaitingPreamble,
    Streaming,
    Ended,
}

/// Pull-style decompressor reading one complete stream from `source`.
pub struct Decoder<R: Read> {
    source: R,
    format: Format,
    compressed: SlidingBuffer,
    decoded: SlidingBuffer,
    state: State,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder expecting a stream in the given format.
    ///
    /// Nothing is read until the first call to `read`.
    pub fn new(source: R, format: Format) -> Decoder<R> {
        let window = format.token_format().max_copy_distance();
        Decoder {
            source,
            format,
            compressed: SlidingBuffer::new(BUFFER_WINDOWS * window),
            decoded: SlidingBuffer::new(BUFFER_WINDOWS * window),
            state: State::AwaitingPreamble,
        }
    }

    /// The stream format this decoder expects.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Give back the source, abandoning any buffered bytes.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Decode into `out`, reporting framing errors as [`CodecError`].
    ///
    /// Returns 0 only for an empty `out` or after the end-of-stream token.
    pub fn read_decoded(&mut self, out: &mut [u8]) -> Result<usize, CodecError> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if !self.decoded.is_empty() {
                return Ok(self.decoded.drain_to_slice(out));
            }
            match self.state {
                State::Ended => return Ok(0),
                State::AwaitingPreamble => {
                    self.read_preamble()?;
                    self.state = State::Streaming;
                }
                State::Streaming => self.decode_tokens()?,
            }
        }
    }

    fn read_preamble(&mut self) -> Result<(), CodecError> {
        let preamble = self.format.token_format().preamble();
        while self.compressed.end() < preamble.len() {
            if self.compressed.append_from(&mut self.source)? == 0 {
                return Err(CodecError::MissingPreamble(self.format));
            }
        }
        if &self.compressed.filled()[..preamble.len()] != preamble {
            return Err(CodecError::MissingPreamble(self.format));
        }
        self.compressed.consume(preamble.len());
        self.compressed.shift(0);
        Ok(())
    }

    /// Interpret tokens until decoded bytes are available or the stream
    /// ends.  Refills from the source only while nothing is decoded yet, so
    /// available output is never held hostage to a slow source.
    fn decode_tokens(&mut self) -> Result<(), CodecError> {
        let layout = self.format.token_format();
        self.decoded.shift(layout.max_copy_distance());
        loop {
            match layout.parse_token(self.compressed.pending()) {
                Some(parsed) => {
                    if parsed.token.is_end_of_stream() {
                        self.compressed.consume(parsed.encoded_length);
                        self.state = State::Ended;
                        return Ok(());
                    }
                    if self.decoded.remaining_space() < parsed.token.decoded_length() {
                        if self.decoded.is_empty() {
                            // Even a fully drained buffer could not hold it;
                            // only a malformed stream declares such a token.
                            return Err(CodecError::OversizedToken);
                        }
                        return Ok(());
                    }
                    self.apply_token(parsed)?;
                }
                None => {
                    if !self.decoded.is_empty() {
                        return Ok(());
                    }
                    // Compressed history is never referenced again; drop
                    // the consumed prefix wholesale before refilling.
                    self.compressed.shift(0);
                    if self.compressed.remaining_space() == 0 {
                        return Err(CodecError::OversizedToken);
                    }
                    if self.compressed.append_from(&mut self.source)? == 0 {
                        return Err(CodecError::TruncatedStream);
                    }
                }
            }
        }
    }

    fn apply_token(&mut self, parsed: ParsedToken) -> Result<(), CodecError> {
        let token = parsed.token;
        let pending = self.compressed.pending();
        let literals =
            &pending[parsed.literal_offset..parsed.literal_offset + token.literal_length];
        self.decoded.extend_from_slice(literals);
        if token.copy_length > 0 {
            let history = self.decoded.end();
            if token.copy_distance == 0 || token.copy_distance > history {
                return Err(CodecError::InvalidDistance {
                    distance: token.copy_distance,
                    history,
                });
            }
            self.decoded
                .extend_from_history(token.copy_distance, token.copy_length);
        }
        self.compressed.consume(parsed.encoded_length);
        Ok(())
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.read_decoded(out).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use std::io::Write;

    fn encode_all(data: &[u8], format: Format) -> Vec<u8> {
        let mut encoder = Encoder::new(Vec::new(), format);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn decode_all(bytes: &[u8], format: Format) -> Result<Vec<u8>, CodecError> {
        let mut decoder = Decoder::new(bytes, format);
        let mut out = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = decoder.read_decoded(&mut chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    #[test]
    fn round_trips_in_both_formats() {
        let data: Vec<u8> = b"needle in a haystack, needle in a haystack! "
            .iter()
            .copied()
            .cycle()
            .take(50_000)
            .collect();
        for format in [Format::Lz4s, Format::Lz4] {
            let compressed = encode_all(&data, format);
            assert!(compressed.len() < data.len());
            assert_eq!(decode_all(&compressed, format).unwrap(), data);
        }
    }

    #[test]
    fn empty_stream_round_trips() {
        let compressed = encode_all(b"", Format::Lz4s);
        assert_eq!(decode_all(&compressed, Format::Lz4s).unwrap(), b"");
    }

    #[test]
    fn overlapping_copies_replicate_patterns() {
        // Hand-built stream: 2 literals then an overlapping copy of 8.
        let mut stream = b"LZ4S\xff".to_vec();
        stream.extend_from_slice(&[2, 8, b'a', b'b', 2, 0]);
        stream.extend_from_slice(&[0, 0]);
        assert_eq!(decode_all(&stream, Format::Lz4s).unwrap(), b"ababababab");
    }

    #[test]
    fn wrong_preamble_is_rejected() {
        let err = decode_all(b"LZXX\xff\x00\x00", Format::Lz4s).unwrap_err();
        assert!(matches!(err, CodecError::MissingPreamble(Format::Lz4s)));

        let err = decode_all(b"", Format::Lz4).unwrap_err();
        assert!(matches!(err, CodecError::MissingPreamble(Format::Lz4)));

        // A valid lz4s stream is not a valid lz4 stream.
        let compressed = encode_all(b"hello", Format::Lz4s);
        let err = decode_all(&compressed, Format::Lz4).unwrap_err();
        assert!(matches!(err, CodecError::MissingPreamble(Format::Lz4)));
    }

    #[test]
    fn truncation_is_detected() {
        let compressed = encode_all(b"some ordinary input data", Format::Lz4s);
        // Cut anywhere after the preamble, sentinel included.
        for cut in 5..compressed.len() {
            let err = decode_all(&compressed[..cut], Format::Lz4s).unwrap_err();
            assert!(
                matches!(err, CodecError::TruncatedStream),
                "cut at {cut}: {err}"
            );
        }
    }

    #[test]
    fn out_of_history_distance_is_rejected() {
        // Copy of 4 at distance 9 with only 1 byte decoded.
        let mut stream = b"LZ4S\xff".to_vec();
        stream.extend_from_slice(&[1, 4, b'x', 9, 0, 0, 0]);
        let err = decode_all(&stream, Format::Lz4s).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidDistance {
                distance: 9,
                history: 1
            }
        ));
    }

    #[test]
    fn zero_distance_is_rejected() {
        let mut stream = b"LZ4S\xff".to_vec();
        stream.extend_from_slice(&[1, 4, b'x', 0, 0, 0, 0]);
        let err = decode_all(&stream, Format::Lz4s).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDistance { distance: 0, .. }));
    }

    #[test]
    fn oversized_token_declaration_is_rejected() {
        // An lz4 literal run bigger than the decoder will ever buffer.
        let length = 300_000usize;
        let mut stream = b"LZ4\xff".to_vec();
        stream.push(0xf0);
        let mut rest = length - 15;
        while rest >= 255 {
            stream.push(255);
            rest -= 255;
        }
        stream.push(rest as u8);
        stream.resize(stream.len() + length, b'z');
        stream.push(0);

        let err = decode_all(&stream, Format::Lz4).unwrap_err();
        assert!(matches!(err, CodecError::OversizedToken));
    }

    #[test]
    fn reads_after_end_return_zero_and_ignore_trailing_bytes() {
        let mut compressed = encode_all(b"tail", Format::Lz4s);
        compressed.extend_from_slice(b"garbage after the sentinel");

        let mut decoder = Decoder::new(compressed.as_slice(), Format::Lz4s);
        let mut out = [0u8; 16];
        let mut decoded = Vec::new();
        loop {
            let n = decoder.read_decoded(&mut out).unwrap();
            if n == 0 {
                break;
            }
            decoded.extend_from_slice(&out[..n]);
        }
        assert_eq!(decoded, b"tail");
        for _ in 0..3 {
            assert_eq!(decoder.read_decoded(&mut out).unwrap(), 0);
        }
    }

    #[test]
    fn decoded_output_is_independent_of_read_chunking() {
        let data: Vec<u8> = (0u32..40_000).map(|i| (i * 31 % 253) as u8).collect();
        let compressed = encode_all(&data, Format::Lz4);

        let one_shot = decode_all(&compressed, Format::Lz4).unwrap();

        let mut decoder = Decoder::new(compressed.as_slice(), Format::Lz4);
        let mut byte_wise = Vec::new();
        let mut one = [0u8; 1];
        while decoder.read_decoded(&mut one).unwrap() == 1 {
            byte_wise.push(one[0]);
        }
        assert_eq!(one_shot, data);
        assert_eq!(byte_wise, data);
    }
}
