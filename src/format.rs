//! The two on-wire token layouts and the parameters that go with them.
//!
//! A stream is always encoded in exactly one format, chosen explicitly by
//! the caller (a [`Format`] value, never guessed from content).  Each
//! format fixes the magic preamble, the back-reference window, the minimum
//! worthwhile copy length, the per-token decoded-length cap, and the byte
//! layout of a token.  The encoder and decoder are generic over
//! [`TokenFormat`] and never touch wire bytes themselves.
//!
//! Both formats end with the zero-length sentinel token and carry no
//! footer, index, or checksum after it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::buffer::SlidingBuffer;
use crate::token::Token;

/// Fixed-field layout: single-byte lengths, 8 KiB window.
pub const LZ4S: Lz4sFormat = Lz4sFormat;

/// Nibble-and-continuation layout: open-ended lengths, 64 KiB window.
pub const LZ4: Lz4Format = Lz4Format;

/// Stream format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `b"LZ4S\xff"` preamble, fixed one-byte length fields.
    Lz4s,
    /// `b"LZ4\xff"` preamble, marker nibbles with 255-continuation bytes.
    Lz4,
}

impl Format {
    /// The token layout implementation for this format.
    pub fn token_format(self) -> &'static dyn TokenFormat {
        match self {
            Format::Lz4s => &LZ4S,
            Format::Lz4 => &LZ4,
        }
    }

    /// Conventional file extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Format::Lz4s => "lz4s",
            Format::Lz4 => "lz4",
        }
    }

    /// Infer a format from a path's extension, if it names one.
    ///
    /// Convenience for the CLI only; library callers pass a `Format`
    /// directly.
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()? {
            "lz4s" => Some(Format::Lz4s),
            "lz4" => Some(Format::Lz4),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Format, String> {
        match s {
            "lz4s" => Ok(Format::Lz4s),
            "lz4" => Ok(Format::Lz4),
            other => Err(format!("unknown format {other:?} (expected lz4s or lz4)")),
        }
    }
}

/// A token parsed back out of compressed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedToken {
    pub token: Token,
    /// Offset of the literal bytes within the encoded token.
    pub literal_offset: usize,
    /// Total encoded size of the token, literals included.
    pub encoded_length: usize,
}

/// Byte-level token layout plus the stream parameters tied to it.
pub trait TokenFormat {
    /// Magic bytes opening every stream.
    fn preamble(&self) -> &'static [u8];

    /// Maximum back-reference distance, in decoded bytes.
    fn max_copy_distance(&self) -> usize;

    /// Shortest copy worth emitting; shorter matches are kept as literals.
    fn min_copy_length(&self) -> usize {
        4
    }

    /// Cap on `literal_length + copy_length` for one token.
    fn max_token_length(&self) -> usize;

    /// Worst-case encoded size of a single token, literals included.
    fn max_encoded_length(&self) -> usize;

    /// Append the encoded token to `out`.  `literals` must hold exactly
    /// `token.literal_length` bytes; the caller guarantees capacity for
    /// [`TokenFormat::max_encoded_length`] bytes.
    fn write_token(&self, token: Token, literals: &[u8], out: &mut SlidingBuffer);

    /// Parse one token from the front of `data`.
    ///
    /// Returns `None` when `data` holds only a prefix of a token; the
    /// decoder then refills and retries.  Field values are not validated
    /// here; distance checks need decode history and live in the decoder.
    fn parse_token(&self, data: &[u8]) -> Option<ParsedToken>;
}

/// Fixed-field format: `lit: u8`, `copy: u8`, literals, then
/// `distance: u16le` iff `copy > 0`.
#[derive(Debug, Clone, Copy)]
pub struct Lz4sFormat;

impl TokenFormat for Lz4sFormat {
    fn preamble(&self) -> &'static [u8] {
        b"LZ4S\xff"
    }

    fn max_copy_distance(&self) -> usize {
        8192
    }

    fn max_token_length(&self) -> usize {
        255
    }

    fn max_encoded_length(&self) -> usize {
        // lit + copy + 255 literals + distance
        2 + 255 + 2
    }

    fn write_token(&self, token: Token, literals: &[u8], out: &mut SlidingBuffer) {
        debug_assert_eq!(literals.len(), token.literal_length);
        debug_assert!(token.literal_length + token.copy_length <= self.max_token_length());
        out.push(token.literal_length as u8);
        out.push(token.copy_length as u8);
        out.extend_from_slice(literals);
        if token.copy_length > 0 {
            out.extend_from_slice(&(token.copy_distance as u16).to_le_bytes());
        }
    }

    fn parse_token(&self, data: &[u8]) -> Option<ParsedToken> {
        let literal_length = usize::from(*data.first()?);
        let copy_length = usize::from(*data.get(1)?);
        let mut encoded_length = 2 + literal_length;
        let mut copy_distance = 0;
        if copy_length > 0 {
            let distance = data.get(encoded_length..encoded_length + 2)?;
            copy_distance = usize::from(u16::from_le_bytes([distance[0], distance[1]]));
            encoded_length += 2;
        } else if data.len() < encoded_length {
            return None;
        }
        Some(ParsedToken {
            token: Token {
                literal_length,
                copy_length,
                copy_distance,
            },
            literal_offset: 2,
            encoded_length,
        })
    }
}

/// Nibble format: marker byte `(min(lit,15) << 4) | min(copy,15)`, each
/// saturated nibble followed by 255-continuation bytes; literals; then
/// `distance: u16le` (before the copy continuation) iff `copy > 0`.
#[derive(Debug, Clone, Copy)]
pub struct Lz4Format;

impl Lz4Format {
    fn write_extension(value: usize, out: &mut SlidingBuffer) {
        let mut rest = value;
        while rest >= 255 {
            out.push(255);
            rest -= 255;
        }
        out.push(rest as u8);
    }

    /// Read continuation bytes for a saturated nibble.  Advances `at` past
    /// the bytes consumed; `None` means the extension is cut short.
    fn read_extension(data: &[u8], at: &mut usize) -> Option<usize> {
        let mut total = 15;
        loop {
            let byte = *data.get(*at)?;
            *at += 1;
            total += usize::from(byte);
            if byte < 255 {
                return Some(total);
            }
        }
    }
}

impl TokenFormat for Lz4Format {
    fn preamble(&self) -> &'static [u8] {
        b"LZ4\xff"
    }

    fn max_copy_distance(&self) -> usize {
        65535
    }

    /// The wire format is open-ended; this cap is the encoder's, so one
    /// token never outgrows the bounded buffers.
    fn max_token_length(&self) -> usize {
        65535
    }

    fn max_encoded_length(&self) -> usize {
        // marker + two extension runs + literals + distance
        let extension = 65535 / 255 + 1;
        1 + 2 * extension + 65535 + 2
    }

    fn write_token(&self, token: Token, literals: &[u8], out: &mut SlidingBuffer) {
        debug_assert_eq!(literals.len(), token.literal_length);
        debug_assert!(token.literal_length + token.copy_length <= self.max_token_length());
        let literal_nibble = token.literal_length.min(15);
        let copy_nibble = token.copy_length.min(15);
        out.push(((literal_nibble << 4) | copy_nibble) as u8);
        if literal_nibble == 15 {
            Self::write_extension(token.literal_length - 15, out);
        }
        out.extend_from_slice(literals);
        if token.copy_length > 0 {
            out.extend_from_slice(&(token.copy_distance as u16).to_le_bytes());
            if copy_nibble == 15 {
                Self::write_extension(token.copy_length - 15, out);
            }
        }
    }

    fn parse_token(&self, data: &[u8]) -> Option<ParsedToken> {
        let marker = *data.first()?;
        let mut at = 1;
        let mut literal_length = usize::from(marker >> 4);
        if literal_length == 15 {
            literal_length = Self::read_extension(data, &mut at)?;
        }
        let literal_offset = at;
        at += literal_length;

        let copy_nibble = usize::from(marker & 0x0f);
        let mut copy_length = copy_nibble;
        let mut copy_distance = 0;
        if copy_nibble > 0 {
            let distance = data.get(at..at + 2)?;
            copy_distance = usize::from(u16::from_le_bytes([distance[0], distance[1]]));
            at += 2;
            if copy_nibble == 15 {
                copy_length = Self::read_extension(data, &mut at)?;
            }
        }
        if data.len() < at {
            return None;
        }
        Some(ParsedToken {
            token: Token {
                literal_length,
                copy_length,
                copy_distance,
            },
            literal_offset,
            encoded_length: at,
        })
    }
}
