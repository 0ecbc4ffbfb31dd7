//! Streaming LZ4-style codec with a bounded back-reference window.
//!
//! Compresses byte streams of any length in fixed memory: a sliding
//! window buffer tracks absolute stream positions, a two-generation hash
//! index finds repeated 4-byte sequences, and a greedy encoder emits
//! literal-plus-copy tokens in one of two wire formats ([`Format`]).
//! The decoder interprets tokens against its decoded history and exposes
//! the result through `std::io::Read`.
//!
//! ```
//! use std::io::{Read, Write};
//! use lz4s::{Decoder, Encoder, Format};
//!
//! let mut encoder = Encoder::new(Vec::new(), Format::Lz4s);
//! encoder.write_all(b"hello hello hello hello")?;
//! let compressed = encoder.finish()?;
//!
//! let mut decoder = Decoder::new(compressed.as_slice(), Format::Lz4s);
//! let mut decoded = Vec::new();
//! decoder.read_to_end(&mut decoded)?;
//! assert_eq!(decoded, b"hello hello hello hello");
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! For whole-stream and whole-file operations see [`stream`].

pub mod buffer;
pub mod cli;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod hashing;
pub mod match_finder;
pub mod stream;
pub mod token;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::CodecError;
pub use format::{Format, TokenFormat};
pub use stream::{
    compress, compress_file, decompress, decompress_file, verify_bytes_equal, CodecStats, Mismatch,
};
pub use token::Token;

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
