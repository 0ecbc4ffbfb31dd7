//! One-call codec operations over readers, writers, and file paths.
//!
//! These wrap [`Encoder`] and [`Decoder`] in the copy loops that nearly
//! every caller wants, and count bytes on both sides so the CLI can report
//! ratios and throughput without re-reading anything.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CodecError;
use crate::format::Format;

/// Byte counts from one compress or decompress operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl CodecStats {
    /// Output bytes per input byte.  1.0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.bytes_read == 0 {
            1.0
        } else {
            self.bytes_written as f64 / self.bytes_read as f64
        }
    }
}

struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct CountingReader<R> {
    inner: R,
    read: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        Ok(n)
    }
}

/// Compress everything from `source` into `sink` as one complete stream.
pub fn compress(
    source: &mut impl Read,
    sink: impl Write,
    format: Format,
) -> Result<CodecStats, CodecError> {
    let counting = CountingWriter {
        inner: sink,
        written: 0,
    };
    let mut encoder = Encoder::new(counting, format);
    let bytes_read = io::copy(source, &mut encoder)?;
    let counting = encoder.finish()?;
    Ok(CodecStats {
        bytes_read,
        bytes_written: counting.written,
    })
}

/// Decompress one complete stream from `source` into `sink`.
///
/// Trailing bytes after the end-of-stream token are left unread in
/// `source`.
pub fn decompress(
    source: impl Read,
    sink: &mut impl Write,
    format: Format,
) -> Result<CodecStats, CodecError> {
    let counting = CountingReader {
        inner: source,
        read: 0,
    };
    let mut decoder = Decoder::new(counting, format);
    let mut bytes_written = 0u64;
    let mut chunk = [0u8; 32 * 1024];
    loop {
        let n = decoder.read_decoded(&mut chunk)?;
        if n == 0 {
            break;
        }
        sink.write_all(&chunk[..n])?;
        bytes_written += n as u64;
    }
    sink.flush()?;
    Ok(CodecStats {
        bytes_read: decoder.into_inner().read,
        bytes_written,
    })
}

/// Compress `input` into `output`, creating or truncating `output`.
pub fn compress_file(input: &Path, output: &Path, format: Format) -> Result<CodecStats, CodecError> {
    let mut source = BufReader::new(File::open(input)?);
    let sink = BufWriter::new(File::create(output)?);
    compress(&mut source, sink, format)
}

/// Decompress `input` into `output`, creating or truncating `output`.
pub fn decompress_file(
    input: &Path,
    output: &Path,
    format: Format,
) -> Result<CodecStats, CodecError> {
    let source = BufReader::new(File::open(input)?);
    let mut sink = BufWriter::new(File::create(output)?);
    decompress(source, &mut sink, format)
}

/// First point where two byte streams disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub position: u64,
    /// `None` means the stream ended here.
    pub left: Option<u8>,
    pub right: Option<u8>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn byte(b: Option<u8>) -> String {
            match b {
                Some(b) => format!("0x{b:02x}"),
                None => "end of stream".to_owned(),
            }
        }
        write!(
            f,
            "streams differ at byte {}: {} vs {}",
            self.position,
            byte(self.left),
            byte(self.right)
        )
    }
}

/// Compare two streams byte for byte.
///
/// Returns `Ok(None)` when they are identical, including in length.
/// Callers should hand in buffered readers; this reads a byte at a time.
pub fn verify_bytes_equal(left: impl Read, right: impl Read) -> io::Result<Option<Mismatch>> {
    let mut left = left.bytes();
    let mut right = right.bytes();
    let mut position = 0u64;
    loop {
        let l = left.next().transpose()?;
        let r = right.next().transpose()?;
        match (l, r) {
            (None, None) => return Ok(None),
            (l, r) if l == r => position += 1,
            (l, r) => {
                return Ok(Some(Mismatch {
                    position,
                    left: l,
                    right: r,
                }))
            }
        }
    }
}

/// Decode `compressed` and compare it against `original`.
pub fn verify_round_trip(
    original: &Path,
    compressed: &Path,
    format: Format,
) -> Result<Option<Mismatch>, CodecError> {
    let original = BufReader::new(File::open(original)?);
    let decoder = Decoder::new(BufReader::new(File::open(compressed)?), format);
    Ok(verify_bytes_equal(original, decoder)?)
}
