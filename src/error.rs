//! Codec error taxonomy.
//!
//! Framing errors (malformed compressed input) are kept distinct from
//! propagated I/O failures so callers can tell a corrupt stream from a
//! broken pipe.  The decoder also surfaces these through `std::io::Read`;
//! the `From<CodecError> for io::Error` impl keeps the original error
//! reachable via `io::Error::get_ref` for callers that need the detail.

use std::fmt;
use std::io;

use crate::format::Format;

/// Everything that can go wrong while encoding or decoding a stream.
#[derive(Debug)]
pub enum CodecError {
    /// The stream does not open with the expected magic preamble.
    MissingPreamble(Format),
    /// A token's back-reference is zero or reaches before the retained
    /// decode history.
    InvalidDistance { distance: usize, history: usize },
    /// Input ended mid-token or before the end-of-stream sentinel.
    TruncatedStream,
    /// A token declares more bytes than the codec's bounded buffers allow.
    OversizedToken,
    /// Propagated I/O failure from the underlying reader or writer.
    Io(io::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::MissingPreamble(format) => {
                write!(f, "stream does not start with the {format} preamble")
            }
            CodecError::InvalidDistance { distance, history } => {
                write!(
                    f,
                    "copy distance {distance} outside decoded history of {history} bytes"
                )
            }
            CodecError::TruncatedStream => {
                f.write_str("compressed stream ended before the end-of-stream token")
            }
            CodecError::OversizedToken => {
                f.write_str("token too large for the codec's bounded buffers")
            }
            CodecError::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> CodecError {
        CodecError::Io(e)
    }
}

impl From<CodecError> for io::Error {
    fn from(e: CodecError) -> io::Error {
        match e {
            CodecError::Io(inner) => inner,
            CodecError::TruncatedStream => {
                io::Error::new(io::ErrorKind::UnexpectedEof, CodecError::TruncatedStream)
            }
            framing => io::Error::new(io::ErrorKind::InvalidData, framing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_errors_map_to_invalid_data() {
        let err: io::Error = CodecError::MissingPreamble(Format::Lz4s).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("lz4s"));

        let err: io::Error = CodecError::InvalidDistance {
            distance: 9,
            history: 3,
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncation_maps_to_unexpected_eof() {
        let err: io::Error = CodecError::TruncatedStream.into();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn io_errors_pass_through_unchanged() {
        let inner = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err: io::Error = CodecError::Io(inner).into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn original_error_is_reachable_from_io_error() {
        let err: io::Error = CodecError::TruncatedStream.into();
        let source = err.get_ref().expect("wrapped source");
        assert!(source.downcast_ref::<CodecError>().is_some());
    }
}
