//! One unit of the compressed stream: a literal run plus an optional
//! back-reference.

/// A decoded token description, independent of any byte-level format.
///
/// `copy_length == 0` means the token carries literals only, and
/// `copy_distance` is meaningless.  A token with
/// `literal_length == copy_length == 0` is the end-of-stream sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Number of literal bytes emitted verbatim before the copy.
    pub literal_length: usize,
    /// Number of bytes replayed from earlier output (0 = no back-reference).
    pub copy_length: usize,
    /// Distance back from the position after the literal run, in decoded
    /// bytes.  Valid range when `copy_length > 0`: `1..=max_copy_distance`.
    pub copy_distance: usize,
}

impl Token {
    /// The unique end-of-stream sentinel.
    pub const END_OF_STREAM: Token = Token {
        literal_length: 0,
        copy_length: 0,
        copy_distance: 0,
    };

    /// A literal-only token of `length` bytes.
    pub fn literal(length: usize) -> Token {
        Token {
            literal_length: length,
            copy_length: 0,
            copy_distance: 0,
        }
    }

    /// Number of bytes this token expands to when decoded.
    pub fn decoded_length(&self) -> usize {
        self.literal_length + self.copy_length
    }

    /// Whether this token is the end-of-stream sentinel.
    pub fn is_end_of_stream(&self) -> bool {
        self.literal_length == 0 && self.copy_length == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_unique_zero_length_token() {
        assert!(Token::END_OF_STREAM.is_end_of_stream());
        assert_eq!(Token::END_OF_STREAM.decoded_length(), 0);
        assert!(!Token::literal(1).is_end_of_stream());
        let copy = Token {
            literal_length: 0,
            copy_length: 4,
            copy_distance: 1,
        };
        assert!(!copy.is_end_of_stream());
        assert_eq!(copy.decoded_length(), 4);
    }
}
