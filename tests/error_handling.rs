//! Malformed input must fail with the specific framing error, and
//! propagated I/O failures must stay distinguishable from corruption.

use std::io::{self, Read, Write};

use lz4s::{stream, CodecError, Decoder, Encoder, Format, TokenFormat};

fn compress(data: &[u8], format: Format) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new(), format);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn decompress(bytes: &[u8], format: Format) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    stream::decompress(bytes, &mut out, format)?;
    Ok(out)
}

#[test]
fn missing_preamble() {
    for format in [Format::Lz4s, Format::Lz4] {
        for bad in [&b""[..], b"LZ", b"GZIP\xff\x00\x00", b"LZ4X\xff\x00\x00"] {
            let err = decompress(bad, format).unwrap_err();
            assert!(
                matches!(err, CodecError::MissingPreamble(f) if f == format),
                "{format}: {err}"
            );
        }
    }
}

#[test]
fn cross_format_streams_are_rejected() {
    let lz4s_stream = compress(b"payload", Format::Lz4s);
    let err = decompress(&lz4s_stream, Format::Lz4).unwrap_err();
    assert!(matches!(err, CodecError::MissingPreamble(Format::Lz4)));

    let lz4_stream = compress(b"payload", Format::Lz4);
    let err = decompress(&lz4_stream, Format::Lz4s).unwrap_err();
    assert!(matches!(err, CodecError::MissingPreamble(Format::Lz4s)));
}

#[test]
fn truncation_at_every_point() {
    for format in [Format::Lz4s, Format::Lz4] {
        let compressed = compress(b"enough data to need a few tokens, honestly", format);
        let preamble_len = format.token_format().preamble().len();
        for cut in preamble_len..compressed.len() {
            let err = decompress(&compressed[..cut], format).unwrap_err();
            assert!(
                matches!(err, CodecError::TruncatedStream),
                "{format} cut {cut}: {err}"
            );
        }
    }
}

#[test]
fn corrupt_distance_is_a_framing_error() {
    // lit 1, copy 4, distance far beyond the single decoded byte.
    let mut stream_bytes = b"LZ4S\xff".to_vec();
    stream_bytes.extend_from_slice(&[1, 4, b'x', 0xff, 0x1f, 0, 0]);
    let err = decompress(&stream_bytes, Format::Lz4s).unwrap_err();
    assert!(matches!(
        err,
        CodecError::InvalidDistance {
            distance: 0x1fff,
            history: 1
        }
    ));
}

#[test]
fn io_errors_are_not_reported_as_corruption() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "cable pulled"))
        }
    }

    let mut out = Vec::new();
    let err = stream::decompress(Broken, &mut out, Format::Lz4s).unwrap_err();
    match err {
        CodecError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("expected Io, got {other}"),
    }
}

#[test]
fn decoder_keeps_returning_zero_after_the_sentinel() {
    let compressed = compress(b"short", Format::Lz4s);
    let mut decoder = Decoder::new(compressed.as_slice(), Format::Lz4s);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, b"short");

    let mut buf = [0u8; 8];
    for _ in 0..4 {
        assert_eq!(decoder.read(&mut buf).unwrap(), 0);
    }
}

#[test]
fn framing_errors_surface_through_io_read_with_useful_kinds() {
    let mut decoder = Decoder::new(&b"not a stream"[..], Format::Lz4s);
    let mut buf = [0u8; 8];
    let err = decoder.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    let compressed = compress(b"truncate me please, somewhere useful", Format::Lz4s);
    let cut = compressed.len() - 1;
    let mut decoder = Decoder::new(&compressed[..cut], Format::Lz4s);
    let err = decoder.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
