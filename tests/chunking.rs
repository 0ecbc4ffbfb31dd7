//! The compressed stream and the decoded stream must be functions of the
//! byte content alone, never of how callers slice their reads and writes.

use std::io::{Read, Write};

use lz4s::{Decoder, Encoder, Format};

fn sample(len: usize) -> Vec<u8> {
    b"pack my box with five dozen liquor jugs; pack my box again. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn compress_chunked(data: &[u8], chunk: usize, format: Format) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new(), format);
    for piece in data.chunks(chunk) {
        encoder.write_all(piece).unwrap();
    }
    encoder.finish().unwrap()
}

fn decompress_chunked(compressed: &[u8], chunk: usize, format: Format) -> Vec<u8> {
    let mut decoder = Decoder::new(compressed, format);
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = decoder.read(&mut buf).unwrap();
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

#[test]
fn compressed_bytes_do_not_depend_on_write_granularity() {
    // Longer than the staging buffer so mid-stream passes happen.
    let data = sample(150_000);
    for format in [Format::Lz4s, Format::Lz4] {
        let reference = compress_chunked(&data, data.len(), format);
        for chunk in [1, 7, 4096, 65_536] {
            assert_eq!(
                compress_chunked(&data, chunk, format),
                reference,
                "{format}, write chunk {chunk}"
            );
        }
    }
}

#[test]
fn decoded_bytes_do_not_depend_on_read_granularity() {
    let data = sample(150_000);
    for format in [Format::Lz4s, Format::Lz4] {
        let compressed = compress_chunked(&data, data.len(), format);
        for chunk in [1, 7, 4096, 65_536] {
            assert_eq!(
                decompress_chunked(&compressed, chunk, format),
                data,
                "{format}, read chunk {chunk}"
            );
        }
    }
}

#[test]
fn interleaved_odd_chunks_still_round_trip() {
    let data = sample(80_001);
    for format in [Format::Lz4s, Format::Lz4] {
        let compressed = compress_chunked(&data, 13, format);
        assert_eq!(decompress_chunked(&compressed, 17, format), data);
    }
}
