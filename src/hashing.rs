//! Integer finalizers used to spread match keys across the hash table.
//!
//! The match finder builds a 32-bit key from the four bytes at the scan
//! cursor and runs it through [`murmur3_mix`] before taking the table
//! bucket.  The raw key is highly structured (text bytes share high bits),
//! so a full-avalanche mix is what keeps probe chains short.

/// MurmurHash3 32-bit final mix.
///
/// Public-domain finalizer by Austin Appleby
/// (<https://github.com/aappleby/smhasher/blob/master/src/MurmurHash3.cpp>).
/// Bijective on `u32`, full avalanche.
#[inline(always)]
pub fn murmur3_mix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Build the 32-bit match key for the four bytes at `data[at..at + 4]`.
///
/// Equivalent to shifting three fixed bytes and folding in the fourth, so a
/// scan may also maintain it as a rolling value; computing it directly keeps
/// call sites obvious.
#[inline(always)]
pub fn match_key(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}
