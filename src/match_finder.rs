//! Hash index over recent 4-byte sequences, with generational aging.
//!
//! The index must answer "where did these bytes occur before, within
//! `max_copy_distance`?" on an unbounded stream while using
//! O(max_copy_distance) memory.  Two open-addressed generations alternate:
//! every `max_copy_distance` bytes of absolute position the oldest
//! generation is cleared and becomes the new current one.  A position
//! within the window is therefore always present in either the current or
//! the previous generation; anything older has been wholesale discarded
//! without per-entry eviction.
//!
//! Stored values are generation-relative offsets held as
//! `Option<NonZeroU16>`, so an empty slot is a real tagged state rather
//! than a reserved magic value, and a full generation (one entry per
//! position over a span of at most 65 535 bytes) always fits in 16 bits.
//!
//! Hash collisions are expected; every candidate is verified by direct
//! byte comparison before it can become a match.

use std::mem;
use std::num::NonZeroU16;

use crate::buffer::SlidingBuffer;
use crate::hashing;

/// Upper bound on slots examined per probe chain.
///
/// Long identical runs hash every position to the same bucket; without a
/// cap, probe chains (and encode time) would grow quadratically on such
/// input.  When an insert finds no empty slot within the cap, the newest
/// position overwrites the last probed slot.  Overwriting never creates a
/// hole, so chain termination for other keys is unaffected.
pub const MAX_PROBE_LENGTH: usize = 64;

/// A verified earlier occurrence of the bytes at the query position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Absolute stream position where the matching bytes start.
    pub position: u64,
    /// Number of matching bytes, already capped by the caller's limit and
    /// by the match distance.
    pub length: usize,
}

/// One aging generation: a fixed open-addressed table of positions
/// relative to `start`.
#[derive(Debug)]
struct Generation {
    slots: Box<[Option<NonZeroU16>]>,
    start: u64,
}

impl Generation {
    fn new(size: usize) -> Generation {
        Generation {
            slots: vec![None; size].into_boxed_slice(),
            start: 0,
        }
    }

    fn reset(&mut self, start: u64) {
        self.slots.fill(None);
        self.start = start;
    }

    fn encode(&self, position: u64) -> Option<NonZeroU16> {
        let relative = position.checked_sub(self.start)?;
        u16::try_from(relative + 1).ok().and_then(NonZeroU16::new)
    }

    fn decode(&self, slot: NonZeroU16) -> u64 {
        self.start + u64::from(slot.get() - 1)
    }

    fn insert(&mut self, position: u64, bucket: usize, mask: usize, probes: &mut u64) {
        let Some(encoded) = self.encode(position) else {
            return;
        };
        let mut at = bucket;
        for _ in 0..MAX_PROBE_LENGTH {
            if self.slots[at].is_none() {
                self.slots[at] = Some(encoded);
                return;
            }
            *probes += 1;
            at = (at + 1) & mask;
        }
        self.slots[(bucket + MAX_PROBE_LENGTH - 1) & mask] = Some(encoded);
    }

    /// Walk the probe chain at `bucket`, byte-verifying every candidate
    /// against the bytes at `cursor`, and raise `best` where possible.
    #[allow(clippy::too_many_arguments)]
    fn scan(
        &self,
        buffer: &SlidingBuffer,
        cursor: usize,
        window: u64,
        bucket: usize,
        mask: usize,
        limit: usize,
        probes: &mut u64,
        best: &mut Option<Match>,
    ) {
        let data = buffer.filled();
        let position = buffer.start_position() + cursor as u64;
        let mut at = bucket;
        for _ in 0..MAX_PROBE_LENGTH {
            let Some(slot) = self.slots[at] else {
                return;
            };
            *probes += 1;
            let candidate = self.decode(slot);
            if candidate < position {
                let distance = position - candidate;
                // Entries in the previous generation may already be out of
                // range; the distance check is what actually enforces the
                // window, rotation only bounds memory.
                if distance <= window {
                    if let Some(from) = buffer.offset_of(candidate) {
                        // A copy never reaches past its own distance, so the
                        // compared range stays strictly behind the cursor.
                        let cap = limit.min(distance as usize);
                        let length = common_prefix(data, from, cursor, cap);
                        if best.map_or(true, |b| length > b.length) {
                            *best = Some(Match {
                                position: candidate,
                                length,
                            });
                        }
                    }
                }
            }
            at = (at + 1) & mask;
        }
    }
}

/// Two-generation match index owned by the encoder.
#[derive(Debug)]
pub struct MatchFinder {
    previous: Generation,
    current: Generation,
    next_rotation: u64,
    window: u64,
    mask: usize,
    probe_count: u64,
}

impl MatchFinder {
    /// Create an index covering back-references up to `max_copy_distance`.
    ///
    /// Each generation holds a power-of-two table of at least
    /// `2 * max_copy_distance` slots, so a generation filled with one entry
    /// per position stays at most half full.
    pub fn new(max_copy_distance: usize) -> MatchFinder {
        debug_assert!(max_copy_distance >= 1 && max_copy_distance <= u16::MAX as usize);
        let table_size = (2 * max_copy_distance).next_power_of_two();
        MatchFinder {
            previous: Generation::new(table_size),
            current: Generation::new(table_size),
            next_rotation: max_copy_distance as u64,
            window: max_copy_distance as u64,
            mask: table_size - 1,
            probe_count: 0,
        }
    }

    /// Total slots examined so far, across lookups and inserts.
    ///
    /// Per-instance instrumentation for tuning and for tests asserting the
    /// probe bound; there is deliberately no global counter.
    pub fn probe_count(&self) -> u64 {
        self.probe_count
    }

    /// Record that the 4-byte sequence hashed to `key` occurs at `position`.
    pub fn insert(&mut self, position: u64, key: u32) {
        self.rotate_to(position);
        let bucket = hashing::murmur3_mix(key) as usize & self.mask;
        let mut probes = 0;
        self.current.insert(position, bucket, self.mask, &mut probes);
        self.probe_count += probes;
    }

    /// Find the longest earlier occurrence of the bytes at `cursor`, then
    /// record the query position itself.
    ///
    /// `key` must be the match key of `buffer.filled()[cursor..cursor + 4]`;
    /// `limit` caps the reported length (the caller passes its token-length
    /// budget and the bytes available past the cursor).  Probes the
    /// previous generation before the current one so matches do not vanish
    /// at a rotation edge.
    pub fn longest_match(
        &mut self,
        buffer: &SlidingBuffer,
        cursor: usize,
        key: u32,
        limit: usize,
    ) -> Option<Match> {
        let position = buffer.start_position() + cursor as u64;
        self.rotate_to(position);
        let bucket = hashing::murmur3_mix(key) as usize & self.mask;
        let mut probes = 0;
        let mut best = None;
        self.previous.scan(
            buffer, cursor, self.window, bucket, self.mask, limit, &mut probes, &mut best,
        );
        self.current.scan(
            buffer, cursor, self.window, bucket, self.mask, limit, &mut probes, &mut best,
        );
        self.current.insert(position, bucket, self.mask, &mut probes);
        self.probe_count += probes;
        best.filter(|m| m.length > 0)
    }

    fn rotate_to(&mut self, position: u64) {
        while position >= self.next_rotation {
            mem::swap(&mut self.previous, &mut self.current);
            let start = self.next_rotation;
            self.current.reset(start);
            self.next_rotation = start + self.window;
        }
    }
}

fn common_prefix(data: &[u8], mut from: usize, mut at: usize, limit: usize) -> usize {
    let mut length = 0;
    while length < limit && data[from] == data[at] {
        from += 1;
        at += 1;
        length += 1;
    }
    length
}
