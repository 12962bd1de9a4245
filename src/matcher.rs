//! Offset voting across reference songs
//!
//! A query slice `t` whose hash occurs in song `s` at reference slice `r`
//! votes for the alignment `r - t`. The true alignment collects one vote per
//! shared slice, while chance collisions spread over many offsets, so a
//! song's score is the vote count of its best offset.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::Result;
use crate::index::SongIndex;
use crate::models::SongId;

/// Per-query accumulator of `(song, offset) -> votes`
#[derive(Debug, Default)]
pub struct VoteTable {
    votes: HashMap<SongId, HashMap<i64, u32>>,
}

impl VoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one vote for `song_id` aligned at `offset`
    pub fn record(&mut self, song_id: SongId, offset: i64) {
        *self
            .votes
            .entry(song_id)
            .or_default()
            .entry(offset)
            .or_default() += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Number of candidate songs
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// Highest vote count among the offsets of each song, keyed by song id
    pub fn best_scores(&self) -> BTreeMap<SongId, u32> {
        self.votes
            .iter()
            .filter_map(|(&song_id, offsets)| {
                offsets.values().max().map(|&score| (song_id, score))
            })
            .collect()
    }
}

/// Looks up every query hash and votes on the implied alignments
///
/// # Arguments
/// * `hashes` - Query hashes in time order; the position is the query slice
/// * `index` - Reference index to look the hashes up in
///
/// # Returns
/// The filled vote table. Songs without any shared hash are absent.
pub fn vote<I: SongIndex + ?Sized>(hashes: &[u64], index: &I) -> Result<VoteTable> {
    let mut table = VoteTable::new();
    let mut hits = 0usize;

    for (time, &hash) in hashes.iter().enumerate() {
        for point in index.matching_points(hash)? {
            let offset = i64::from(point.time) - time as i64;
            table.record(point.song_id, offset);
            hits += 1;
        }
    }

    debug!(
        "Voted {} index hits from {} query slices across {} songs",
        hits,
        hashes.len(),
        table.len()
    );
    Ok(table)
}
