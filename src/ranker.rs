use std::collections::BTreeMap;

use crate::error::Result;
use crate::index::SongIndex;
use crate::models::{Match, SongId};

/// Turns per-song best scores into matches, highest score first
///
/// Equal scores keep ascending song id order. Name resolution failures are
/// returned as-is and no partial list is produced.
pub fn rank<I: SongIndex + ?Sized>(scores: &BTreeMap<SongId, u32>, index: &I) -> Result<Vec<Match>> {
    let mut matches = scores
        .iter()
        .map(|(&song_id, &score)| -> Result<Match> {
            Ok(Match {
                song_id,
                song_name: index.song_name(song_id)?,
                score,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // stable sort, so ties stay in song id order
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(matches)
}
