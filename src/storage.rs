use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FingerprintError, Result};
use crate::index::SongIndex;
use crate::models::{DataPoint, SongId, SongInfo};

/// In-memory reference index
///
/// # Storage Structure
/// - Song metadata is kept per song id, ids are assigned from 1 upward
/// - Each hash maps to every (song id, time slice) it occurs at
///
/// The whole index can be snapshotted to JSON and loaded back.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MemoryIndex {
    songs: BTreeMap<SongId, SongInfo>,
    points: HashMap<u64, Vec<DataPoint>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a song's metadata and fingerprint
    ///
    /// # Arguments
    /// * `song_info` - Song metadata (name, artist)
    /// * `hashes` - Per-slice hashes in time order, as produced by
    ///   `AudioFingerprinter::generate_fingerprint`
    ///
    /// # Returns
    /// The id assigned to the song. Nothing is stored if the song has more
    /// slices than a `DataPoint` time can address.
    pub fn store_song(&mut self, song_info: SongInfo, hashes: &[u64]) -> Result<SongId> {
        let slices = slice_count(hashes.len())?;
        let song_id = self.songs.keys().next_back().map_or(1, |last| last + 1);

        for (time, &hash) in (0..slices).zip(hashes) {
            self.points
                .entry(hash)
                .or_default()
                .push(DataPoint { song_id, time });
        }

        info!(
            "Stored song '{}' by '{}' with ID: {} ({} hashes)",
            song_info.name,
            song_info.singer,
            song_id,
            hashes.len()
        );
        self.songs.insert(song_id, song_info);
        Ok(song_id)
    }

    pub fn song(&self, song_id: SongId) -> Option<&SongInfo> {
        self.songs.get(&song_id)
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    /// Number of distinct hashes in the index
    pub fn hash_count(&self) -> usize {
        self.points.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes a JSON snapshot of the index to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        info!(
            "Saved index with {} songs to {}",
            self.song_count(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Reads an index snapshot written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let index = Self::from_json(&fs::read_to_string(path.as_ref())?)?;
        info!(
            "Loaded index with {} songs from {}",
            index.song_count(),
            path.as_ref().display()
        );
        Ok(index)
    }
}

impl SongIndex for MemoryIndex {
    fn matching_points(&self, hash: u64) -> Result<Vec<DataPoint>> {
        Ok(self.points.get(&hash).cloned().unwrap_or_default())
    }

    fn song_name(&self, song_id: SongId) -> Result<String> {
        self.songs
            .get(&song_id)
            .map(|info| info.name.clone())
            .ok_or(FingerprintError::UnknownSong(song_id))
    }
}

/// Number of slices of a song, checked against the `u32` time of a `DataPoint`
fn slice_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        FingerprintError::Index(format!(
            "{len} time slices exceed the {} a reference song can hold",
            u32::MAX
        ))
    })
}

#[cfg(feature = "redis")]
pub use self::redis_index::RedisIndex;

#[cfg(feature = "redis")]
mod redis_index {
    use redis::{Client, Commands};
    use tracing::info;

    use crate::error::{FingerprintError, Result};
    use crate::index::SongIndex;
    use crate::models::{DataPoint, SongId, SongInfo};

    /// Reference index kept in Redis
    ///
    /// # Storage Structure
    /// - `song_counter` hands out song ids
    /// - Song metadata is stored as JSON in "song:{id}" keys
    /// - Each "hash:{hash}" key is a list of packed `DataPoint`s
    pub struct RedisIndex {
        client: Client,
    }

    impl RedisIndex {
        /// Creates a new RedisIndex instance
        ///
        /// # Arguments
        /// * `redis_url` - URL of the Redis server (e.g., "redis://127.0.0.1/")
        pub fn new(redis_url: &str) -> Result<Self> {
            let client = Client::open(redis_url)?;
            Ok(RedisIndex { client })
        }

        /// Stores a song's metadata and per-slice hashes, returning its id
        pub fn store_song(&self, song_info: &SongInfo, hashes: &[u64]) -> Result<SongId> {
            let mut conn = self.client.get_connection()?;

            let slices = super::slice_count(hashes.len())?;
            let song_id: SongId = conn.incr("song_counter", 1)?;
            let song_json = serde_json::to_string(song_info)?;
            let _: () = conn.set(format!("song:{song_id}"), song_json)?;

            let mut pipe = redis::pipe();
            for (time, hash) in (0..slices).zip(hashes) {
                let point = DataPoint { song_id, time };
                pipe.rpush(format!("hash:{hash}"), point.pack()).ignore();
            }
            let _: () = pipe.query(&mut conn)?;

            info!(
                "Stored song '{}' by '{}' with ID: {}",
                song_info.name, song_info.singer, song_id
            );
            Ok(song_id)
        }
    }

    impl SongIndex for RedisIndex {
        fn matching_points(&self, hash: u64) -> Result<Vec<DataPoint>> {
            let mut conn = self.client.get_connection()?;
            let packed: Vec<u64> = conn.lrange(format!("hash:{hash}"), 0, -1)?;
            Ok(packed.into_iter().map(DataPoint::unpack).collect())
        }

        fn song_name(&self, song_id: SongId) -> Result<String> {
            let mut conn = self.client.get_connection()?;
            let song_json: Option<String> = conn.get(format!("song:{song_id}"))?;
            let song_json = song_json.ok_or(FingerprintError::UnknownSong(song_id))?;
            let song_info: SongInfo = serde_json::from_str(&song_json)?;
            Ok(song_info.name)
        }
    }
}
