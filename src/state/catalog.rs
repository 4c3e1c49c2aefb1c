// src/state/catalog.rs
//
// The fixed, ordered list of tracks the player cycles through.

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, PlayerResult};

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Whatever the playback engine needs to load the track (URL, path, data URI).
    pub source: String,

    /// Name shown in the now-playing label.
    pub name: String,
}

impl Track {
    pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// Immutable, non-empty track list.
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

#[allow(clippy::len_without_is_empty)]
impl TrackCatalog {
    pub fn new(tracks: Vec<Track>) -> PlayerResult<Self> {
        if tracks.is_empty() {
            return Err(PlayerError::EmptyCatalog);
        }
        Ok(Self { tracks })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index reached by stepping `offset` tracks from `index`, wrapping at
    /// both ends.
    pub fn wrap(&self, index: usize, offset: i64) -> usize {
        (index as i64 + offset).rem_euclid(self.tracks.len() as i64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(n: usize) -> TrackCatalog {
        TrackCatalog::new(
            (0..n)
                .map(|i| Track::new(format!("midi/{i}.mid"), format!("Song {i}")))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            TrackCatalog::new(Vec::new()),
            Err(PlayerError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_wrap_is_never_negative() {
        let c = catalog(5);
        assert_eq!(c.wrap(0, -1), 4);
        assert_eq!(c.wrap(4, 1), 0);
        assert_eq!(c.wrap(2, 1), 3);
        assert_eq!(c.wrap(0, -6), 4);
    }

    #[test]
    fn test_single_track_wraps_to_itself() {
        let c = catalog(1);
        assert_eq!(c.wrap(0, 1), 0);
        assert_eq!(c.wrap(0, -1), 0);
    }
}
