// src/state/config.rs
//
// Player configuration, loaded from JSON handed over by the page.

use serde::{Deserialize, Serialize};

use super::{DisplayMode, Track, TrackCatalog};
use crate::error::{PlayerError, PlayerResult};

/// When the playback engine (soundfont + audio context) gets created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPolicy {
    /// Right away, when the player is constructed.
    Eager,
    /// Inside the first play gesture. Required by iOS Safari, which only
    /// lets an AudioContext start from a user gesture.
    #[default]
    GestureDeferred,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub init_policy: InitPolicy,

    /// Track selected before the first play.
    #[serde(default)]
    pub start_index: usize,

    #[serde(default)]
    pub display_mode: DisplayMode,

    pub tracks: Vec<Track>,
}

impl PlayerConfig {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            init_policy: InitPolicy::default(),
            start_index: 0,
            display_mode: DisplayMode::default(),
            tracks,
        }
    }

    pub fn from_json(json: &str) -> PlayerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the config and build the catalog from it.
    pub fn catalog(&self) -> PlayerResult<TrackCatalog> {
        let catalog = TrackCatalog::new(self.tracks.clone())?;
        if self.start_index >= catalog.len() {
            return Err(PlayerError::InvalidStartIndex {
                index: self.start_index,
                count: catalog.len(),
            });
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults() {
        let config = PlayerConfig::from_json(
            r#"{ "tracks": [ { "source": "midi/a.mid", "name": "A" } ] }"#,
        )
        .unwrap();
        assert_eq!(config.init_policy, InitPolicy::GestureDeferred);
        assert_eq!(config.start_index, 0);
        assert_eq!(config.display_mode, DisplayMode::FadeOnRelease);
        assert_eq!(config.catalog().unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_eager() {
        let config = PlayerConfig::from_json(
            r#"{
                "init_policy": "eager",
                "start_index": 1,
                "display_mode": "PersistDimmed",
                "tracks": [
                    { "source": "a.mid", "name": "A" },
                    { "source": "b.mid", "name": "B" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.init_policy, InitPolicy::Eager);
        assert_eq!(config.display_mode, DisplayMode::PersistDimmed);
        assert_eq!(config.catalog().unwrap().get(1).unwrap().name, "B");
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            PlayerConfig::from_json("{ not json"),
            Err(PlayerError::Config(_))
        ));

        let empty = PlayerConfig::new(Vec::new());
        assert!(matches!(empty.catalog(), Err(PlayerError::EmptyCatalog)));

        let mut out_of_range = PlayerConfig::new(vec![Track::new("a.mid", "A")]);
        out_of_range.start_index = 3;
        assert!(matches!(
            out_of_range.catalog(),
            Err(PlayerError::InvalidStartIndex { index: 3, count: 1 })
        ));
    }
}
