// src/error.rs
//
// Error taxonomy for the player.
//
// Only construction can fail hard. Everything that goes wrong while playing
// is absorbed by the transport and kept around as the last error so the
// page can show it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// The playback engine could not load a track.
    #[error("track {index} ({name}) failed to load: {reason}")]
    LoadFailure {
        index: usize,
        name: String,
        reason: String,
    },

    /// The audio output refused to resume. Playback continues muted.
    #[error("audio output could not be unlocked: {0}")]
    AudioUnlockFailure(String),

    /// A note outside A0..C8 has no key on the display.
    #[error("note {0} has no key on the display")]
    OutOfRangeNote(u8),

    #[error("track catalog is empty")]
    EmptyCatalog,

    #[error("start index {index} is out of range for {count} tracks")]
    InvalidStartIndex { index: usize, count: usize },

    #[error("invalid player config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type PlayerResult<T> = Result<T, PlayerError>;
