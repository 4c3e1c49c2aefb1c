// src/state/readback.rs
//
// Read-only player state for the page to render.

use serde::Serialize;

use super::DisplayMode;

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Progress of the most recent track load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Waiting on the engine (or on the audio unlock that precedes the load).
    Loading,
    Ready,
    /// The engine reported a failure. The next explicit play retries.
    Failed,
}

/// Which page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Screen {
    /// Title and big play button.
    #[default]
    Title,
    /// Key display and transport controls.
    Player,
}

/// Snapshot of everything the page shows besides the keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReadback {
    pub screen: Screen,
    pub track_index: usize,
    pub track_name: String,
    pub playback_state: PlaybackState,
    pub load_status: LoadStatus,
    pub display_mode: DisplayMode,
    pub info_open: bool,

    /// Last unlock attempt failed; engine commands may be silent.
    pub audio_muted: bool,

    /// Playback position, 0.0 - 1.0.
    pub progress: f64,
    pub now_label: String,
    pub end_label: String,

    pub last_error: Option<String>,
}
