// src/lib.rs
//
// Library entry point for the player page (wasm) and the headless binary.

mod audio_unlock;
mod engine;
mod error;
mod event;
mod palette;
mod player;
mod state;
mod timeline;
mod transport;
mod visualizer;

pub mod sim;

#[cfg(feature = "web")]
pub mod wasm;

// Re-export key types for Rust consumers
pub use audio_unlock::{AudioContextState, AudioOutput, AudioUnlockGate};
pub use engine::PlaybackEngine;
pub use error::{PlayerError, PlayerResult};
pub use event::{EngineEvent, Epoch};
pub use palette::{Color, STARRY_NIGHT, color_for_note};
pub use player::Player;
pub use state::{
    Command, Direction, DisplayMode, InitPolicy, KeyDisplay, KeySlot, LoadStatus, PlaybackState,
    PlayerConfig, PlayerReadback, Screen, ScrubPhase, Track, TrackCatalog, note_name,
};
pub use timeline::{Timeline, format_time};
pub use transport::TransportController;
pub use visualizer::NoteVisualizer;
