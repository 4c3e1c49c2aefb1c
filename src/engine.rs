// src/engine.rs
//
// The external playback engine.
//
// Synthesis, soundfont decoding and MIDI sequencing all live behind this
// trait. The player only issues commands; the engine answers through
// [`EngineEvent`](crate::event::EngineEvent)s fed back into the player.

use crate::event::Epoch;

pub trait PlaybackEngine {
    /// Create the audio context and start fetching the soundfont.
    ///
    /// Called once, either at construction or inside the first play gesture
    /// depending on the [`InitPolicy`](crate::state::InitPolicy).
    fn initialize(&mut self);

    /// Start loading a track. Must be answered with `Loaded` or
    /// `LoadFailed` carrying the same `epoch`, and every later note,
    /// progress and end event for this track must carry it too.
    fn load_track(&mut self, source: &str, epoch: Epoch);

    /// Start the loaded track from the beginning.
    fn start(&mut self);

    fn pause(&mut self);

    /// Continue from the current position.
    fn resume(&mut self);

    /// Halt and rewind to the start.
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Jump to a position, in seconds.
    fn seek(&mut self, seconds: f64);
}
