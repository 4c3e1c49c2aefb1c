// src/sim.rs
//
// In-process stand-ins for the playback engine and the audio output.
//
// Used by the headless binary and by tests. Nothing here makes sound: the
// engine records the commands it receives and the audio output counts
// resume requests and silent buffers.

use crate::audio_unlock::{AudioContextState, AudioOutput};
use crate::engine::PlaybackEngine;
use crate::event::Epoch;

/// A command received by [`SimulatedEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Initialize,
    Load { source: String, epoch: Epoch },
    Start,
    Pause,
    Resume,
    Stop,
    Seek(f64),
}

#[derive(Debug, Default)]
pub struct SimulatedEngine {
    pub calls: Vec<EngineCall>,
    pub loads: Vec<(String, Epoch)>,
    pub initialized: bool,
    pub playing: bool,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source and epoch of the most recent load request.
    pub fn last_load(&self) -> Option<&(String, Epoch)> {
        self.loads.last()
    }

    pub fn load_count(&self) -> usize {
        self.loads.len()
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn initialize(&mut self) {
        self.initialized = true;
        self.calls.push(EngineCall::Initialize);
    }

    fn load_track(&mut self, source: &str, epoch: Epoch) {
        self.playing = false;
        self.loads.push((source.to_string(), epoch));
        self.calls.push(EngineCall::Load {
            source: source.to_string(),
            epoch,
        });
    }

    fn start(&mut self) {
        self.playing = true;
        self.calls.push(EngineCall::Start);
    }

    fn pause(&mut self) {
        self.playing = false;
        self.calls.push(EngineCall::Pause);
    }

    fn resume(&mut self) {
        self.playing = true;
        self.calls.push(EngineCall::Resume);
    }

    fn stop(&mut self) {
        self.playing = false;
        self.calls.push(EngineCall::Stop);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn seek(&mut self, seconds: f64) {
        self.calls.push(EngineCall::Seek(seconds));
    }
}

#[derive(Debug, Default)]
pub struct SimulatedAudio {
    pub state: Option<AudioContextState>,
    pub resume_requests: usize,
    pub silent_buffers: usize,
}

impl SimulatedAudio {
    pub fn new(state: Option<AudioContextState>) -> Self {
        Self {
            state,
            resume_requests: 0,
            silent_buffers: 0,
        }
    }
}

impl AudioOutput for SimulatedAudio {
    fn state(&self) -> Option<AudioContextState> {
        self.state
    }

    fn request_resume(&mut self) {
        self.resume_requests += 1;
    }

    fn play_silent_buffer(&mut self) {
        self.silent_buffers += 1;
    }
}
