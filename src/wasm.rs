//! WebAssembly bindings via wasm-bindgen for the player page.
//!
//! This module is only compiled when the `web` feature is enabled.
//!
//! # Usage
//!
//! Build with wasm-pack:
//! ```bash
//! wasm-pack build --target web --features web
//! ```
//!
//! # JavaScript Example
//!
//! ```javascript
//! import init, { starry_night_init, StarryNightPlayer } from './starrynight.js';
//!
//! await init();
//! starry_night_init();
//!
//! // `engine` wraps MIDI.Player, `audio` wraps the WebAudio context.
//! const player = new StarryNightPlayer(JSON.stringify(config), engine, audio);
//!
//! playButton.onclick = () => { player.press_play(); render(); };
//! MIDI.Player.addListener((data) => {
//!   player.on_midi(engine.epoch, data.message, data.note);
//!   render();
//! });
//! ```

use wasm_bindgen::prelude::*;

use crate::audio_unlock::{AudioContextState, AudioOutput};
use crate::engine::PlaybackEngine;
use crate::event::{EngineEvent, Epoch};
use crate::player::Player;
use crate::state::{
    Command, Direction, DisplayMode, KEY_COUNT, LOWEST_NOTE, PlayerConfig, ScrubPhase, note_name,
};

// ═══════════════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the wasm module. Call this once before using any other functions.
/// Sets up panic hooks and console logging.
#[wasm_bindgen]
pub fn starry_night_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

/// Number of keys on the display.
#[wasm_bindgen]
pub fn key_count() -> u32 {
    KEY_COUNT as u32
}

/// Label for key `index`, e.g. `A0` for index 0.
#[wasm_bindgen]
pub fn key_label(index: u32) -> String {
    note_name(LOWEST_NOTE.saturating_add(index.min(KEY_COUNT as u32 - 1) as u8))
}

// ═══════════════════════════════════════════════════════════════════════════
// Page-side collaborators
// ═══════════════════════════════════════════════════════════════════════════

#[wasm_bindgen]
extern "C" {
    /// Page object wrapping the MIDI playback library.
    ///
    /// `loadTrack` must later call `on_loaded` / `on_load_failed` with the
    /// same epoch, and tag every note/progress/end callback with it.
    pub type JsMidiEngine;

    #[wasm_bindgen(method)]
    fn initialize(this: &JsMidiEngine);

    #[wasm_bindgen(method, js_name = loadTrack)]
    fn load_track(this: &JsMidiEngine, source: &str, epoch: u32);

    #[wasm_bindgen(method)]
    fn start(this: &JsMidiEngine);

    #[wasm_bindgen(method)]
    fn pause(this: &JsMidiEngine);

    #[wasm_bindgen(method)]
    fn resume(this: &JsMidiEngine);

    #[wasm_bindgen(method)]
    fn stop(this: &JsMidiEngine);

    #[wasm_bindgen(method, js_name = isPlaying)]
    fn is_playing(this: &JsMidiEngine) -> bool;

    #[wasm_bindgen(method)]
    fn seek(this: &JsMidiEngine, seconds: f64);

    /// Page object wrapping the WebAudio context.
    ///
    /// `requestResume` must later call `on_audio_resumed`.
    pub type JsAudioOutput;

    /// `"suspended"`, `"running"`, `"closed"`, or `undefined` before the
    /// context exists.
    #[wasm_bindgen(method)]
    fn state(this: &JsAudioOutput) -> Option<String>;

    #[wasm_bindgen(method, js_name = requestResume)]
    fn request_resume(this: &JsAudioOutput);

    #[wasm_bindgen(method, js_name = playSilentBuffer)]
    fn play_silent_buffer(this: &JsAudioOutput);
}

struct PageEngine(JsMidiEngine);

impl PlaybackEngine for PageEngine {
    fn initialize(&mut self) {
        self.0.initialize();
    }

    fn load_track(&mut self, source: &str, epoch: Epoch) {
        self.0.load_track(source, epoch.0);
    }

    fn start(&mut self) {
        self.0.start();
    }

    fn pause(&mut self) {
        self.0.pause();
    }

    fn resume(&mut self) {
        self.0.resume();
    }

    fn stop(&mut self) {
        self.0.stop();
    }

    fn is_playing(&self) -> bool {
        self.0.is_playing()
    }

    fn seek(&mut self, seconds: f64) {
        self.0.seek(seconds);
    }
}

struct PageAudio(JsAudioOutput);

impl AudioOutput for PageAudio {
    fn state(&self) -> Option<AudioContextState> {
        match self.0.state().as_deref() {
            Some("suspended") => Some(AudioContextState::Suspended),
            Some("running") => Some(AudioContextState::Running),
            Some("closed") => Some(AudioContextState::Closed),
            Some(other) => {
                log::warn!("Unknown audio context state {other:?}");
                None
            }
            None => None,
        }
    }

    fn request_resume(&mut self) {
        self.0.request_resume();
    }

    fn play_silent_buffer(&mut self) {
        self.0.play_silent_buffer();
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Player
// ═══════════════════════════════════════════════════════════════════════════

/// The player, as seen from the page.
#[wasm_bindgen]
pub struct StarryNightPlayer {
    inner: Player<PageEngine, PageAudio>,
}

#[wasm_bindgen]
impl StarryNightPlayer {
    /// Create a player from a JSON config:
    /// `{ "init_policy": "gesture_deferred", "tracks": [{ "source": "...", "name": "..." }] }`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        engine: JsMidiEngine,
        audio: JsAudioOutput,
    ) -> Result<StarryNightPlayer, JsValue> {
        let config = PlayerConfig::from_json(config_json).map_err(to_js)?;
        let inner =
            Player::new(&config, PageEngine(engine), PageAudio(audio)).map_err(to_js)?;
        Ok(Self { inner })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User input
    // ─────────────────────────────────────────────────────────────────────────

    pub fn press_play(&mut self) {
        self.inner.press_play();
    }

    pub fn toggle_play_pause(&mut self) {
        self.inner.toggle_play_pause();
    }

    pub fn stop(&mut self) {
        self.inner.stop();
    }

    /// `-1` for the previous track, `+1` for the next one.
    pub fn skip(&mut self, direction: i32) {
        if let Some(direction) = Direction::from_offset(direction) {
            self.inner.skip(direction);
        }
    }

    /// Returns true when released keys now persist.
    pub fn toggle_mode(&mut self) -> bool {
        self.inner.toggle_mode() == DisplayMode::PersistDimmed
    }

    pub fn toggle_info(&mut self) {
        self.inner.send(Command::ToggleInfo);
    }

    pub fn visibility_restored(&mut self) {
        self.inner.send(Command::VisibilityRestored);
    }

    /// Returns true when the key was handled (the page should call
    /// `preventDefault`).
    pub fn key_down(&mut self, code: u32) -> bool {
        match Command::from_key_code(code) {
            Some(command) => {
                self.inner.send(command);
                true
            }
            None => false,
        }
    }

    /// Progress bar drag. `phase` is `"down"`, `"move"` or `"up"`.
    pub fn scrub(&mut self, phase: &str, fraction: f64) {
        let phase = match phase {
            "down" => ScrubPhase::Begin,
            "up" => ScrubPhase::End,
            _ => ScrubPhase::Move,
        };
        self.inner.send(Command::Scrub { phase, fraction });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Engine callbacks
    // ─────────────────────────────────────────────────────────────────────────

    pub fn on_midi(&mut self, epoch: u32, status: u8, note: u8) {
        if let Some(event) = EngineEvent::from_midi(Epoch(epoch), status, note) {
            self.inner.handle_event(event);
        }
    }

    pub fn on_loaded(&mut self, epoch: u32) {
        self.inner.handle_event(EngineEvent::Loaded {
            epoch: Epoch(epoch),
        });
    }

    pub fn on_load_failed(&mut self, epoch: u32, reason: String) {
        self.inner.handle_event(EngineEvent::LoadFailed {
            epoch: Epoch(epoch),
            reason,
        });
    }

    pub fn on_progress(&mut self, epoch: u32, now: f64, end: f64) {
        self.inner.handle_event(EngineEvent::Progress {
            epoch: Epoch(epoch),
            now,
            end,
        });
    }

    pub fn on_ended(&mut self, epoch: u32) {
        self.inner.handle_event(EngineEvent::Ended {
            epoch: Epoch(epoch),
        });
    }

    pub fn on_audio_resumed(&mut self, ok: bool, reason: Option<String>) {
        let result = if ok {
            Ok(())
        } else {
            Err(reason.unwrap_or_else(|| "resume rejected".to_string()))
        };
        self.inner.audio_resumed(result);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Readback
    // ─────────────────────────────────────────────────────────────────────────

    /// Epoch of the current load.
    pub fn current_epoch(&self) -> u32 {
        self.inner.transport().epoch().0
    }

    pub fn track_name(&self) -> String {
        self.inner.transport().track_name().to_string()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.transport().engine().is_playing()
    }

    /// Full player readback as JSON.
    pub fn readback_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.readback()).map_err(to_js)
    }

    /// All 88 keys as JSON.
    pub fn keys_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.keys()).map_err(to_js)
    }

    /// CSS colour of key `index`, or undefined when it has none.
    pub fn key_color(&self, index: usize) -> Option<String> {
        self.inner
            .keys()
            .slot(index)
            .and_then(|s| s.color)
            .map(|c| c.to_hex())
    }

    pub fn key_opacity(&self, index: usize) -> f32 {
        self.inner.keys().slot(index).map(|s| s.opacity).unwrap_or(0.0)
    }

    pub fn key_highlighted(&self, index: usize) -> bool {
        self.inner
            .keys()
            .slot(index)
            .map(|s| s.highlighted)
            .unwrap_or(false)
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
