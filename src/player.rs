// src/player.rs
//
// Top-level player.
//
// Routes page commands and engine events to the transport and the key
// display, and assembles the readback the page renders from.

use crate::{
    audio_unlock::AudioOutput,
    engine::PlaybackEngine,
    error::PlayerResult,
    event::EngineEvent,
    state::{Command, Direction, DisplayMode, KeyDisplay, PlayerConfig, PlayerReadback},
    transport::TransportController,
    visualizer::NoteVisualizer,
};

/// The player: transport, key display and the bits of page state that
/// belong to neither.
///
/// Everything runs on one thread. The page calls [`send`](Self::send) for
/// user input, [`handle_event`](Self::handle_event) for engine callbacks and
/// [`audio_resumed`](Self::audio_resumed) when an audio resume settles.
pub struct Player<E, A> {
    transport: TransportController<E, A>,
    visualizer: NoteVisualizer,
    info_open: bool,
}

impl<E, A> Player<E, A>
where
    E: PlaybackEngine,
    A: AudioOutput,
{
    pub fn new(config: &PlayerConfig, engine: E, audio: A) -> PlayerResult<Self> {
        let catalog = config.catalog()?;
        log::info!(
            "Player created with {} tracks ({:?})",
            catalog.len(),
            config.init_policy
        );

        Ok(Self {
            transport: TransportController::new(
                catalog,
                config.start_index,
                config.init_policy,
                engine,
                audio,
            ),
            visualizer: NoteVisualizer::new(config.display_mode),
            info_open: false,
        })
    }

    // ═════════════════════════════════════════════════════════════════
    // Commands
    // ═════════════════════════════════════════════════════════════════

    pub fn send(&mut self, command: Command) {
        log::trace!("Command {command:?}");
        match command {
            Command::PressPlay => {
                self.transport.start_first_play(&mut self.visualizer);
            }

            Command::TogglePlayPause => {
                self.transport.toggle_play_pause(&mut self.visualizer);
            }

            Command::Stop => {
                self.transport.stop(&mut self.visualizer);
            }

            Command::Skip { direction } => {
                self.transport.skip(direction, &mut self.visualizer);
            }

            Command::Scrub { phase, fraction } => {
                self.transport.scrub(phase, fraction);
            }

            Command::ToggleDisplayMode => {
                self.visualizer.toggle_mode();
            }

            Command::ToggleInfo => {
                self.info_open = !self.info_open;
            }

            Command::VisibilityRestored => {
                self.transport.visibility_restored();
            }
        }
    }

    pub fn press_play(&mut self) {
        self.send(Command::PressPlay);
    }

    pub fn toggle_play_pause(&mut self) {
        self.send(Command::TogglePlayPause);
    }

    pub fn stop(&mut self) {
        self.send(Command::Stop);
    }

    pub fn skip(&mut self, direction: Direction) {
        self.send(Command::Skip { direction });
    }

    pub fn toggle_mode(&mut self) -> DisplayMode {
        self.send(Command::ToggleDisplayMode);
        self.visualizer.mode()
    }

    // ═════════════════════════════════════════════════════════════════
    // Engine / platform callbacks
    // ═════════════════════════════════════════════════════════════════

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Loaded { epoch } => {
                self.transport.on_loaded(epoch);
            }

            EngineEvent::LoadFailed { epoch, reason } => {
                self.transport.on_load_failed(epoch, reason);
            }

            EngineEvent::Note { epoch, note, on } => {
                if self.transport.accepts_note(epoch) {
                    self.visualizer.on_note_event(note, on);
                } else {
                    log::trace!("Dropping note {note} from epoch {epoch}");
                }
            }

            EngineEvent::Progress { epoch, now, end } => {
                self.transport
                    .on_progress(epoch, now, end, &mut self.visualizer);
            }

            EngineEvent::Ended { epoch } => {
                self.transport.on_track_ended(epoch, &mut self.visualizer);
            }
        }
    }

    pub fn audio_resumed(&mut self, result: Result<(), String>) {
        self.transport.audio_resumed(result);
    }

    // ═════════════════════════════════════════════════════════════════
    // Readback
    // ═════════════════════════════════════════════════════════════════

    pub fn readback(&self) -> PlayerReadback {
        let timeline = self.transport.timeline();
        PlayerReadback {
            screen: self.transport.screen(),
            track_index: self.transport.index(),
            track_name: self.transport.track_name().to_string(),
            playback_state: self.transport.state(),
            load_status: self.transport.load_status(),
            display_mode: self.visualizer.mode(),
            info_open: self.info_open,
            audio_muted: self.transport.is_muted(),
            progress: timeline.progress(),
            now_label: timeline.now_label(),
            end_label: timeline.end_label(),
            last_error: self.transport.last_error().map(|e| e.to_string()),
        }
    }

    pub fn keys(&self) -> &KeyDisplay {
        self.visualizer.keys()
    }

    pub fn transport(&self) -> &TransportController<E, A> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut TransportController<E, A> {
        &mut self.transport
    }
}
