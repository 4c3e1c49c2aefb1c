// src/transport.rs

use crate::{
    audio_unlock::{AudioOutput, AudioUnlockGate},
    engine::PlaybackEngine,
    error::PlayerError,
    event::Epoch,
    state::{Direction, InitPolicy, LoadStatus, ScrubPhase, Screen, Track, TrackCatalog},
    timeline::Timeline,
    visualizer::NoteVisualizer,
};

pub use crate::state::PlaybackState;

/// Work parked behind the audio unlock gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// Load the current track, if `epoch` is still current.
    Load { epoch: Epoch },
    /// Resume the engine, if `epoch` is still current and we still want to play.
    Resume { epoch: Epoch },
    /// Nothing to do beyond unlocking.
    Wake,
}

//
// ===============================
// MARK: Transport controller
// ===============================
//

/// Owns the track position and the play/pause/stop state, and is the only
/// thing that talks to the playback engine.
///
/// Every track load is stamped with a fresh [`Epoch`]. Engine callbacks
/// carrying an older epoch belong to a track the user already moved away
/// from and are dropped, which also makes end-of-track fire once per load.
///
/// Known gap: a load that never answers keeps the transport in
/// [`LoadStatus::Loading`] forever. There is no timeout; the user can still
/// skip or stop. A load that fails is surfaced through
/// [`last_error`](Self::last_error) and retried by the next play/pause.
pub struct TransportController<E, A> {
    catalog: TrackCatalog,
    engine: E,
    audio: A,
    gate: AudioUnlockGate<Deferred>,
    timeline: Timeline,

    engine_initialized: bool,
    has_started: bool,
    screen: Screen,

    index: usize,
    state: PlaybackState,
    load: LoadStatus,
    epoch: Epoch,

    /// While the progress bar is being dragged: whether the engine was
    /// playing when the drag began.
    scrub_was_playing: Option<bool>,

    last_error: Option<PlayerError>,
}

impl<E, A> TransportController<E, A>
where
    E: PlaybackEngine,
    A: AudioOutput,
{
    pub fn new(
        catalog: TrackCatalog,
        start_index: usize,
        policy: InitPolicy,
        engine: E,
        audio: A,
    ) -> Self {
        let index = start_index.min(catalog.len() - 1);
        let mut transport = Self {
            catalog,
            engine,
            audio,
            gate: AudioUnlockGate::new(),
            timeline: Timeline::new(),
            engine_initialized: false,
            has_started: false,
            screen: Screen::Title,
            index,
            state: PlaybackState::Stopped,
            load: LoadStatus::Idle,
            epoch: Epoch::default(),
            scrub_was_playing: None,
            last_error: None,
        };

        if policy == InitPolicy::Eager {
            transport.ensure_engine();
        }

        transport
    }

    // -------------------------------
    // MARK: User operations
    // -------------------------------

    /// First press of the play button.
    ///
    /// Only the first call does anything, however many handlers fire.
    pub fn start_first_play(&mut self, visualizer: &mut NoteVisualizer) {
        if self.has_started || self.load == LoadStatus::Loading {
            log::debug!("Ignoring repeated first play");
            return;
        }
        self.has_started = true;
        self.screen = Screen::Player;

        self.ensure_engine();
        self.begin_track(visualizer);
    }

    /// Pause when playing, resume otherwise.
    ///
    /// Does nothing until a track has been requested, or while one is still
    /// loading. After a failed load it retries the current track.
    pub fn toggle_play_pause(&mut self, visualizer: &mut NoteVisualizer) {
        match self.load {
            LoadStatus::Idle | LoadStatus::Loading => {
                log::debug!("Play/pause ignored while load is {:?}", self.load);
            }
            LoadStatus::Failed => {
                log::info!("Retrying track {}", self.index);
                self.begin_track(visualizer);
            }
            LoadStatus::Ready => match self.state {
                PlaybackState::Playing => {
                    self.engine.pause();
                    self.state = PlaybackState::Paused;
                    log::debug!("Paused");
                }
                PlaybackState::Paused | PlaybackState::Stopped => {
                    self.state = PlaybackState::Playing;
                    log::debug!("Resuming");
                    self.unlock_then(Deferred::Resume { epoch: self.epoch });
                }
            },
        }
    }

    /// Halt playback and wipe the key display.
    ///
    /// A load in flight still completes, but the track is not started.
    pub fn stop(&mut self, visualizer: &mut NoteVisualizer) {
        if self.load == LoadStatus::Idle {
            return;
        }
        self.state = PlaybackState::Stopped;
        self.scrub_was_playing = None;
        visualizer.clear_all();
        self.engine.stop();
        self.timeline.reset();
        log::debug!("Stopped");
    }

    /// Move to the previous or next track and play it.
    ///
    /// The track name switches immediately, before the load completes.
    pub fn skip(&mut self, direction: Direction, visualizer: &mut NoteVisualizer) {
        if !self.has_started {
            log::debug!("Skip ignored before first play");
            return;
        }
        self.index = self.catalog.wrap(self.index, direction.offset());
        self.begin_track(visualizer);
    }

    /// Drag on the progress bar.
    pub fn scrub(&mut self, phase: ScrubPhase, fraction: f64) {
        if self.load != LoadStatus::Ready || self.state == PlaybackState::Stopped {
            return;
        }

        if phase == ScrubPhase::Begin {
            let was_playing = self.engine.is_playing();
            if was_playing {
                self.engine.pause();
            }
            self.scrub_was_playing = Some(was_playing);
        }

        let target = self.timeline.scrub_target(fraction);
        self.engine.seek(target);
        self.timeline.update(target, self.timeline.end());

        if phase == ScrubPhase::End
            && self.scrub_was_playing.take() == Some(true)
            && self.state == PlaybackState::Playing
        {
            self.engine.resume();
        }
    }

    /// The page came back to the foreground; audio may have been suspended.
    pub fn visibility_restored(&mut self) {
        if self.has_started {
            self.unlock_then(Deferred::Wake);
        }
    }

    // -------------------------------
    // MARK: Engine callbacks
    // -------------------------------

    /// The outstanding audio resume request settled.
    pub fn audio_resumed(&mut self, result: Result<(), String>) {
        for action in self.gate.resume_settled(&mut self.audio, result) {
            self.run(action);
        }
        self.collect_unlock_failure();
    }

    pub fn on_loaded(&mut self, epoch: Epoch) {
        if !self.is_current(epoch) || self.load != LoadStatus::Loading {
            return;
        }
        self.load = LoadStatus::Ready;
        // An unlock failure stays visible; only the load error is resolved.
        if matches!(self.last_error, Some(PlayerError::LoadFailure { .. })) {
            self.last_error = None;
        }
        log::info!("Loaded track {} ({})", self.index, self.track_name());

        if self.state == PlaybackState::Playing {
            self.engine.start();
        }
    }

    pub fn on_load_failed(&mut self, epoch: Epoch, reason: String) {
        if !self.is_current(epoch) || self.load != LoadStatus::Loading {
            return;
        }
        self.load = LoadStatus::Failed;
        let error = PlayerError::LoadFailure {
            index: self.index,
            name: self.track_name().to_string(),
            reason,
        };
        log::warn!("{error}");
        self.last_error = Some(error);
    }

    pub fn on_progress(
        &mut self,
        epoch: Epoch,
        now: f64,
        end: f64,
        visualizer: &mut NoteVisualizer,
    ) {
        if !self.is_current(epoch) {
            return;
        }
        self.timeline.update(now, end);
        if self.timeline.reached_end() && self.scrub_was_playing.is_none() {
            self.on_track_ended(epoch, visualizer);
        }
    }

    /// Advance to the next track once the current one has played out.
    pub fn on_track_ended(&mut self, epoch: Epoch, visualizer: &mut NoteVisualizer) {
        if !self.is_current(epoch)
            || self.load != LoadStatus::Ready
            || self.state == PlaybackState::Stopped
        {
            log::debug!("Ignoring end of track for epoch {epoch}");
            return;
        }
        self.index = self.catalog.wrap(self.index, 1);
        self.begin_track(visualizer);
    }

    /// Whether a note event from `epoch` should reach the key display.
    pub fn accepts_note(&self, epoch: Epoch) -> bool {
        self.is_current(epoch) && self.state != PlaybackState::Stopped
    }

    // -------------------------------
    // MARK: Internals
    // -------------------------------

    fn ensure_engine(&mut self) {
        if !self.engine_initialized {
            log::info!("Initializing playback engine");
            self.engine.initialize();
            self.engine_initialized = true;
        }
    }

    /// Switch to the track at `self.index`: new epoch, empty display, load
    /// queued behind the audio unlock.
    fn begin_track(&mut self, visualizer: &mut NoteVisualizer) {
        visualizer.clear_all();
        self.epoch = self.epoch.next();
        self.timeline.reset();
        self.scrub_was_playing = None;
        self.state = PlaybackState::Playing;
        self.load = LoadStatus::Loading;
        log::info!(
            "Now playing track {} ({}) epoch {}",
            self.index,
            self.track_name(),
            self.epoch
        );

        self.unlock_then(Deferred::Load { epoch: self.epoch });
    }

    fn unlock_then(&mut self, action: Deferred) {
        if let Some(action) = self.gate.ensure_unlocked(&mut self.audio, action) {
            self.run(action);
        }
        self.collect_unlock_failure();
    }

    fn run(&mut self, action: Deferred) {
        match action {
            Deferred::Load { epoch } if self.is_current(epoch) => {
                if let Some(track) = self.catalog.get(self.index) {
                    self.engine.load_track(&track.source, epoch);
                }
            }
            Deferred::Resume { epoch }
                if self.is_current(epoch) && self.state == PlaybackState::Playing =>
            {
                self.engine.resume();
            }
            Deferred::Wake => {}
            stale => log::debug!("Dropping superseded {stale:?}"),
        }
    }

    fn collect_unlock_failure(&mut self) {
        if let Some(reason) = self.gate.take_failure() {
            self.last_error = Some(PlayerError::AudioUnlockFailure(reason));
        }
    }

    #[inline]
    fn is_current(&self, epoch: Epoch) -> bool {
        epoch == self.epoch
    }

    // -------------------------------
    // MARK: Accessors
    // -------------------------------

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.catalog.get(self.index)
    }

    pub fn track_name(&self) -> &str {
        self.current_track().map(|t| t.name.as_str()).unwrap_or("")
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn load_status(&self) -> LoadStatus {
        self.load
    }

    #[inline]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[inline]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn last_error(&self) -> Option<&PlayerError> {
        self.last_error.as_ref()
    }

    /// The last audio unlock attempt failed.
    pub fn is_muted(&self) -> bool {
        self.gate.is_muted()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_unlock::AudioContextState;
    use crate::sim::{EngineCall, SimulatedAudio, SimulatedEngine};

    type Transport = TransportController<SimulatedEngine, SimulatedAudio>;

    fn catalog(n: usize) -> TrackCatalog {
        TrackCatalog::new(
            (0..n)
                .map(|i| Track::new(format!("midi/{i}.mid"), format!("Song {i}")))
                .collect(),
        )
        .unwrap()
    }

    fn transport(n: usize, audio: Option<AudioContextState>) -> Transport {
        TransportController::new(
            catalog(n),
            0,
            InitPolicy::GestureDeferred,
            SimulatedEngine::new(),
            SimulatedAudio::new(audio),
        )
    }

    /// Start and finish loading the first track.
    fn playing(n: usize) -> (Transport, NoteVisualizer) {
        let mut t = transport(n, Some(AudioContextState::Running));
        let mut viz = NoteVisualizer::default();
        t.start_first_play(&mut viz);
        t.on_loaded(t.epoch());
        (t, viz)
    }

    #[test]
    fn test_init_policy() {
        let deferred = transport(1, None);
        assert!(!deferred.engine().initialized);

        let eager = TransportController::new(
            catalog(1),
            0,
            InitPolicy::Eager,
            SimulatedEngine::new(),
            SimulatedAudio::new(None),
        );
        assert!(eager.engine().initialized);
    }

    #[test]
    fn test_first_play_runs_once() {
        let mut t = transport(3, None);
        let mut viz = NoteVisualizer::default();

        t.start_first_play(&mut viz);
        t.start_first_play(&mut viz);

        assert_eq!(t.screen(), Screen::Player);
        assert!(t.engine().initialized);
        assert_eq!(t.engine().load_count(), 1);
        assert_eq!(t.load_status(), LoadStatus::Loading);
        assert_eq!(t.state(), PlaybackState::Playing);

        t.on_loaded(t.epoch());
        assert_eq!(t.load_status(), LoadStatus::Ready);
        assert!(t.engine().playing);
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Start));
    }

    #[test]
    fn test_first_play_waits_for_audio_unlock() {
        let mut t = transport(2, Some(AudioContextState::Suspended));
        let mut viz = NoteVisualizer::default();

        t.start_first_play(&mut viz);
        assert_eq!(t.engine().load_count(), 0);
        assert_eq!(t.audio().resume_requests, 1);

        t.audio_mut().state = Some(AudioContextState::Running);
        t.audio_resumed(Ok(()));
        assert_eq!(t.audio().silent_buffers, 1);
        assert_eq!(t.engine().load_count(), 1);
    }

    #[test]
    fn test_toggle_before_load_is_noop() {
        let mut t = transport(2, None);
        let mut viz = NoteVisualizer::default();

        t.toggle_play_pause(&mut viz);
        assert!(t.engine().calls.is_empty());
        assert_eq!(t.state(), PlaybackState::Stopped);

        t.start_first_play(&mut viz);
        let calls = t.engine().calls.len();
        t.toggle_play_pause(&mut viz);
        assert_eq!(t.engine().calls.len(), calls);
    }

    #[test]
    fn test_toggle_pauses_and_resumes() {
        let (mut t, mut viz) = playing(2);

        t.toggle_play_pause(&mut viz);
        assert_eq!(t.state(), PlaybackState::Paused);
        assert!(!t.engine().playing);

        t.toggle_play_pause(&mut viz);
        assert_eq!(t.state(), PlaybackState::Playing);
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Resume));
    }

    #[test]
    fn test_resume_goes_through_unlock() {
        let (mut t, mut viz) = playing(2);
        t.toggle_play_pause(&mut viz);

        t.audio_mut().state = Some(AudioContextState::Suspended);
        t.toggle_play_pause(&mut viz);
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Pause));

        t.audio_resumed(Ok(()));
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Resume));
    }

    #[test]
    fn test_stop_clears_keys() {
        let (mut t, mut viz) = playing(2);
        viz.on_note_event(60, true);

        t.stop(&mut viz);
        assert_eq!(t.state(), PlaybackState::Stopped);
        assert_eq!(viz.keys().highlighted_count(), 0);
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Stop));
        assert!(!t.accepts_note(t.epoch()));
    }

    #[test]
    fn test_stop_during_load_does_not_start() {
        let mut t = transport(2, None);
        let mut viz = NoteVisualizer::default();
        t.start_first_play(&mut viz);
        t.stop(&mut viz);

        t.on_loaded(t.epoch());
        assert_eq!(t.load_status(), LoadStatus::Ready);
        assert!(!t.engine().playing);
    }

    #[test]
    fn test_skip_wraps_both_ways() {
        let (mut t, mut viz) = playing(5);

        t.skip(Direction::Previous, &mut viz);
        assert_eq!(t.index(), 4);
        assert_eq!(t.track_name(), "Song 4");
        assert_eq!(t.load_status(), LoadStatus::Loading);
        assert_eq!(
            t.engine().last_load(),
            Some(&("midi/4.mid".to_string(), t.epoch()))
        );

        t.skip(Direction::Next, &mut viz);
        assert_eq!(t.index(), 0);
    }

    #[test]
    fn test_skip_before_start_is_noop() {
        let mut t = transport(3, None);
        let mut viz = NoteVisualizer::default();
        t.skip(Direction::Next, &mut viz);
        assert_eq!(t.index(), 0);
        assert!(t.engine().calls.is_empty());
    }

    #[test]
    fn test_skip_invalidates_old_track_events() {
        let (mut t, mut viz) = playing(3);
        let old = t.epoch();

        t.skip(Direction::Next, &mut viz);
        assert!(!t.accepts_note(old));
        assert!(t.accepts_note(t.epoch()));

        // A late load answer for the old track changes nothing.
        t.on_loaded(old);
        assert_eq!(t.load_status(), LoadStatus::Loading);
    }

    #[test]
    fn test_skip_name_updates_before_unlock() {
        let (mut t, mut viz) = playing(3);
        t.audio_mut().state = Some(AudioContextState::Suspended);

        t.skip(Direction::Next, &mut viz);
        assert_eq!(t.track_name(), "Song 1");
        assert_eq!(t.engine().load_count(), 1);

        // Skipped again before the unlock finished: only the newest load runs.
        t.skip(Direction::Next, &mut viz);
        t.audio_resumed(Ok(()));
        assert_eq!(t.engine().load_count(), 2);
        assert_eq!(
            t.engine().last_load(),
            Some(&("midi/2.mid".to_string(), t.epoch()))
        );
    }

    #[test]
    fn test_track_end_advances_once() {
        let (mut t, mut viz) = playing(3);
        let ended = t.epoch();

        t.on_track_ended(ended, &mut viz);
        assert_eq!(t.index(), 1);
        assert_eq!(t.track_name(), "Song 1");
        assert_eq!(t.load_status(), LoadStatus::Loading);

        t.on_track_ended(ended, &mut viz);
        assert_eq!(t.index(), 1);
        assert_eq!(t.engine().load_count(), 2);
    }

    #[test]
    fn test_track_end_from_progress() {
        let (mut t, mut viz) = playing(2);
        let epoch = t.epoch();

        t.on_progress(epoch, 10.0, 95.5, &mut viz);
        assert_eq!(t.index(), 0);
        assert_eq!(t.timeline().now(), 10.0);

        t.on_progress(epoch, 95.2, 95.5, &mut viz);
        t.on_progress(epoch, 95.5, 95.5, &mut viz);
        assert_eq!(t.index(), 1);
        assert_eq!(t.engine().load_count(), 2);
    }

    #[test]
    fn test_last_track_end_wraps() {
        let (mut t, mut viz) = playing(2);
        t.skip(Direction::Next, &mut viz);
        t.on_loaded(t.epoch());

        t.on_track_ended(t.epoch(), &mut viz);
        assert_eq!(t.index(), 0);
    }

    #[test]
    fn test_load_failure_is_surfaced_and_retried() {
        let mut t = transport(2, None);
        let mut viz = NoteVisualizer::default();
        t.start_first_play(&mut viz);

        t.on_load_failed(t.epoch(), "404".into());
        assert_eq!(t.load_status(), LoadStatus::Failed);
        assert_eq!(t.state(), PlaybackState::Playing);
        assert!(matches!(
            t.last_error(),
            Some(PlayerError::LoadFailure { index: 0, .. })
        ));

        t.toggle_play_pause(&mut viz);
        assert_eq!(t.load_status(), LoadStatus::Loading);
        assert_eq!(t.engine().load_count(), 2);

        t.on_loaded(t.epoch());
        assert!(t.last_error().is_none());
    }

    #[test]
    fn test_unlock_failure_recorded() {
        let mut t = transport(1, Some(AudioContextState::Suspended));
        let mut viz = NoteVisualizer::default();
        t.start_first_play(&mut viz);

        t.audio_resumed(Err("NotAllowedError".into()));
        assert!(t.is_muted());
        assert!(matches!(
            t.last_error(),
            Some(PlayerError::AudioUnlockFailure(_))
        ));
        // Playback goes ahead anyway.
        assert_eq!(t.engine().load_count(), 1);
    }

    #[test]
    fn test_unlock_failure_survives_load() {
        let mut t = transport(2, Some(AudioContextState::Suspended));
        let mut viz = NoteVisualizer::default();
        t.start_first_play(&mut viz);
        t.audio_resumed(Err("NotAllowedError".into()));

        t.on_loaded(t.epoch());
        assert_eq!(t.load_status(), LoadStatus::Ready);
        assert!(t.is_muted());
        assert!(matches!(
            t.last_error(),
            Some(PlayerError::AudioUnlockFailure(reason)) if reason == "NotAllowedError"
        ));
    }

    #[test]
    fn test_scrub_pauses_and_resumes() {
        let (mut t, mut viz) = playing(1);
        t.on_progress(t.epoch(), 5.0, 100.0, &mut viz);

        t.scrub(ScrubPhase::Begin, 0.2);
        assert!(!t.engine().playing);
        t.scrub(ScrubPhase::Move, 0.5);
        t.scrub(ScrubPhase::End, 1.4);

        assert!(t.engine().playing);
        assert_eq!(t.timeline().now(), 100.0);
        assert!(t.engine().calls.contains(&EngineCall::Seek(50.0)));
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Resume));
    }

    #[test]
    fn test_pause_during_scrub_wins() {
        let (mut t, mut viz) = playing(1);
        t.on_progress(t.epoch(), 5.0, 100.0, &mut viz);

        t.scrub(ScrubPhase::Begin, 0.2);
        t.toggle_play_pause(&mut viz);
        t.scrub(ScrubPhase::End, 0.4);

        assert_eq!(t.state(), PlaybackState::Paused);
        assert!(!t.engine().playing);
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Seek(40.0)));

        // Next toggle resumes instead of pausing a second time.
        t.toggle_play_pause(&mut viz);
        assert_eq!(t.state(), PlaybackState::Playing);
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Resume));
    }

    #[test]
    fn test_scrub_while_paused_stays_paused() {
        let (mut t, mut viz) = playing(1);
        t.on_progress(t.epoch(), 5.0, 100.0, &mut viz);
        t.toggle_play_pause(&mut viz);

        t.scrub(ScrubPhase::Begin, 0.1);
        t.scrub(ScrubPhase::End, 0.3);
        assert!(!t.engine().playing);
        assert_eq!(t.engine().calls.last(), Some(&EngineCall::Seek(30.0)));
    }

    #[test]
    fn test_visibility_restored_unlocks_after_start() {
        let mut t = transport(1, Some(AudioContextState::Suspended));
        t.visibility_restored();
        assert_eq!(t.audio().resume_requests, 0);

        let mut viz = NoteVisualizer::default();
        t.start_first_play(&mut viz);
        t.audio_resumed(Ok(()));
        t.visibility_restored();
        assert_eq!(t.audio().resume_requests, 2);
    }
}
