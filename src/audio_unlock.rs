// src/audio_unlock.rs
//
// Gate in front of every playback command.
//
// Browsers (iOS Safari in particular) keep the audio context suspended until
// a user gesture resumes it, and even then output stays silent until
// something has actually been played through the graph. The gate resumes a
// suspended context, plays a one-sample silent buffer once the resume
// succeeds, and only then releases the actions queued behind it.

/// State of the platform audio context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioContextState {
    Suspended,
    Running,
    Closed,
}

/// The platform audio output.
pub trait AudioOutput {
    /// `None` while no context has been created yet.
    fn state(&self) -> Option<AudioContextState>;

    /// Ask the context to resume. The outcome must be reported back through
    /// [`AudioUnlockGate::resume_settled`].
    fn request_resume(&mut self);

    /// Play a single silent sample through the output graph.
    fn play_silent_buffer(&mut self);
}

/// Queues actions until the audio output is able to play.
///
/// At most one resume request is outstanding at any time; callers arriving
/// while it is in flight join the queue instead of issuing another one.
#[derive(Debug)]
pub struct AudioUnlockGate<T> {
    resuming: bool,
    waiting: Vec<T>,
    muted: bool,
    failure: Option<String>,
}

impl<T> AudioUnlockGate<T> {
    pub fn new() -> Self {
        Self {
            resuming: false,
            waiting: Vec::new(),
            muted: false,
            failure: None,
        }
    }

    /// Run `action` once the output is unlocked.
    ///
    /// Returns the action back when it can run right away (no context yet,
    /// context running, or context closed for good). Returns `None` when it
    /// was queued behind a resume; it comes back out of
    /// [`resume_settled`](Self::resume_settled).
    pub fn ensure_unlocked<A>(&mut self, output: &mut A, action: T) -> Option<T>
    where
        A: AudioOutput + ?Sized,
    {
        match output.state() {
            None | Some(AudioContextState::Running) => Some(action),
            Some(AudioContextState::Closed) => {
                log::warn!("Audio context is closed; continuing without sound");
                self.muted = true;
                self.failure = Some("audio context is closed".to_string());
                Some(action)
            }
            Some(AudioContextState::Suspended) => {
                self.waiting.push(action);
                if !self.resuming {
                    log::debug!("Resuming suspended audio context");
                    self.resuming = true;
                    output.request_resume();
                }
                None
            }
        }
    }

    /// Report the outcome of the outstanding resume request.
    ///
    /// Returns the queued actions in the order they were queued. They are
    /// released on failure too: playback goes ahead muted rather than not at
    /// all.
    pub fn resume_settled<A>(&mut self, output: &mut A, result: Result<(), String>) -> Vec<T>
    where
        A: AudioOutput + ?Sized,
    {
        if !self.resuming {
            log::warn!("Ignoring audio resume result with no resume outstanding");
            return Vec::new();
        }
        self.resuming = false;

        match result {
            Ok(()) => {
                output.play_silent_buffer();
                self.muted = false;
            }
            Err(reason) => {
                log::warn!("Audio context resume failed: {reason}");
                self.muted = true;
                self.failure = Some(reason);
            }
        }

        std::mem::take(&mut self.waiting)
    }

    /// The last unlock attempt failed.
    #[inline]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Failure reason of the last unlock attempt, if not yet collected.
    pub fn take_failure(&mut self) -> Option<String> {
        self.failure.take()
    }
}

impl<T> Default for AudioUnlockGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedAudio;

    #[test]
    fn test_no_context_runs_immediately() {
        let mut audio = SimulatedAudio::new(None);
        let mut gate = AudioUnlockGate::new();

        assert_eq!(gate.ensure_unlocked(&mut audio, 1), Some(1));
        assert_eq!(audio.resume_requests, 0);
    }

    #[test]
    fn test_running_context_runs_immediately() {
        let mut audio = SimulatedAudio::new(Some(AudioContextState::Running));
        let mut gate = AudioUnlockGate::new();

        assert_eq!(gate.ensure_unlocked(&mut audio, "play"), Some("play"));
        assert_eq!(audio.resume_requests, 0);
        assert_eq!(audio.silent_buffers, 0);
    }

    #[test]
    fn test_single_resume_outstanding() {
        let mut audio = SimulatedAudio::new(Some(AudioContextState::Suspended));
        let mut gate = AudioUnlockGate::new();

        assert_eq!(gate.ensure_unlocked(&mut audio, 1), None);
        assert_eq!(gate.ensure_unlocked(&mut audio, 2), None);
        assert_eq!(audio.resume_requests, 1);

        audio.state = Some(AudioContextState::Running);
        let ready = gate.resume_settled(&mut audio, Ok(()));
        assert_eq!(ready, vec![1, 2]);
        assert_eq!(audio.silent_buffers, 1);
        assert!(!gate.is_muted());

        // A stray second settlement must not replay the silent buffer.
        assert!(gate.resume_settled(&mut audio, Ok(())).is_empty());
        assert_eq!(audio.silent_buffers, 1);
    }

    #[test]
    fn test_failed_resume_still_releases_actions() {
        let mut audio = SimulatedAudio::new(Some(AudioContextState::Suspended));
        let mut gate = AudioUnlockGate::new();

        assert_eq!(gate.ensure_unlocked(&mut audio, 'a'), None);
        let ready = gate.resume_settled(&mut audio, Err("NotAllowedError".into()));

        assert_eq!(ready, vec!['a']);
        assert_eq!(audio.silent_buffers, 0);
        assert!(gate.is_muted());
        assert_eq!(gate.take_failure().as_deref(), Some("NotAllowedError"));
        assert_eq!(gate.take_failure(), None);

        // Next call is allowed to try again.
        assert_eq!(gate.ensure_unlocked(&mut audio, 'b'), None);
        assert_eq!(audio.resume_requests, 2);
    }

    #[test]
    fn test_closed_context_degrades() {
        let mut audio = SimulatedAudio::new(Some(AudioContextState::Closed));
        let mut gate = AudioUnlockGate::new();

        assert_eq!(gate.ensure_unlocked(&mut audio, ()), Some(()));
        assert!(gate.is_muted());
        assert!(gate.take_failure().is_some());
        assert_eq!(audio.resume_requests, 0);
    }
}
