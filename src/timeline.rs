// src/timeline.rs
//
// Playback position as reported by the engine, and the arithmetic the
// progress bar needs around it.

/// Format seconds as `m:ss`. Fractions are truncated.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Position within the current track, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timeline {
    now: f64,
    end: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, now: f64, end: f64) {
        self.end = end.max(0.0);
        self.now = now.clamp(0.0, self.end);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Position as a fraction of the track, 0.0 - 1.0.
    pub fn progress(&self) -> f64 {
        if self.end > 0.0 {
            (self.now / self.end).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whole-second position has caught up with the whole-second length.
    ///
    /// Tracks shorter than one second never end this way: their truncated
    /// length is 0, which the start position already matches. They rely on
    /// the engine's explicit end event.
    pub fn reached_end(&self) -> bool {
        self.end >= 1.0 && self.now.trunc() >= self.end.trunc()
    }

    /// Seek target for a pointer at `fraction` along the progress bar.
    pub fn scrub_target(&self, fraction: f64) -> f64 {
        if fraction.is_nan() {
            return 0.0;
        }
        (fraction * self.end).clamp(0.0, self.end)
    }

    pub fn now_label(&self) -> String {
        format_time(self.now)
    }

    pub fn end_label(&self) -> String {
        format_time(self.end)
    }
}
