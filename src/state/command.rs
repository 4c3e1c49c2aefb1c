// src/state/command.rs
//
// User intents, from the page to the player.
//
// Commands are the ONLY way the page can change player state. Every button,
// key binding and lifecycle hook maps onto exactly one of them.

use serde::{Deserialize, Serialize};

/// Key code of the space bar.
pub const KEY_SPACE: u32 = 32;

/// Which way a skip goes through the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Step applied to the track index.
    #[inline]
    pub fn offset(self) -> i64 {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }

    /// Map a signed step (`-1` / `+1`) to a direction. Zero has none.
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset.signum() {
            -1 => Some(Direction::Previous),
            1 => Some(Direction::Next),
            _ => None,
        }
    }
}

/// Stage of a drag on the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrubPhase {
    Begin,
    Move,
    End,
}

/// A command from the page to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // ═══════════════════════════════════════════
    // Transport
    // ═══════════════════════════════════════════
    /// The big play button on the title screen.
    PressPlay,

    /// Play/pause button (and space bar).
    TogglePlayPause,

    Stop,

    Skip { direction: Direction },

    /// Drag on the progress bar. `fraction` is the pointer position along
    /// the bar, 0.0 at the left edge and 1.0 at the right.
    Scrub { phase: ScrubPhase, fraction: f64 },

    // ═══════════════════════════════════════════
    // Display
    // ═══════════════════════════════════════════
    ToggleDisplayMode,

    ToggleInfo,

    // ═══════════════════════════════════════════
    // Page lifecycle
    // ═══════════════════════════════════════════
    /// The page became visible again (e.g. after an iOS app switch).
    VisibilityRestored,
}

impl Command {
    /// Keyboard shortcut lookup.
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            KEY_SPACE => Some(Command::TogglePlayPause),
            _ => None,
        }
    }
}
