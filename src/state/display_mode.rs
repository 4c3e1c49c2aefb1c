// src/state/display_mode.rs
//
// What happens to a key's colour once it is released.

use serde::{Deserialize, Serialize};

use super::KeyDisplay;

/// Release behaviour for the key display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Released keys lose their colour.
    #[default]
    FadeOnRelease,
    /// Released keys keep their colour at reduced opacity.
    PersistDimmed,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::FadeOnRelease => DisplayMode::PersistDimmed,
            DisplayMode::PersistDimmed => DisplayMode::FadeOnRelease,
        }
    }
}

/// Holder for the current [`DisplayMode`].
///
/// Flipping the mode also repaints the keys so the display matches the new
/// mode immediately: switching to [`DisplayMode::PersistDimmed`] dims every
/// highlighted key, switching to [`DisplayMode::FadeOnRelease`] wipes the
/// whole display.
#[derive(Debug, Clone, Default)]
pub struct DisplayModeToggle {
    mode: DisplayMode,
}

impl DisplayModeToggle {
    pub fn new(mode: DisplayMode) -> Self {
        Self { mode }
    }

    #[inline]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Flip the mode and repaint `keys`. Returns the new mode.
    pub fn toggle(&mut self, keys: &mut KeyDisplay) -> DisplayMode {
        self.mode = self.mode.toggled();
        match self.mode {
            DisplayMode::PersistDimmed => keys.dim_highlighted(),
            DisplayMode::FadeOnRelease => keys.clear_all(),
        }
        self.mode
    }
}
