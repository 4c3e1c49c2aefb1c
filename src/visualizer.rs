// src/visualizer.rs
//
// Note events -> key colours.

use crate::palette::color_for_note;
use crate::state::{DisplayMode, DisplayModeToggle, KeyDisplay};

/// Owns the key display and the display mode, and repaints keys as note
/// events arrive.
#[derive(Debug, Clone, Default)]
pub struct NoteVisualizer {
    keys: KeyDisplay,
    mode: DisplayModeToggle,
}

impl NoteVisualizer {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            keys: KeyDisplay::new(),
            mode: DisplayModeToggle::new(mode),
        }
    }

    /// Apply a note-on or note-off.
    ///
    /// Notes without a key on the display are ignored. Returns whether a key
    /// was repainted.
    pub fn on_note_event(&mut self, note: u8, is_note_on: bool) -> bool {
        let index = match KeyDisplay::slot_for_note(note) {
            Ok(index) => index,
            Err(e) => {
                log::trace!("{e}");
                return false;
            }
        };
        let mode = self.mode.mode();
        let Some(slot) = self.keys.slot_mut(index) else {
            return false;
        };

        if is_note_on {
            slot.press(color_for_note(note), mode);
        } else {
            slot.release(mode);
        }
        true
    }

    /// Reset every key to idle.
    pub fn clear_all(&mut self) {
        self.keys.clear_all();
    }

    /// Flip the display mode, repainting the keys to match.
    pub fn toggle_mode(&mut self) -> DisplayMode {
        let mode = self.mode.toggle(&mut self.keys);
        log::debug!("Display mode is now {mode:?}");
        mode
    }

    #[inline]
    pub fn mode(&self) -> DisplayMode {
        self.mode.mode()
    }

    #[inline]
    pub fn keys(&self) -> &KeyDisplay {
        &self.keys
    }
}
