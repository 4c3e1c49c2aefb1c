// src/state/keys.rs
//
// The 88-key colour display.
//
// Slot `i` shows piano key `i + 21` (A0 .. C8). Slots live as long as the
// player and are only ever repainted, never removed.

use serde::{Serialize, Serializer};

use super::DisplayMode;
use crate::error::PlayerError;
use crate::palette::Color;

/// Number of keys on the display.
pub const KEY_COUNT: usize = 88;

/// Note number shown by slot 0.
pub const LOWEST_NOTE: u8 = 21;

/// Note number shown by the last slot.
pub const HIGHEST_NOTE: u8 = LOWEST_NOTE + KEY_COUNT as u8 - 1;

/// Opacity of an idle key.
pub const DEFAULT_OPACITY: f32 = 0.75;

/// Opacity of a released key in [`DisplayMode::PersistDimmed`].
pub const DIM_OPACITY: f32 = 0.6;

/// Opacity of a sounding key in [`DisplayMode::PersistDimmed`].
pub const FULL_OPACITY: f32 = 1.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Key label for a note number, e.g. `A0`, `C4`, `Bb6`.
pub fn note_name(note: u8) -> String {
    let octave = i32::from(note) / 12 - 1;
    format!("{}{}", NOTE_NAMES[usize::from(note % 12)], octave)
}

/// Visual state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeySlot {
    pub color: Option<Color>,
    pub highlighted: bool,
    pub opacity: f32,
}

impl KeySlot {
    pub const fn new() -> Self {
        Self {
            color: None,
            highlighted: false,
            opacity: DEFAULT_OPACITY,
        }
    }

    /// Note-on. Always overwrites whatever the slot showed before.
    pub fn press(&mut self, color: Color, mode: DisplayMode) {
        self.color = Some(color);
        self.highlighted = true;
        if mode == DisplayMode::PersistDimmed {
            self.opacity = FULL_OPACITY;
        }
    }

    /// Note-off.
    pub fn release(&mut self, mode: DisplayMode) {
        match mode {
            DisplayMode::FadeOnRelease => {
                self.color = None;
                self.highlighted = false;
            }
            DisplayMode::PersistDimmed => {
                if self.color.is_some() {
                    self.dim();
                } else {
                    self.highlighted = false;
                }
            }
        }
    }

    /// Keep the colour, drop to [`DIM_OPACITY`].
    pub fn dim(&mut self) {
        self.opacity = DIM_OPACITY;
        self.highlighted = false;
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for KeySlot {
    fn default() -> Self {
        Self::new()
    }
}

/// All 88 key slots.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDisplay {
    slots: [KeySlot; KEY_COUNT],
}

impl KeyDisplay {
    pub fn new() -> Self {
        Self {
            slots: [KeySlot::new(); KEY_COUNT],
        }
    }

    /// Slot index for a note number.
    pub fn slot_for_note(note: u8) -> Result<usize, PlayerError> {
        if (LOWEST_NOTE..=HIGHEST_NOTE).contains(&note) {
            Ok(usize::from(note - LOWEST_NOTE))
        } else {
            Err(PlayerError::OutOfRangeNote(note))
        }
    }

    pub fn slot(&self, index: usize) -> Option<&KeySlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut KeySlot> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeySlot> {
        self.slots.iter()
    }

    pub fn highlighted_count(&self) -> usize {
        self.slots.iter().filter(|s| s.highlighted).count()
    }

    /// Reset every slot to idle.
    pub fn clear_all(&mut self) {
        self.slots.iter_mut().for_each(KeySlot::clear);
    }

    /// Dim every highlighted slot.
    pub fn dim_highlighted(&mut self) {
        self.slots
            .iter_mut()
            .filter(|s| s.highlighted)
            .for_each(KeySlot::dim);
    }
}

impl Default for KeyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct SlotView<'a> {
    note: u8,
    name: String,
    #[serde(flatten)]
    slot: &'a KeySlot,
}

impl Serialize for KeyDisplay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.slots.iter().enumerate().map(|(i, slot)| {
            let note = LOWEST_NOTE + i as u8;
            SlotView {
                note,
                name: note_name(note),
                slot,
            }
        }))
    }
}
