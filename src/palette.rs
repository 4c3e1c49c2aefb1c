// src/palette.rs
//
// Key colours.
//
// Every sounding key is painted with one of twelve colours taken from
// "The Starry Night". The colour depends only on the note number, so the
// same pitch class always lights up the same way.

use std::fmt;

use serde::{Serialize, Serializer};

/// An opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS hex notation, e.g. `#02092B`.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The twelve palette entries, darkest first.
pub const STARRY_NIGHT: [Color; 12] = [
    Color::from_rgb(0x02, 0x09, 0x2B),
    Color::from_rgb(0x37, 0x4F, 0x74),
    Color::from_rgb(0x6D, 0x96, 0xBE),
    Color::from_rgb(0x61, 0x6C, 0x67),
    Color::from_rgb(0x91, 0xAE, 0xAA),
    Color::from_rgb(0x76, 0x6B, 0x3C),
    Color::from_rgb(0xA0, 0xA7, 0x78),
    Color::from_rgb(0xA2, 0x8A, 0x31),
    Color::from_rgb(0xC6, 0xC2, 0x67),
    Color::from_rgb(0xCF, 0xAA, 0x28),
    Color::from_rgb(0xED, 0xDC, 0x57),
    Color::from_rgb(0xFD, 0xF6, 0x6F),
];

/// Note number that maps to the first palette entry.
///
/// This is six semitones above the lowest key (21), so the colour cycle is
/// phase-shifted against the key index. Keep it as is.
pub const PALETTE_ORIGIN_NOTE: i32 = 27;

/// Palette slot for a note number.
#[inline]
pub fn palette_index(note: u8) -> usize {
    (i32::from(note) - PALETTE_ORIGIN_NOTE).rem_euclid(STARRY_NIGHT.len() as i32) as usize
}

/// Colour for a note number.
#[inline]
pub fn color_for_note(note: u8) -> Color {
    STARRY_NIGHT[palette_index(note)]
}
