// src/state/mod.rs
//
// Plain state shared between the player and the page.
//
// Key principles:
// - Nothing in here talks to the playback engine or the audio output
// - The page mutates state only through Commands
// - Everything the page renders is serializable

mod catalog;
mod command;
mod config;
mod display_mode;
mod keys;
mod readback;

pub use catalog::*;
pub use command::*;
pub use config::*;
pub use display_mode::*;
pub use keys::*;
pub use readback::*;
