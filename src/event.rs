// src/event.rs

/// ===============================
/// Load generations
/// ===============================

/// Generation of a track load.
///
/// Every load the transport issues gets a fresh epoch, and the engine tags
/// everything it reports about that load with it. Anything tagged with an
/// older epoch belongs to a superseded track and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(pub u32);

impl Epoch {
    #[inline]
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// ===============================
/// Engine -> player events
/// ===============================

/// MIDI status nibble for note-on.
pub const STATUS_NOTE_ON: u8 = 0x90;

/// MIDI status nibble for note-off.
pub const STATUS_NOTE_OFF: u8 = 0x80;

/// Something the playback engine reports back.
///
/// These events:
/// - arrive in the order the engine emits them
/// - are tagged with the epoch of the load they belong to
/// - are never reordered or coalesced
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// `load_track` finished; the track can be started.
    Loaded { epoch: Epoch },

    LoadFailed { epoch: Epoch, reason: String },

    Note { epoch: Epoch, note: u8, on: bool },

    /// Playback position, in seconds.
    Progress { epoch: Epoch, now: f64, end: f64 },

    /// Playback reached the end of the track.
    Ended { epoch: Epoch },
}

impl EngineEvent {
    /// Build a note event from a raw MIDI status byte.
    ///
    /// Channel bits are ignored. Returns `None` for anything that is not a
    /// note-on or note-off.
    pub fn from_midi(epoch: Epoch, status: u8, note: u8) -> Option<Self> {
        match status & 0xF0 {
            STATUS_NOTE_ON => Some(EngineEvent::Note {
                epoch,
                note,
                on: true,
            }),
            STATUS_NOTE_OFF => Some(EngineEvent::Note {
                epoch,
                note,
                on: false,
            }),
            _ => None,
        }
    }
}
