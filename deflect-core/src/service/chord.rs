//! Chord length updates
//!
//! Backs `POST /chord`. The answer is plain text for the web page; an
//! invalid value is reported in the text and keeps the old length.

use core::fmt::Write;

use deflect_protocol::ChordUpdate;
use heapless::String;

use crate::state::ChordWriter;

/// Capacity of the confirmation text
pub const CHORD_MESSAGE_LEN: usize = 64;

/// Result of a chord update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChordOutcome {
    Changed { from_mm: u16, to_mm: u16 },
    Rejected,
}

impl ChordOutcome {
    /// Text sent back to the client
    pub fn message(&self) -> String<CHORD_MESSAGE_LEN> {
        let mut out = String::new();
        // Longest message is well under CHORD_MESSAGE_LEN
        let _ = match self {
            ChordOutcome::Changed { from_mm, to_mm } => {
                writeln!(out, "Changing chord from {} mm to {} mm", from_mm, to_mm)
            }
            ChordOutcome::Rejected => writeln!(out, "ERROR : chord must be a positive value"),
        };
        out
    }
}

pub struct ChordService<'a> {
    writer: ChordWriter<'a>,
}

impl<'a> ChordService<'a> {
    pub fn new(writer: ChordWriter<'a>) -> Self {
        Self { writer }
    }

    pub fn apply(&self, update: ChordUpdate) -> ChordOutcome {
        let from_mm = self.writer.state().chord_mm();
        match update {
            ChordUpdate::Length(to_mm) if self.writer.write(to_mm) => {
                ChordOutcome::Changed { from_mm, to_mm }
            }
            _ => ChordOutcome::Rejected,
        }
    }
}
