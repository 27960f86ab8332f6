//! Signal value store.
//!
//! Every wire and register output in the model is a [`SignalId`]-addressed
//! net of 1 to 8 bits held in [`Signals`]. Single-bit nets are the common
//! case; the 4-bit PMOD connector and the 6-bit slot data buses use the
//! wider widths. Values are stored as `u8` masked to the net width.

use std::fmt;

/// Identifier of a net in the signal store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u32);

impl SignalId {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// A single value transition, as observed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalChange {
    pub signal: SignalId,
    pub was: u8,
    pub now: u8,
}

impl SignalChange {
    /// True if this change is a low-to-high transition of a 1-bit net.
    pub fn is_rising(&self) -> bool {
        self.was == 0 && self.now != 0
    }

    /// True if this change is a high-to-low transition of a 1-bit net.
    pub fn is_falling(&self) -> bool {
        self.was != 0 && self.now == 0
    }
}

struct Net {
    name: String,
    mask: u8,
    value: u8,
}

/// Flat store of all nets in one simulation.
///
/// Allocation happens once at board-composition time; values live for the
/// whole run. Processes read through `&Signals` and never write directly —
/// all mutation goes through [`Signals::apply`], driven by the scheduler,
/// so every process observes a consistent snapshot per instant.
#[derive(Default)]
pub struct Signals {
    nets: Vec<Net>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a 1-bit net, initialized low.
    pub fn add(&mut self, name: impl Into<String>) -> SignalId {
        self.add_bus(name, 1)
    }

    /// Allocate a net of `width` bits (1..=8), initialized to zero.
    pub fn add_bus(&mut self, name: impl Into<String>, width: u8) -> SignalId {
        assert!((1..=8).contains(&width), "net width must be 1-8 bits");
        let id = SignalId(self.nets.len() as u32);
        self.nets.push(Net {
            name: name.into(),
            mask: if width == 8 { 0xff } else { (1 << width) - 1 },
            value: 0,
        });
        id
    }

    /// Current level of a net (true when any bit is high).
    pub fn get(&self, id: SignalId) -> bool {
        self.nets[id.as_usize()].value != 0
    }

    /// Current word value of a net, masked to its width.
    pub fn word(&self, id: SignalId) -> u8 {
        self.nets[id.as_usize()].value
    }

    /// Name of a net, for diagnostics.
    pub fn name(&self, id: SignalId) -> &str {
        &self.nets[id.as_usize()].name
    }

    /// Apply a batch of writes, returning the actual transitions.
    ///
    /// Multiple writes to the same net within one batch collapse to the
    /// last one, mirroring last-assignment-wins register semantics; writes
    /// that do not change the stored value produce no transition.
    pub fn apply(&mut self, writes: &[(SignalId, u8)]) -> Vec<SignalChange> {
        let mut finals: Vec<(SignalId, u8)> = Vec::with_capacity(writes.len());
        for &(id, value) in writes {
            match finals.iter_mut().find(|(fid, _)| *fid == id) {
                Some(slot) => slot.1 = value,
                None => finals.push((id, value)),
            }
        }

        let mut changes = Vec::new();
        for (id, value) in finals {
            let net = &mut self.nets[id.as_usize()];
            let value = value & net.mask;
            if net.value != value {
                changes.push(SignalChange {
                    signal: id,
                    was: net.value,
                    now: value,
                });
                net.value = value;
            }
        }
        changes
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }
}

impl fmt::Debug for Signals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signals").field("nets", &self.nets.len()).finish()
    }
}
