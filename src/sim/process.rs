//! Process traits for reactive logic.
//!
//! Two process shapes cover the whole model:
//!
//! - [`CombProcess`] — stateless combinational logic, recomputed whenever
//!   any declared input changes (clock router, breakout adapter).
//! - [`EdgeProcess`] — sequential logic triggered by one edge of one
//!   clock signal (SerDes engine, DAC decoder). Reads observe the settled
//!   pre-edge snapshot; writes are buffered in [`Updates`] and applied by
//!   the scheduler only after every edge process at that instant has run.

use super::errors::SimResult;
use super::signal::{SignalId, Signals};

/// Clock edge polarity an [`EdgeProcess`] is sensitive to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Buffered signal writes produced by one process reaction.
///
/// Within one buffer the last write to a net wins, mirroring
/// last-assignment-wins register semantics.
#[derive(Debug, Default)]
pub struct Updates {
    writes: Vec<(SignalId, u8)>,
}

impl Updates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a 1-bit write.
    pub fn set(&mut self, id: SignalId, value: bool) {
        self.writes.push((id, u8::from(value)));
    }

    /// Schedule a multi-bit write (masked to the net width on apply).
    pub fn set_word(&mut self, id: SignalId, value: u8) {
        self.writes.push((id, value));
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub(crate) fn writes(&self) -> &[(SignalId, u8)] {
        &self.writes
    }

    pub(crate) fn clear(&mut self) {
        self.writes.clear();
    }
}

/// Stateless combinational logic.
///
/// `update` must be a pure function of the declared inputs; the scheduler
/// reruns it to fixpoint within each simulated instant, so relative
/// ordering between combinational processes never affects settled values.
pub trait CombProcess: Send {
    /// Debug name for this process.
    fn name(&self) -> &str;

    /// Nets whose changes require recomputation.
    fn inputs(&self) -> &[SignalId];

    /// Recompute outputs from the current signal snapshot.
    fn update(&self, signals: &Signals, out: &mut Updates);
}

/// Edge-triggered sequential logic.
pub trait EdgeProcess: Send {
    /// Debug name for this process.
    fn name(&self) -> &str;

    /// The clock net this process is sensitive to.
    fn clock(&self) -> SignalId;

    /// Which edge of the clock triggers `on_edge`.
    fn edge(&self) -> Edge {
        Edge::Rising
    }

    /// React to one clock edge at simulation time `now`.
    fn on_edge(&mut self, now: u64, signals: &Signals, out: &mut Updates) -> SimResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_accumulate_writes() {
        let mut signals = Signals::new();
        let a = signals.add("a");
        let b = signals.add_bus("b", 4);

        let mut out = Updates::new();
        assert!(out.is_empty());
        out.set(a, true);
        out.set_word(b, 0b1010);
        assert!(!out.is_empty());

        signals.apply(out.writes());
        assert!(signals.get(a));
        assert_eq!(signals.word(b), 0b1010);

        out.clear();
        assert!(out.is_empty());
    }
}
