//! Deterministic single-threaded simulation scheduler.
//!
//! All reactive logic runs on one logical timeline. Free-running clock
//! sources schedule their own toggles; external stimulus enters through
//! [`Simulator::drive`]. Each simulated instant is resolved by a delta
//! loop:
//!
//! 1. apply the triggering transitions,
//! 2. rerun affected combinational processes to fixpoint,
//! 3. fire edge processes whose clock transitioned with matching
//!    polarity — every reaction reads the settled snapshot, and all
//!    writes are applied together afterwards (two-phase),
//! 4. repeat with the newly produced transitions until quiescent.
//!
//! A bounded round count turns combinational oscillation into
//! [`SimError::Unsettled`] instead of a livelock.

use tracing::{debug, trace};

use super::errors::{SimError, SimResult};
use super::process::{CombProcess, Edge, EdgeProcess, Updates};
use super::signal::{SignalChange, SignalId, Signals};

/// Cap on delta/settle rounds per simulated instant.
const MAX_DELTA_ROUNDS: usize = 64;

struct ClockSource {
    signal: SignalId,
    half_period: u64,
    next_toggle: u64,
}

/// The simulation: signal store, processes, clock sources, and time.
pub struct Simulator {
    signals: Signals,
    combs: Vec<Box<dyn CombProcess>>,
    edges: Vec<Box<dyn EdgeProcess>>,
    clocks: Vec<ClockSource>,
    now: u64,
    scratch: Updates,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            signals: Signals::new(),
            combs: Vec::new(),
            edges: Vec::new(),
            clocks: Vec::new(),
            now: 0,
            scratch: Updates::new(),
        }
    }

    /// Allocate a 1-bit net.
    pub fn add_signal(&mut self, name: impl Into<String>) -> SignalId {
        self.signals.add(name)
    }

    /// Allocate a multi-bit net (1..=8 bits).
    pub fn add_bus(&mut self, name: impl Into<String>, width: u8) -> SignalId {
        self.signals.add_bus(name, width)
    }

    /// Register a free-running square-wave source on `signal`.
    ///
    /// The signal toggles every `half_period` time units, forever; the
    /// first toggle fires `half_period` after the current time. Reset has
    /// no effect on clock generation.
    pub fn add_clock(&mut self, signal: SignalId, half_period: u64) {
        assert!(half_period > 0, "clock half-period must be non-zero");
        self.clocks.push(ClockSource {
            signal,
            half_period,
            next_toggle: self.now + half_period,
        });
    }

    pub fn add_comb(&mut self, process: Box<dyn CombProcess>) {
        debug!("registering combinational process '{}'", process.name());
        self.combs.push(process);
    }

    pub fn add_edge(&mut self, process: Box<dyn EdgeProcess>) {
        debug!("registering edge process '{}'", process.name());
        self.edges.push(process);
    }

    /// Current simulation time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of allocated nets.
    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    /// Current level of a 1-bit net.
    pub fn probe(&self, id: SignalId) -> bool {
        self.signals.get(id)
    }

    /// Current word value of a net.
    pub fn probe_word(&self, id: SignalId) -> u8 {
        self.signals.word(id)
    }

    /// Drive a 1-bit net from outside the model at the current instant.
    pub fn drive(&mut self, id: SignalId, value: bool) -> SimResult {
        self.drive_word(id, u8::from(value))
    }

    /// Drive a multi-bit net from outside the model at the current instant.
    pub fn drive_word(&mut self, id: SignalId, value: u8) -> SimResult {
        trace!("t={} drive {} <= {:#04x}", self.now, self.signals.name(id), value);
        let changes = self.signals.apply(&[(id, value)]);
        self.react(changes)
    }

    /// Advance simulation time by `dt`, firing clock toggles in timestamp
    /// order. Toggles that land on the same instant are applied together,
    /// so simultaneous edges are observed consistently.
    pub fn advance(&mut self, dt: u64) -> SimResult {
        let deadline = self.now + dt;
        loop {
            let next = self.clocks.iter().map(|c| c.next_toggle).min();
            match next {
                Some(t) if t <= deadline => {
                    self.now = t;
                    let mut writes = Vec::new();
                    for clock in &mut self.clocks {
                        if clock.next_toggle == t {
                            writes.push((clock.signal, u8::from(!self.signals.get(clock.signal))));
                            clock.next_toggle += clock.half_period;
                        }
                    }
                    let changes = self.signals.apply(&writes);
                    self.react(changes)?;
                }
                _ => {
                    self.now = deadline;
                    return Ok(());
                }
            }
        }
    }

    /// Run every combinational process once and settle the result.
    ///
    /// Called at composition time so derived wires (routed clocks,
    /// breakout fan-out) hold consistent values before any stimulus.
    pub fn settle(&mut self) -> SimResult {
        let mut writes = Vec::new();
        for comb in &self.combs {
            self.scratch.clear();
            comb.update(&self.signals, &mut self.scratch);
            writes.extend_from_slice(self.scratch.writes());
        }
        let changes = self.signals.apply(&writes);
        self.react(changes)
    }

    /// Resolve one simulated instant given its triggering transitions.
    fn react(&mut self, initial: Vec<SignalChange>) -> SimResult {
        let mut pending = initial;
        let mut rounds = 0usize;

        while !pending.is_empty() {
            rounds += 1;
            if rounds > MAX_DELTA_ROUNDS {
                return Err(SimError::Unsettled(self.now));
            }

            // Combinational fixpoint: rerun any process one of whose
            // inputs just changed; its outputs join this instant's
            // transition set and can wake further processes.
            let mut frontier: Vec<SignalChange> = pending.clone();
            loop {
                rounds += 1;
                if rounds > MAX_DELTA_ROUNDS {
                    return Err(SimError::Unsettled(self.now));
                }
                let mut produced = Vec::new();
                for comb in &self.combs {
                    let touched = comb
                        .inputs()
                        .iter()
                        .any(|id| frontier.iter().any(|c| c.signal == *id));
                    if touched {
                        self.scratch.clear();
                        comb.update(&self.signals, &mut self.scratch);
                        produced.extend(self.signals.apply(self.scratch.writes()));
                    }
                }
                if produced.is_empty() {
                    break;
                }
                pending.extend(produced.iter().copied());
                frontier = produced;
            }

            // Edge processes: reads see the settled snapshot, writes are
            // buffered and applied together after all reactions.
            self.scratch.clear();
            for process in &mut self.edges {
                let clock = process.clock();
                let fired = pending.iter().any(|c| {
                    c.signal == clock
                        && match process.edge() {
                            Edge::Rising => c.is_rising(),
                            Edge::Falling => c.is_falling(),
                        }
                });
                if fired {
                    trace!("t={} edge process '{}' fires", self.now, process.name());
                    process.on_edge(self.now, &self.signals, &mut self.scratch)?;
                }
            }
            pending = self.signals.apply(self.scratch.writes());
        }
        Ok(())
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
