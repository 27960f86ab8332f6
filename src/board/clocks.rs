//! Clock domains and per-slot clock routing.

use super::NUM_SLOTS;
use crate::sim::{CombProcess, SignalId, Signals, Updates};

/// Half-periods of the two free-running clock domains, in simulation time
/// units (externally supplied constants; the core never computes them).
///
/// The defaults approximate the hardware oscillators at a 1 ns timestep:
/// domain A 11.2896 MHz, domain B 24.576 MHz.
#[derive(Debug, Clone, Copy)]
pub struct ClockConfig {
    pub clk0_half_period: u64,
    pub clk1_half_period: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            clk0_half_period: 44,
            clk1_half_period: 20,
        }
    }
}

/// Combinational per-slot clock selection.
///
/// Each slot's clock follows domain A while its clock-select bit is low
/// and domain B while it is high, with no lag: any change on a select bit
/// or either domain propagates within the same simulated instant.
pub struct ClockRouter {
    clk0: SignalId,
    clk1: SignalId,
    clksel: [SignalId; NUM_SLOTS],
    slot_clk: [SignalId; NUM_SLOTS],
    sensitivity: Vec<SignalId>,
}

impl ClockRouter {
    pub fn new(
        clk0: SignalId,
        clk1: SignalId,
        clksel: [SignalId; NUM_SLOTS],
        slot_clk: [SignalId; NUM_SLOTS],
    ) -> Self {
        let mut sensitivity = vec![clk0, clk1];
        sensitivity.extend_from_slice(&clksel);
        Self {
            clk0,
            clk1,
            clksel,
            slot_clk,
            sensitivity,
        }
    }
}

impl CombProcess for ClockRouter {
    fn name(&self) -> &str {
        "clock_router"
    }

    fn inputs(&self) -> &[SignalId] {
        &self.sensitivity
    }

    fn update(&self, signals: &Signals, out: &mut Updates) {
        for i in 0..NUM_SLOTS {
            let domain = if signals.get(self.clksel[i]) {
                self.clk1
            } else {
                self.clk0
            };
            out.set(self.slot_clk[i], signals.get(domain));
        }
    }
}
