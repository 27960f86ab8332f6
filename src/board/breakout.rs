//! PMOD connector breakout for the dedicated DAC card.

use crate::sim::{CombProcess, SignalId, Signals, Updates};

/// Connector pin assignment on the 4-bit PMOD net.
pub const PIN_SYNC: u8 = 0;
pub const PIN_DATA_A: u8 = 1;
pub const PIN_DATA_B: u8 = 2;
pub const PIN_CLK: u8 = 3;

/// Stateless rewiring of the 4-bit connector into named function wires.
pub struct PmodBreakout {
    pmod: SignalId,
    clk: SignalId,
    sync: SignalId,
    data_a: SignalId,
    data_b: SignalId,
    sensitivity: [SignalId; 1],
}

impl PmodBreakout {
    pub fn new(
        pmod: SignalId,
        clk: SignalId,
        sync: SignalId,
        data_a: SignalId,
        data_b: SignalId,
    ) -> Self {
        Self {
            pmod,
            clk,
            sync,
            data_a,
            data_b,
            sensitivity: [pmod],
        }
    }
}

impl CombProcess for PmodBreakout {
    fn name(&self) -> &str {
        "pmod_breakout"
    }

    fn inputs(&self) -> &[SignalId] {
        &self.sensitivity
    }

    fn update(&self, signals: &Signals, out: &mut Updates) {
        let word = signals.word(self.pmod);
        out.set(self.clk, word >> PIN_CLK & 1 == 1);
        out.set(self.data_b, word >> PIN_DATA_B & 1 == 1);
        out.set(self.data_a, word >> PIN_DATA_A & 1 == 1);
        out.set(self.sync, word >> PIN_SYNC & 1 == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Simulator;

    #[test]
    fn each_pin_maps_to_its_named_wire() {
        let mut sim = Simulator::new();
        let pmod = sim.add_bus("pmod", 4);
        let clk = sim.add_signal("pmod_clk");
        let sync = sim.add_signal("pmod_sync");
        let data_a = sim.add_signal("pmod_dina");
        let data_b = sim.add_signal("pmod_dinb");
        sim.add_comb(Box::new(PmodBreakout::new(pmod, clk, sync, data_a, data_b)));
        sim.settle().unwrap();

        for (word, wire) in [
            (1 << PIN_CLK, clk),
            (1 << PIN_SYNC, sync),
            (1 << PIN_DATA_A, data_a),
            (1 << PIN_DATA_B, data_b),
        ] {
            sim.drive_word(pmod, word).unwrap();
            assert!(sim.probe(wire));
            assert_eq!(
                [clk, sync, data_a, data_b].iter().filter(|w| sim.probe(**w)).count(),
                1,
                "exactly one wire high for word {word:#06b}"
            );
        }

        sim.drive_word(pmod, 0b1111).unwrap();
        assert!(sim.probe(clk) && sim.probe(sync) && sim.probe(data_a) && sim.probe(data_b));
    }
}
