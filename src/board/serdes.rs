//! Serializer/deserializer for the shared configuration/status lines.
//!
//! Several multibit signals travel in serial form at 8x the sample clock
//! rate: one full rotation of the 3-bit slot counter is 8 bit-clock
//! ticks. Inbound, the first 4 ticks of a rotation fan the chip-select
//! and clock-select lines out to the per-slot registers. Outbound, the
//! overflow line carries left/right bits for slots 0..4 at two ticks per
//! slot, while the direction/channel line carries direction bits for 4
//! ticks and channel-count bits for the remaining 4.
//!
//! Both paths index with the counter value observed at the start of the
//! edge, before the increment for this tick is applied. This ordering is
//! load-bearing: moving the increment ahead of the reads shifts which
//! slot's status lands in which phase of the rotation.

use tracing::{debug, trace};

use super::NUM_SLOTS;
use crate::sim::{EdgeProcess, SignalId, Signals, SimResult, Updates};

/// Bit-clock ticks per full configuration/status rotation.
pub const CYCLE_TICKS: u8 = 8;

/// The per-slot register file, one copy per converter slot.
///
/// Each bit has exactly one writer: the SerDes latches `dac_cs`,
/// `adc_cs` and `clksel` inbound; the attached card drives `direction`,
/// `chan_count` and the overflow bits back.
#[derive(Debug, Clone, Copy)]
pub struct SlotRegs {
    pub dac_cs: SignalId,
    pub adc_cs: SignalId,
    pub clksel: SignalId,
    pub direction: SignalId,
    pub chan_count: SignalId,
    pub ovf_left: SignalId,
    pub ovf_right: SignalId,
}

/// The SerDes engine, triggered on every rising edge of the serial bit
/// clock.
pub struct SerDes {
    bit_clk: SignalId,
    reset: SignalId,
    /// Inbound serial configuration lines.
    dac_cs_in: SignalId,
    adc_cs_in: SignalId,
    clksel_in: SignalId,
    /// Outbound serial status lines.
    dirchan_out: SignalId,
    ovf_out: SignalId,
    slots: [SlotRegs; NUM_SLOTS],
    count: u8,
}

impl SerDes {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bit_clk: SignalId,
        reset: SignalId,
        dac_cs_in: SignalId,
        adc_cs_in: SignalId,
        clksel_in: SignalId,
        dirchan_out: SignalId,
        ovf_out: SignalId,
        slots: [SlotRegs; NUM_SLOTS],
    ) -> Self {
        Self {
            bit_clk,
            reset,
            dac_cs_in,
            adc_cs_in,
            clksel_in,
            dirchan_out,
            ovf_out,
            slots,
            count: 0,
        }
    }
}

impl EdgeProcess for SerDes {
    fn name(&self) -> &str {
        "serdes"
    }

    fn clock(&self) -> SignalId {
        self.bit_clk
    }

    fn on_edge(&mut self, now: u64, signals: &Signals, out: &mut Updates) -> SimResult {
        if signals.get(self.reset) {
            // Reset forces the idle state at the next edge, however many
            // edges it is held for.
            self.count = 0;
            for slot in &self.slots {
                out.set(slot.dac_cs, false);
                out.set(slot.adc_cs, false);
                out.set(slot.clksel, false);
            }
            out.set(self.dirchan_out, false);
            out.set(self.ovf_out, false);
            debug!("t={} serdes reset", now);
            return Ok(());
        }

        let phase = self.count as usize;

        // Serialize: overflow at two ticks per slot (left on even phases,
        // right on odd), direction for phases 0..4, channel count after.
        let ovf = if phase % 2 == 0 {
            signals.get(self.slots[phase / 2].ovf_left)
        } else {
            signals.get(self.slots[phase / 2].ovf_right)
        };
        out.set(self.ovf_out, ovf);

        let dirchan = if phase < NUM_SLOTS {
            signals.get(self.slots[phase].direction)
        } else {
            signals.get(self.slots[phase - NUM_SLOTS].chan_count)
        };
        out.set(self.dirchan_out, dirchan);

        // Deserialize: the first half of the rotation carries per-slot
        // configuration on the shared inbound lines.
        if phase < NUM_SLOTS {
            out.set(self.slots[phase].dac_cs, signals.get(self.dac_cs_in));
            out.set(self.slots[phase].adc_cs, signals.get(self.adc_cs_in));
            out.set(self.slots[phase].clksel, signals.get(self.clksel_in));
        }

        self.count = (self.count + 1) % CYCLE_TICKS;
        trace!("t={} serdes phase {} -> {}", now, phase, self.count);
        Ok(())
    }
}
