//! PMOD-DA2 DAC card model.
//!
//! Consumes data in accordance with the National Semiconductor DAC121S101
//! serial format: 16 bit-clock ticks per frame while sync is low — 4
//! overhead ticks, then the 12 data bits most-significant-first — with a
//! sync rising edge marking the frame boundary. Two DAC121S101 chips
//! share the clock and sync lines, so one frame carries a left sample on
//! data A and a right sample on data B.
//!
//! Flow per bit-clock rising edge:
//!   1. Latch sync, remembering the previous value for edge detection
//!   2. Sync falling edge → frame start: reset the sub-counter and clear
//!      both accumulators
//!   3. Sync low → place the data-line bits at index `14 - sub_counter`
//!      when that index falls inside the 12-bit window
//!   4. Sync rising edge → emit exactly one decoded-sample event
//!
//! Sync toggling faster than one bit-clock period is undefined behavior;
//! the upstream clock relationship is assumed well-formed.

use crossbeam_channel::Sender;
use tracing::{info, trace};

use super::{CardWiring, ConverterCard, PmodBus};
use crate::sim::{ConfigError, EdgeProcess, SignalId, SimError, SimResult, Signals, Updates};

/// Width of one decoded sample channel.
pub const SAMPLE_BITS: u32 = 12;

/// Timing attached to a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// Simulation time of the sync rising edge that closed the frame.
    pub timestamp: u64,
    /// Elapsed time since the previous frame's emission.
    pub delta: u64,
}

/// One decoded sample pair, emitted once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DacSample {
    /// Slot index of the emitting card.
    pub port: usize,
    /// Left channel, 12 significant bits.
    pub left: u16,
    /// Right channel, 12 significant bits.
    pub right: u16,
    pub timing: FrameTiming,
}

/// PMOD-DA2 card: attach to slot 0 with [`ConverterKind::PmodBreakout`].
///
/// [`ConverterKind::PmodBreakout`]: super::ConverterKind::PmodBreakout
pub struct PmodDac {
    port: usize,
    samples_tx: Sender<DacSample>,
}

impl PmodDac {
    /// Create a card that delivers decoded frames to `samples_tx`.
    pub fn new(port: usize, samples_tx: Sender<DacSample>) -> Self {
        Self { port, samples_tx }
    }
}

impl ConverterCard for PmodDac {
    fn name(&self) -> &str {
        "pmod_da2"
    }

    fn wire(
        self: Box<Self>,
        wiring: CardWiring,
    ) -> Result<Vec<Box<dyn EdgeProcess>>, ConfigError> {
        let bus = match wiring {
            CardWiring::Breakout(bus) => bus,
            other => {
                return Err(ConfigError::WiringMismatch {
                    card: self.name().to_string(),
                    expected: "breakout",
                    got: other.describe(),
                });
            }
        };
        Ok(vec![Box::new(PmodDacDecoder {
            name: format!("pmod_da2_{}", self.port),
            port: self.port,
            bus,
            samples_tx: self.samples_tx,
            sync_last: false,
            sub_counter: 0,
            left: 0,
            right: 0,
            time_last: 0,
        })])
    }
}

/// Write one bit of a 12-bit accumulator.
fn set_bit(word: &mut u16, index: u32, value: bool) {
    debug_assert!(index < SAMPLE_BITS, "bit index {index} outside sample");
    if value {
        *word |= 1 << index;
    } else {
        *word &= !(1 << index);
    }
}

/// The decoder state machine, triggered by the breakout clock.
struct PmodDacDecoder {
    name: String,
    port: usize,
    bus: PmodBus,
    samples_tx: Sender<DacSample>,

    /// Sync level on the previous tick, for edge detection.
    sync_last: bool,
    /// Position within the sync-low accumulation window.
    sub_counter: u8,
    left: u16,
    right: u16,
    time_last: u64,
}

impl EdgeProcess for PmodDacDecoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn clock(&self) -> SignalId {
        self.bus.bclk
    }

    fn on_edge(&mut self, now: u64, signals: &Signals, _out: &mut Updates) -> SimResult {
        let sync = signals.get(self.bus.sync);
        let sync_was = self.sync_last;
        self.sync_last = sync;

        if !sync {
            if sync_was {
                // Falling edge: a new accumulation window starts. The
                // accumulators are cleared here so a truncated previous
                // frame cannot leak stale bits into this one.
                self.sub_counter = 0;
                self.left = 0;
                self.right = 0;
                trace!("[{}] t={} frame start", self.name, now);
            } else {
                // Data bits occupy indices 11..0; smaller sub-counter
                // values are clock overhead before the significant bits.
                let index = 14 - i32::from(self.sub_counter);
                if (0..SAMPLE_BITS as i32).contains(&index) {
                    set_bit(&mut self.left, index as u32, signals.get(self.bus.data_a));
                    set_bit(&mut self.right, index as u32, signals.get(self.bus.data_b));
                    trace!("[{}] t={} bit {} latched", self.name, now, index);
                }
                self.sub_counter = self.sub_counter.saturating_add(1);
            }
        } else if !sync_was {
            // Rising edge: frame boundary, emit exactly once.
            let timing = FrameTiming {
                timestamp: now,
                delta: now - self.time_last,
            };
            info!(
                "T = {:8} (dT = {:6}): PMOD-DA2 port {} output L = 0x{:03x}, R = 0x{:03x}",
                now, timing.delta, self.port, self.left, self.right
            );
            self.time_last = now;
            self.samples_tx
                .send(DacSample {
                    port: self.port,
                    left: self.left,
                    right: self.right,
                    timing,
                })
                .map_err(|_| SimError::SinkClosed(self.name.clone()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Simulator;
    use crossbeam_channel::Receiver;

    fn fixture() -> (Simulator, PmodBus, Receiver<DacSample>) {
        let mut sim = Simulator::new();
        let bus = PmodBus {
            bclk: sim.add_signal("bclk"),
            sync: sim.add_signal("sync"),
            data_a: sim.add_signal("data_a"),
            data_b: sim.add_signal("data_b"),
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        let card = Box::new(PmodDac::new(0, tx));
        for process in card.wire(CardWiring::Breakout(bus)).unwrap() {
            sim.add_edge(process);
        }
        (sim, bus, rx)
    }

    /// One bit-clock period: rising edge after 1 time unit, falling after
    /// another.
    fn tick(sim: &mut Simulator, bus: &PmodBus) {
        sim.advance(1).unwrap();
        sim.drive(bus.bclk, true).unwrap();
        sim.advance(1).unwrap();
        sim.drive(bus.bclk, false).unwrap();
    }

    /// Raise sync for one tick so the next frame begins with a clean
    /// falling edge. The rising edge emits a frame (all zeros on a fresh
    /// decoder), which the caller is expected to drain.
    fn idle_high(sim: &mut Simulator, bus: &PmodBus) {
        sim.drive(bus.sync, true).unwrap();
        tick(sim, bus);
    }

    /// Drive one well-formed 16-tick frame followed by the sync rising
    /// edge that emits it.
    fn drive_frame(sim: &mut Simulator, bus: &PmodBus, left: u16, right: u16) {
        sim.drive(bus.sync, false).unwrap();
        for k in 0u32..16 {
            let (a, b) = if (4..16).contains(&k) {
                let index = 15 - k;
                (left >> index & 1 == 1, right >> index & 1 == 1)
            } else {
                (false, false)
            };
            sim.drive(bus.data_a, a).unwrap();
            sim.drive(bus.data_b, b).unwrap();
            tick(sim, bus);
        }
        sim.drive(bus.sync, true).unwrap();
        tick(sim, bus);
    }

    #[test]
    fn frame_reproduces_driven_sample_pair() {
        let (mut sim, bus, rx) = fixture();
        idle_high(&mut sim, &bus);
        rx.try_recv().unwrap(); // primer frame from the initial rising edge

        for (left, right) in [(0xabc, 0x123), (0x000, 0xfff), (0xfff, 0x000), (0x801, 0x7fe)] {
            drive_frame(&mut sim, &bus, left, right);
            let sample = rx.try_recv().unwrap();
            assert_eq!(sample.port, 0);
            assert_eq!(sample.left, left, "left channel mismatch");
            assert_eq!(sample.right, right, "right channel mismatch");
        }
    }

    #[test]
    fn delta_time_tracks_elapsed_ticks_between_frames() {
        let (mut sim, bus, rx) = fixture();
        idle_high(&mut sim, &bus);
        rx.try_recv().unwrap();

        drive_frame(&mut sim, &bus, 0x111, 0x222);
        let first = rx.try_recv().unwrap();
        drive_frame(&mut sim, &bus, 0x333, 0x444);
        let second = rx.try_recv().unwrap();

        // The tick helper runs half a period past the emitting edge.
        assert_eq!(second.timing.timestamp, sim.now() - 1);
        assert_eq!(
            second.timing.delta,
            second.timing.timestamp - first.timing.timestamp
        );
        // 17 bit-clock periods per frame cycle, 2 time units each.
        assert_eq!(second.timing.delta, 34);
    }

    #[test]
    fn emits_exactly_once_per_sync_rising_edge() {
        let (mut sim, bus, rx) = fixture();
        idle_high(&mut sim, &bus);
        rx.try_recv().unwrap();

        drive_frame(&mut sim, &bus, 0x5a5, 0x0f0);
        assert!(rx.try_recv().is_ok());

        // Further ticks with sync held high: no emission.
        for _ in 0..5 {
            tick(&mut sim, &bus);
        }
        assert!(rx.try_recv().is_err());

        // Ticks with sync low mid-window: no emission either.
        sim.drive(bus.sync, false).unwrap();
        for _ in 0..5 {
            tick(&mut sim, &bus);
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn truncated_frame_cannot_leak_into_the_next() {
        let (mut sim, bus, rx) = fixture();
        idle_high(&mut sim, &bus);
        rx.try_recv().unwrap();

        // Truncated frame: only 8 low ticks of all-ones data, so just the
        // top nibble gets written.
        sim.drive(bus.sync, false).unwrap();
        sim.drive(bus.data_a, true).unwrap();
        sim.drive(bus.data_b, true).unwrap();
        for _ in 0..8 {
            tick(&mut sim, &bus);
        }
        sim.drive(bus.sync, true).unwrap();
        tick(&mut sim, &bus);
        let partial = rx.try_recv().unwrap();
        assert_eq!(partial.left, 0xf00);

        // A second frame truncated before any data tick must come out
        // clean, not carry the previous frame's high bits.
        sim.drive(bus.sync, false).unwrap();
        for _ in 0..3 {
            tick(&mut sim, &bus);
        }
        sim.drive(bus.sync, true).unwrap();
        tick(&mut sim, &bus);
        let clean = rx.try_recv().unwrap();
        assert_eq!(clean.left, 0x000);
        assert_eq!(clean.right, 0x000);
    }

    #[test]
    fn over_long_window_ignores_extra_ticks() {
        let (mut sim, bus, rx) = fixture();
        idle_high(&mut sim, &bus);
        rx.try_recv().unwrap();

        sim.drive(bus.sync, false).unwrap();
        for k in 0u32..16 {
            let bit = (4..16).contains(&k) && (0x92b >> (15 - k)) & 1 == 1;
            sim.drive(bus.data_a, bit).unwrap();
            sim.drive(bus.data_b, bit).unwrap();
            tick(&mut sim, &bus);
        }
        // 40 extra low ticks past the window: out-of-range indices, and
        // enough of them to exercise the sub-counter saturation.
        sim.drive(bus.data_a, true).unwrap();
        sim.drive(bus.data_b, true).unwrap();
        for _ in 0..40 {
            tick(&mut sim, &bus);
        }
        sim.drive(bus.sync, true).unwrap();
        tick(&mut sim, &bus);

        let sample = rx.try_recv().unwrap();
        assert_eq!(sample.left, 0x92b);
    }

    #[test]
    fn wiring_mismatch_is_rejected() {
        let mut sim = Simulator::new();
        let nil = sim.add_signal("nil");
        let bus = SlotBusStub::make(nil);
        let (tx, _rx) = crossbeam_channel::unbounded();
        let card = Box::new(PmodDac::new(0, tx));
        match card.wire(CardWiring::Slot(bus)) {
            Err(ConfigError::WiringMismatch { expected, got, .. }) => {
                assert_eq!(expected, "breakout");
                assert_eq!(got, "slot");
            }
            other => panic!("expected WiringMismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn set_bit_writes_and_clears() {
        let mut word = 0u16;
        set_bit(&mut word, 11, true);
        set_bit(&mut word, 0, true);
        assert_eq!(word, 0x801);
        set_bit(&mut word, 11, false);
        assert_eq!(word, 0x001);
    }

    struct SlotBusStub;

    impl SlotBusStub {
        fn make(nil: SignalId) -> crate::cards::SlotBus {
            crate::cards::SlotBus {
                data_in: nil,
                data_out: nil,
                adc_cs: nil,
                adc_mclk: nil,
                adc_mdi: nil,
                adc_mdo: nil,
                dac_cs: nil,
                dac_mclk: nil,
                dac_mdi: nil,
                dac_mdo: nil,
                shift_clk: nil,
                adc_hwcon: nil,
                direction: nil,
                chan_count: nil,
                ovf_left: nil,
                ovf_right: nil,
                clk: nil,
                reset: nil,
            }
        }
    }
}
