//! Board composer: attaches converter cards and builds the runnable
//! simulation.
//!
//! The model assumes the board's isolation circuitry is completely
//! transparent: host-side lines connect directly to the SerDes and the
//! per-slot wiring.

use tracing::{debug, info};

use super::breakout::PmodBreakout;
use super::clocks::{ClockConfig, ClockRouter};
use super::serdes::{SerDes, SlotRegs};
use super::NUM_SLOTS;
use crate::cards::{CardWiring, ConverterCard, ConverterKind, PmodBus, SlotBus};
use crate::sim::{ConfigError, SignalId, Simulator};

/// Width of one slot's bidirectional data bus, in pins.
const SLOT_DATA_PINS: u8 = 6;

/// Handle map for every externally meaningful signal of a built board.
pub struct BoardIo {
    /// Global reset; forces the SerDes and its registers to idle.
    pub reset: SignalId,
    /// Serial bit clock pacing the SerDes (the DAC serial-port clock).
    pub bit_clk: SignalId,
    /// Shift-register load strobe, one pulse per 8 bit-clock cycles.
    pub shift_clk: SignalId,
    /// ADC serial port shared lines.
    pub adc_mclk: SignalId,
    pub adc_mdi: SignalId,
    pub adc_mdo: SignalId,
    /// DAC serial port shared data lines.
    pub dac_mdi: SignalId,
    pub dac_mdo: SignalId,
    /// Inbound serialized configuration lines.
    pub dac_cs: SignalId,
    pub adc_cs: SignalId,
    pub clksel: SignalId,
    /// Outbound serialized status lines.
    pub dirchan: SignalId,
    pub adc_ovf: SignalId,
    /// Hardware ADC configuration line.
    pub adc_hwcon: SignalId,
    /// The two free-running clock domains.
    pub clk0: SignalId,
    pub clk1: SignalId,
    /// 4-bit PMOD connector (bit 3 clock, bit 2 data B, bit 1 data A,
    /// bit 0 sync).
    pub pmod: SignalId,
    /// Per-slot 6-bit data buses.
    pub slot_data_in: [SignalId; NUM_SLOTS],
    pub slot_data_out: [SignalId; NUM_SLOTS],
    /// Clock routed to each slot.
    pub slot_clk: [SignalId; NUM_SLOTS],
    /// Per-slot register files, observable for validation.
    pub slots: [SlotRegs; NUM_SLOTS],
}

/// The expansion board under composition.
pub struct Board {
    config: ClockConfig,
    cards: Vec<(Box<dyn ConverterCard>, ConverterKind)>,
}

impl Board {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            cards: Vec::new(),
        }
    }

    /// Attach a converter card to the next free slot, in attachment
    /// order. The wiring shape is fixed here by `kind`; a PMOD breakout
    /// card is only valid in slot 0. Returns the assigned slot index.
    pub fn attach(
        &mut self,
        card: Box<dyn ConverterCard>,
        kind: ConverterKind,
    ) -> Result<usize, ConfigError> {
        let index = self.cards.len();
        if index >= NUM_SLOTS {
            return Err(ConfigError::SlotsFull);
        }
        if kind == ConverterKind::PmodBreakout && index != 0 {
            return Err(ConfigError::BreakoutSlot(index));
        }
        debug!("attaching card '{}' to slot {} ({:?})", card.name(), index, kind);
        self.cards.push((card, kind));
        Ok(index)
    }

    /// Wire everything up and return the runnable simulation plus the
    /// signal handle map. Signals are allocated once here and live for
    /// the whole run.
    pub fn build(self) -> Result<(Simulator, BoardIo), ConfigError> {
        let mut sim = Simulator::new();

        let reset = sim.add_signal("reset");
        let bit_clk = sim.add_signal("spi_dac_mclk");
        let shift_clk = sim.add_signal("custom_srclk");
        let adc_mclk = sim.add_signal("spi_adc_mclk");
        let adc_mdi = sim.add_signal("spi_adc_mdi");
        let adc_mdo = sim.add_signal("spi_adc_mdo");
        let dac_mdi = sim.add_signal("spi_dac_mdi");
        let dac_mdo = sim.add_signal("spi_dac_mdo");
        let dac_cs = sim.add_signal("spi_dac_cs");
        let adc_cs = sim.add_signal("spi_adc_cs");
        let clksel = sim.add_signal("custom_clksel");
        let dirchan = sim.add_signal("custom_dirchan");
        let adc_ovf = sim.add_signal("custom_adc_ovf");
        let adc_hwcon = sim.add_signal("custom_adc_hwcon");
        let clk0 = sim.add_signal("custom_clk0");
        let clk1 = sim.add_signal("custom_clk1");
        let pmod = sim.add_bus("pmod", 4);

        let slot_data_in =
            std::array::from_fn(|i| sim.add_bus(format!("slot{i}.data_in"), SLOT_DATA_PINS));
        let slot_data_out =
            std::array::from_fn(|i| sim.add_bus(format!("slot{i}.data_out"), SLOT_DATA_PINS));
        let slot_clk = std::array::from_fn(|i| sim.add_signal(format!("slot{i}.clk")));
        let slots: [SlotRegs; NUM_SLOTS] = std::array::from_fn(|i| SlotRegs {
            dac_cs: sim.add_signal(format!("slot{i}.dac_cs")),
            adc_cs: sim.add_signal(format!("slot{i}.adc_cs")),
            clksel: sim.add_signal(format!("slot{i}.clksel")),
            direction: sim.add_signal(format!("slot{i}.direction")),
            chan_count: sim.add_signal(format!("slot{i}.chan_count")),
            ovf_left: sim.add_signal(format!("slot{i}.ovf_left")),
            ovf_right: sim.add_signal(format!("slot{i}.ovf_right")),
        });

        // Breakout wires for the dedicated DAC card on slot 0.
        let pmod_clk = sim.add_signal("pmod_clk");
        let pmod_sync = sim.add_signal("pmod_sync");
        let pmod_dina = sim.add_signal("pmod_dina");
        let pmod_dinb = sim.add_signal("pmod_dinb");

        sim.add_clock(clk0, self.config.clk0_half_period);
        sim.add_clock(clk1, self.config.clk1_half_period);

        sim.add_comb(Box::new(ClockRouter::new(
            clk0,
            clk1,
            std::array::from_fn(|i| slots[i].clksel),
            slot_clk,
        )));
        sim.add_comb(Box::new(PmodBreakout::new(
            pmod, pmod_clk, pmod_sync, pmod_dina, pmod_dinb,
        )));
        sim.add_edge(Box::new(SerDes::new(
            bit_clk, reset, dac_cs, adc_cs, clksel, dirchan, adc_ovf, slots,
        )));

        let card_count = self.cards.len();
        for (index, (card, kind)) in self.cards.into_iter().enumerate() {
            let wiring = match kind {
                ConverterKind::Generic => CardWiring::Slot(SlotBus {
                    data_in: slot_data_in[index],
                    data_out: slot_data_out[index],
                    adc_cs: slots[index].adc_cs,
                    adc_mclk,
                    adc_mdi,
                    adc_mdo,
                    dac_cs: slots[index].dac_cs,
                    dac_mclk: bit_clk,
                    dac_mdi,
                    dac_mdo,
                    shift_clk,
                    adc_hwcon,
                    direction: slots[index].direction,
                    chan_count: slots[index].chan_count,
                    ovf_left: slots[index].ovf_left,
                    ovf_right: slots[index].ovf_right,
                    clk: slot_clk[index],
                    reset,
                }),
                ConverterKind::PmodBreakout => CardWiring::Breakout(PmodBus {
                    bclk: pmod_clk,
                    sync: pmod_sync,
                    data_a: pmod_dina,
                    data_b: pmod_dinb,
                }),
            };
            for process in card.wire(wiring)? {
                sim.add_edge(process);
            }
        }

        // Derived wires hold consistent values before any stimulus.
        sim.settle()?;

        info!("board built: {} card(s), {} nets", card_count, sim.num_signals());
        Ok((
            sim,
            BoardIo {
                reset,
                bit_clk,
                shift_clk,
                adc_mclk,
                adc_mdi,
                adc_mdo,
                dac_mdi,
                dac_mdo,
                dac_cs,
                adc_cs,
                clksel,
                dirchan,
                adc_ovf,
                adc_hwcon,
                clk0,
                clk1,
                pmod,
                slot_data_in,
                slot_data_out,
                slot_clk,
                slots,
            },
        ))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}
