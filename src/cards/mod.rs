//! Converter card models and the board-facing card interface.
//!
//! The board knows nothing about a card beyond [`ConverterCard::wire`]:
//! given its assigned wires, a card returns the reactive processes that
//! model it. Which wiring shape a card receives is decided once, at
//! attach time, by the [`ConverterKind`] tag — there is no runtime type
//! inspection.

pub mod dac_pmod;

pub use dac_pmod::{DacSample, FrameTiming, PmodDac};

use crate::sim::{ConfigError, EdgeProcess, SignalId};

/// Wiring shape a card is attached with, chosen when the card is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    /// Generic converter card on the shared slot bus.
    Generic,
    /// Dedicated DAC card on the slot-0 PMOD breakout connector.
    PmodBreakout,
}

/// The full generic slot bus handed to a [`ConverterKind::Generic`] card.
#[derive(Debug, Clone, Copy)]
pub struct SlotBus {
    /// 6-bit data bus, board to card.
    pub data_in: SignalId,
    /// 6-bit data bus, card to board.
    pub data_out: SignalId,
    /// ADC serial port: per-slot chip select plus shared clock/data lines.
    pub adc_cs: SignalId,
    pub adc_mclk: SignalId,
    pub adc_mdi: SignalId,
    pub adc_mdo: SignalId,
    /// DAC serial port: per-slot chip select plus shared clock/data lines.
    pub dac_cs: SignalId,
    pub dac_mclk: SignalId,
    pub dac_mdi: SignalId,
    pub dac_mdo: SignalId,
    /// Shift-register load strobe (one pulse per 8 bit-clock cycles).
    pub shift_clk: SignalId,
    /// Hardware ADC configuration line.
    pub adc_hwcon: SignalId,
    /// Status registers the card writes back: direction (0 = DAC,
    /// 1 = ADC), channel count (0 = 2ch, 1 = 8ch), per-channel overflow.
    pub direction: SignalId,
    pub chan_count: SignalId,
    pub ovf_left: SignalId,
    pub ovf_right: SignalId,
    /// Clock routed to this slot by the clock router.
    pub clk: SignalId,
    pub reset: SignalId,
}

/// The 4 named breakout wires handed to a [`ConverterKind::PmodBreakout`]
/// card.
#[derive(Debug, Clone, Copy)]
pub struct PmodBus {
    pub bclk: SignalId,
    pub sync: SignalId,
    pub data_a: SignalId,
    pub data_b: SignalId,
}

/// Wires a card receives, matching its attach-time [`ConverterKind`].
#[derive(Debug, Clone, Copy)]
pub enum CardWiring {
    Slot(SlotBus),
    Breakout(PmodBus),
}

impl CardWiring {
    pub fn describe(&self) -> &'static str {
        match self {
            CardWiring::Slot(_) => "slot",
            CardWiring::Breakout(_) => "breakout",
        }
    }
}

/// A plug-in converter card model.
pub trait ConverterCard: Send {
    /// Debug name for this card.
    fn name(&self) -> &str;

    /// Consume the card and return its reactive processes, given the
    /// wires the board assigned to it. A card handed a wiring shape it
    /// does not support must fail with [`ConfigError::WiringMismatch`].
    fn wire(self: Box<Self>, wiring: CardWiring)
        -> Result<Vec<Box<dyn EdgeProcess>>, ConfigError>;
}
