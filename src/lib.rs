//! Cycle-level behavioral model of a modular audio converter expansion
//! board, for validating firmware logic before real hardware exists.
//!
//! The board multiplexes four converter slots' worth of configuration and
//! status bits onto a handful of shared serial lines, paced by a bit
//! clock and a rotating modulo-8 slot counter; plug-in converter cards
//! consume or produce audio samples in their own serial clock domains.
//! Isolation is assumed completely transparent.
//!
//! # Architecture
//!
//! - **sim**: deterministic single-threaded simulation runtime — signals,
//!   combinational and edge-triggered processes, a delta-settle scheduler
//! - **board**: the expansion board — clock domains and router, the
//!   SerDes protocol core, the PMOD breakout, and the [`Board`] composer
//! - **cards**: converter card models behind the narrow
//!   [`ConverterCard`] interface; [`PmodDac`] decodes PMOD-DA2 frames and
//!   delivers [`DacSample`] events over a crossbeam channel
//!
//! # Example
//!
//! ```no_run
//! use convboard::{Board, ConverterKind, PmodDac};
//!
//! let (samples_tx, samples_rx) = crossbeam_channel::unbounded();
//! let mut board = Board::default();
//! board.attach(Box::new(PmodDac::new(0, samples_tx)), ConverterKind::PmodBreakout)?;
//! let (mut sim, io) = board.build()?;
//!
//! sim.drive(io.reset, true)?;
//! // ... drive the serial lines, advance time, drain samples_rx
//! # Ok::<(), convboard::ConfigError>(())
//! ```

pub mod board;
pub mod cards;
pub mod sim;

// Re-export the board composer and its handle map.
pub use board::{Board, BoardIo, ClockConfig, SerDes, SlotRegs, NUM_SLOTS};

// Re-export the card interface and the PMOD-DA2 model.
pub use cards::{
    CardWiring, ConverterCard, ConverterKind, DacSample, FrameTiming, PmodBus, PmodDac, SlotBus,
};

// Re-export the simulation runtime surface.
pub use sim::{
    CombProcess, ConfigError, Edge, EdgeProcess, SignalId, SimError, SimResult, Simulator,
    Updates,
};
