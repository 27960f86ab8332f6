//! The converter expansion board: clocks, SerDes protocol core, PMOD
//! breakout, and the composer that wires everything into one simulation.

pub mod board;
pub mod breakout;
pub mod clocks;
pub mod serdes;

pub use board::{Board, BoardIo};
pub use breakout::PmodBreakout;
pub use clocks::{ClockConfig, ClockRouter};
pub use serdes::{SerDes, SlotRegs};

/// Number of converter-card slots on the board.
pub const NUM_SLOTS: usize = 4;
