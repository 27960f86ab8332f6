//! Error types for board construction and simulation.

use crate::board::NUM_SLOTS;

/// Error type for construction-time board misuse.
///
/// These are the only recoverable errors in the model: a misconfigured
/// board must fail fast at attach/build time rather than silently
/// misroute signals. Protocol-timing violations at run time (sync
/// glitches, reset mid-frame) are undefined behavior and not modeled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("all {NUM_SLOTS} converter slots are occupied")]
    SlotsFull,

    #[error("PMOD breakout card must occupy slot 0, attempted slot {0}")]
    BreakoutSlot(usize),

    #[error("card '{card}' cannot accept {got} wiring (expects {expected})")]
    WiringMismatch {
        card: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("board failed to settle during build: {0}")]
    Settle(#[from] SimError),
}

/// Error type for simulation-run failures.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("signal graph failed to settle at t={0} (combinational loop?)")]
    Unsettled(u64),

    #[error("decoded-sample sink disconnected: {0}")]
    SinkClosed(String),
}

/// Result type for simulation steps and process reactions.
pub type SimResult<T = ()> = Result<T, SimError>;
