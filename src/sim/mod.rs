//! Deterministic simulation runtime: signals, processes, scheduler.

pub mod errors;
pub mod process;
pub mod scheduler;
pub mod signal;

pub use errors::{ConfigError, SimError, SimResult};
pub use process::{CombProcess, Edge, EdgeProcess, Updates};
pub use scheduler::Simulator;
pub use signal::{SignalChange, SignalId, Signals};
