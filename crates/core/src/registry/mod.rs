//! Terminal registry snapshots and running-total accumulation.

pub mod accumulation;
pub mod types;

pub use accumulation::{Accumulation, accumulate};
pub use types::{TerminalDirectory, TerminalSnapshot, UNKNOWN_LABEL};
