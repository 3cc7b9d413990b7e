//! Time-based munitions production

pub mod ledger;

pub use ledger::{accrue, collect, effective_rate, elapsed_hours, hourly_output, Collection, Facility};
