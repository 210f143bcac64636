//! Adapters layer: Concrete implementations of ports and I/O helpers.
//!
//! - `clock`: system and fixed clocks
//! - `json`: patient/result (de)serialization
//! - `sanitize`: redaction of identifiers and measurements in logs

pub mod clock;
pub mod json;
pub mod sanitize;

pub use clock::{FixedClock, SystemClock};
