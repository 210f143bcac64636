//! Clock port: Trait for reading wall-clock time.
//!
//! The timestamp is metadata on a result and never feeds the calculation.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Implementations:
/// - `SystemClock` for production use
/// - `FixedClock` for reproducible output in tests
pub trait Clock: Send + Sync {
    /// Read the current time.
    ///
    /// Callers read it once per calculation so a single result is
    /// internally time-consistent.
    fn now(&self) -> DateTime<Utc>;
}
