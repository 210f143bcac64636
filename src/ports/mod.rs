//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the outside world. The risk core needs only
//! one: a source of wall-clock time for result metadata.

mod clock;

pub use clock::Clock;
