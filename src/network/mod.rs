//! A network abstraction layer for embedded systems
//!
//! This module defines the two capabilities the HTTP client consumes: a
//! byte-oriented [`Transport`] over an already-secured socket, and a
//! monotonic [`Clock`] used for response deadlines. Implementations are
//! supplied by the integrating firmware; the client never owns a socket
//! beyond opening and closing it around a request.

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application-layer protocol clients
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Clock, Transport};
}

/// A reliable, byte-oriented connection with non-blocking-peek semantics.
///
/// The contract mirrors what embedded socket stacks expose: single-byte
/// reads gated by an availability poll, bulk writes, and explicit
/// connect/disconnect so the same transport can be re-established between
/// requests.
pub trait Transport {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Whether the connection is currently open.
    fn is_connected(&mut self) -> bool;

    /// Open a connection to the given host and port.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Self::Error>;

    /// Tear down the connection. Safe to call when already closed.
    fn disconnect(&mut self);

    /// Whether at least one received byte is waiting to be read.
    fn available(&mut self) -> bool;

    /// Read a single byte, or `None` if nothing is waiting.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write the whole buffer to the connection.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
}

/// A source of monotonic milliseconds plus a short cooperative delay.
///
/// Injecting time keeps the response reader's deadline and quiescence logic
/// off the wall clock, so it can be driven deterministically in tests.
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary epoch.
    fn now_ms(&mut self) -> u64;

    /// Block the calling task for roughly `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}
