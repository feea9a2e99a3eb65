//! # exolink - cloud connector client for embedded devices
//!
//! A small HTTP client that lets memory-constrained IoT devices talk to a
//! cloud connector's HTTP Device API: provision an identity for an access
//! token, read and write named data resources, long-poll a resource for
//! changes, and fetch the server time. This library is designed for embedded
//! systems and supports `no_std` environments.
//!
//! ## Design
//!
//! - **Bounded memory**: every request and response lives in a fixed-size
//!   buffer owned by the client; nothing is heap-allocated.
//! - **Transport agnostic**: the caller supplies the (typically TLS-secured)
//!   socket as a [`network::Transport`] implementation, together with a
//!   [`network::Clock`] capability for timeouts. Both are plain traits, so
//!   the client runs unchanged on any stack and is deterministic under test.
//! - **Structured outcomes**: operations report an
//!   [`ApiResponse`](network::application::http::client::ApiResponse) with
//!   the HTTP status code and a success flag; they never panic.
//!
//! ## Basic usage
//!
//! ```rust,no_run
//! use exolink::network::application::http::client::Client;
//! # use exolink::network::{Clock, Transport};
//! # struct NullTransport;
//! # impl Transport for NullTransport {
//! #     type Error = ();
//! #     fn is_connected(&mut self) -> bool { false }
//! #     fn connect(&mut self, _host: &str, _port: u16) -> Result<(), Self::Error> { Ok(()) }
//! #     fn disconnect(&mut self) {}
//! #     fn available(&mut self) -> bool { false }
//! #     fn read_byte(&mut self) -> Option<u8> { None }
//! #     fn write_all(&mut self, _buf: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct NullClock;
//! # impl Clock for NullClock {
//! #     fn now_ms(&mut self) -> u64 { 0 }
//! #     fn delay_ms(&mut self, _ms: u32) {}
//! # }
//!
//! let mut client = Client::new(NullTransport, NullClock, "x1-device.example.io").unwrap();
//! client.set_token("0123456789abcdef0123456789abcdef01234567").unwrap();
//!
//! let mut value: heapless::String<256> = heapless::String::new();
//! let outcome = client.read("data_out", &mut value);
//! if outcome.success {
//!     // value holds the decoded resource contents
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// Diagnostics go to defmt when the feature is enabled and vanish otherwise.
// The non-defmt arm still consumes the arguments so call sites compile
// warning-free under every feature combination.
macro_rules! net_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = ($($arg)*,);
    }};
}

/// Network abstraction layer: transport and clock capabilities plus the HTTP
/// device-API client built on top of them.
pub mod network;
