//! HTTP Device API client for embedded systems.
//!
//! This module implements the small HTTP/1.1 subset the connector's Device
//! API speaks: one request per exchange, a status line, a header block, a
//! blank-line separator, and an optional `resource=value` body with
//! percent-encoded values. It deliberately is *not* a general-purpose HTTP
//! client: there is no chunked transfer-encoding, no redirect following, and
//! no persistent-connection reuse across requests.
//!
//! The pieces:
//!
//! - [`response`]: pulls a streaming, burst-delivered socket byte stream into
//!   a fixed-capacity buffer, distinguishing "complete", "timed out", and
//!   "overflowed".
//! - [`codec`]: byte-exact percent-encoding and decoding (form-urlencoded
//!   variant, space as `+`) over bounded buffers.
//! - [`client`]: composes the two into the device operations (provision,
//!   read, write, long-poll, timestamp).

/// Device operations: provision, read, write, long-poll, timestamp.
pub mod client;

/// Percent-encoding codec (form-urlencoded variant).
pub mod codec;

/// Bounded-buffer HTTP response reader and response parsing helpers.
pub mod response;
