//! # Application Layer Network Protocols
//!
//! Protocol clients built on the core [`Transport`](crate::network::Transport)
//! and [`Clock`](crate::network::Clock) capabilities. Implementations here are
//! `no_std` compatible, use fixed-size buffers, and leave retry policy to the
//! caller.

/// HTTP device-API client.
///
/// Provides the connector client together with its response reader and
/// percent-encoding codec.
pub mod http;
