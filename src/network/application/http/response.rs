//! Bounded-buffer HTTP response reader.
//!
//! Embedded socket stacks deliver responses in bursts with small scheduling
//! gaps, and the Device API gives no framing the client could rely on
//! (no chunked encoding, bodies without Content-Length). The reader therefore
//! treats a response as complete once data has arrived and the line has been
//! quiet for a configurable window, while an absolute deadline bounds the
//! whole exchange.

use crate::network::{Clock, Transport};

/// Inactivity window that bounds the post-failure drain of the socket.
const DRAIN_IDLE_MS: u32 = 50;

/// Tolerated gap in byte arrival before a response counts as complete.
///
/// The defaults (10 cycles of 10 ms) are a heuristic tuned for typical
/// embedded TLS stacks, not a protocol guarantee; callers with unusually
/// slow or bursty links can widen the window via
/// [`Client::set_quiescence`](super::client::Client::set_quiescence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quiescence {
    /// Length of one wait cycle in milliseconds.
    pub wait_ms: u32,
    /// Number of consecutive empty wait cycles before the response is
    /// considered complete.
    pub max_cycles: u32,
}

impl Default for Quiescence {
    fn default() -> Self {
        Self {
            wait_ms: 10,
            max_cycles: 10,
        }
    }
}

/// Why the reader stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Data arrived and the line then stayed quiet for the full quiescence
    /// window.
    Complete,
    /// The absolute deadline elapsed, regardless of how much data arrived.
    TimedOut,
    /// The destination buffer filled up before the line went quiet.
    Overflowed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Termination {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Termination::Complete => defmt::write!(f, "Complete"),
            Termination::TimedOut => defmt::write!(f, "TimedOut"),
            Termination::Overflowed => defmt::write!(f, "Overflowed"),
        }
    }
}

/// Result of one [`read_response`] call.
///
/// `len` counts the payload bytes written to the destination; the byte at
/// `dest[len]` is always `0`, so the buffer stays usable as a terminated
/// string for diagnostics even on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Number of response bytes stored in the destination buffer.
    pub len: usize,
    /// Why reading stopped.
    pub termination: Termination,
}

impl ReadOutcome {
    /// Whether the buffer holds a full response the caller may parse.
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Complete
    }
}

/// Read one HTTP response from `transport` into `dest`.
///
/// Bytes are consumed one at a time while available. A gap in arrival is
/// tolerated up to the quiescence window once data has been seen; after that
/// the response is complete. `timeout_ms` bounds the whole call (plus one
/// drain window on the failure paths). On timeout or overflow any bytes the
/// peer keeps sending are drained so a follow-up request does not read a
/// stale tail.
///
/// `dest` must have capacity for at least the terminating `0` byte; at most
/// `dest.len() - 1` response bytes are stored.
pub fn read_response<T: Transport, C: Clock>(
    transport: &mut T,
    clock: &mut C,
    dest: &mut [u8],
    timeout_ms: u32,
    quiescence: Quiescence,
) -> ReadOutcome {
    debug_assert!(!dest.is_empty());

    let start = clock.now_ms();
    let mut len = 0;
    let mut received = false;
    let mut idle_cycles = 0;

    let termination = loop {
        if clock.now_ms() - start >= u64::from(timeout_ms) {
            net_debug!("response read timed out after {=u32} ms", timeout_ms);
            drain(transport, clock);
            break Termination::TimedOut;
        }

        if transport.available() {
            if len + 1 < dest.len() {
                if let Some(byte) = transport.read_byte() {
                    dest[len] = byte;
                    len += 1;
                    received = true;
                    idle_cycles = 0;
                }
            } else {
                net_debug!("response exceeds buffer capacity of {=usize} bytes", dest.len());
                drain(transport, clock);
                break Termination::Overflowed;
            }
        } else if received {
            if idle_cycles < quiescence.max_cycles {
                // Maybe more data is still in flight.
                idle_cycles += 1;
                clock.delay_ms(quiescence.wait_ms);
            } else {
                break Termination::Complete;
            }
        } else {
            clock.delay_ms(1);
        }
    };

    dest[len] = 0;
    ReadOutcome { len, termination }
}

/// Discard whatever the peer keeps sending, bounded by inactivity.
///
/// Keeps reading while bytes keep arriving, resetting a short per-byte
/// window; stops once the line has been idle for [`DRAIN_IDLE_MS`] or the
/// connection drops. Never loops forever on a peer that keeps streaming the
/// same burst, because each byte costs no time and the idle clock only runs
/// while nothing arrives.
fn drain<T: Transport, C: Clock>(transport: &mut T, clock: &mut C) {
    let mut last_activity = clock.now_ms();

    while clock.now_ms() - last_activity < u64::from(DRAIN_IDLE_MS) {
        if !transport.is_connected() {
            break;
        }
        if transport.available() {
            let _ = transport.read_byte();
            last_activity = clock.now_ms();
        } else {
            clock.delay_ms(1);
        }
    }
}

/// Extract the status code from a raw response via a fixed
/// `HTTP/1.1 <3-digit code>` prefix scan.
pub fn status_code(raw: &[u8]) -> Option<u16> {
    let rest = raw.strip_prefix(b"HTTP/1.1 ")?;
    if rest.len() < 3 {
        return None;
    }

    let mut code = 0u16;
    for &digit in &rest[..3] {
        if !digit.is_ascii_digit() {
            return None;
        }
        code = code * 10 + u16::from(digit - b'0');
    }
    Some(code)
}

/// Locate the body: everything after the first blank-line separator.
pub fn body(raw: &[u8]) -> Option<&[u8]> {
    find_slice(raw, b"\r\n\r\n").map(|pos| &raw[pos + 4..])
}

/// Split an alias-style `resource=value` body, yielding the (still
/// percent-encoded) value. An absent delimiter or an empty value is
/// malformed.
pub fn alias_value(body: &[u8]) -> Option<&[u8]> {
    let sep = body.iter().position(|&b| b == b'=')?;
    let value = &body[sep + 1..];
    if value.is_empty() { None } else { Some(value) }
}

/// Finds the first occurrence of a slice in another slice and returns its
/// starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
