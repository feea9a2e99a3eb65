//! Device API client.
//!
//! One [`Client`] instance owns the transport, the clock, and the fixed
//! buffers for a single in-flight exchange. Operations are fully
//! synchronous; the only suspension point is the response reader's wait
//! loop, which always returns within the receive timeout plus one drain
//! window. The instance is not thread-safe - callers sharing one client
//! across tasks must serialize access themselves.
//!
//! Each logical stage gets its own buffer (`response_buf`, `encode_buf`,
//! `decode_buf`) rather than reusing one scratch area, which keeps the
//! stages free of aliasing at the cost of some RAM.

use core::fmt::Write as _;

use heapless::String;

use super::codec;
use super::response::{self, Quiescence, Termination};
use crate::network::error::Error;
use crate::network::{Clock, Transport};

/// TLS service port of the connector host.
const CONNECTOR_PORT: u16 = 443;

/// Capacity of the raw HTTP response buffer (and of the per-stage encode and
/// decode scratch buffers).
const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Capacity of the outgoing request buffer. Sized so a POST carrying a fully
/// encoded value still fits alongside the header block.
const REQUEST_BUFFER_SIZE: usize = 1536;

const MAX_HOST_LEN: usize = 128;
const TOKEN_LEN: usize = 40;
const POLL_HEADER_LEN: usize = 80;

const DEFAULT_RX_TIMEOUT_MS: u32 = 10_000;

const ALIAS_PATH: &str = "/onep:v1/stack/alias";
const PROVISION_PATH: &str = "/provision/activate";
const TIMESTAMP_PATH: &str = "/timestamp";

const USER_AGENT: &str = concat!("exolink/", env!("CARGO_PKG_VERSION"));
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Structured outcome of one Device API operation.
///
/// `status_code` is `0` when no status line could be obtained at all.
/// `success` is true only when both the transport-level exchange and the
/// application-level post-processing (status check, body parsing, decoding)
/// succeeded; a non-zero status code alone does not imply success.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code of the response, or `0` if none was parsed.
    pub status_code: u16,
    /// Whether the operation succeeded end to end.
    pub success: bool,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ApiResponse {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ApiResponse {{ status_code: {=u16}, success: {=bool} }}",
            self.status_code,
            self.success
        );
    }
}

/// Client for the connector's HTTP Device API.
///
/// The transport is lazily (re)connected before each request if it is not
/// already open; there is no pooling, backoff, or automatic retry - retry
/// policy belongs to the caller.
pub struct Client<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    connector: String<MAX_HOST_LEN>,
    token: Option<String<TOKEN_LEN>>,
    rx_timeout_ms: u32,
    quiescence: Quiescence,
    response_buf: [u8; RESPONSE_BUFFER_SIZE],
    encode_buf: [u8; RESPONSE_BUFFER_SIZE],
    decode_buf: [u8; RESPONSE_BUFFER_SIZE],
}

impl<T: Transport, C: Clock> core::fmt::Debug for Client<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("connector", &self.connector)
            .field("authenticated", &self.token.is_some())
            .field("rx_timeout_ms", &self.rx_timeout_ms)
            .finish()
    }
}

impl<T: Transport, C: Clock> Client<T, C> {
    /// Create a client for the connector at `connector` (domain name only,
    /// the TLS port is fixed).
    ///
    /// Fails with [`Error::Overflow`] if the domain exceeds the internal
    /// host buffer.
    pub fn new(transport: T, clock: C, connector: &str) -> Result<Self, Error> {
        let connector = String::try_from(connector).map_err(|_| Error::Overflow)?;
        Ok(Self {
            transport,
            clock,
            connector,
            token: None,
            rx_timeout_ms: DEFAULT_RX_TIMEOUT_MS,
            quiescence: Quiescence::default(),
            response_buf: [0; RESPONSE_BUFFER_SIZE],
            encode_buf: [0; RESPONSE_BUFFER_SIZE],
            decode_buf: [0; RESPONSE_BUFFER_SIZE],
        })
    }

    /// Set or replace the client authentication token (40 characters, as
    /// issued by [`provision`](Self::provision)).
    pub fn set_token(&mut self, token: &str) -> Result<(), Error> {
        self.token = Some(String::try_from(token).map_err(|_| Error::Overflow)?);
        Ok(())
    }

    /// Set the maximum time to wait for any response.
    ///
    /// Defaults to 10 000 ms. Long-poll requests extend this by their poll
    /// timeout automatically.
    pub fn set_timeout(&mut self, rx_timeout_ms: u32) {
        self.rx_timeout_ms = rx_timeout_ms;
    }

    /// Adjust the quiescence window the response reader uses to decide that
    /// a burst-delivered response has ended.
    pub fn set_quiescence(&mut self, quiescence: Quiescence) {
        self.quiescence = quiescence;
    }

    /// Provision `identity` with the connector and receive a
    /// server-generated authentication token into `token`.
    ///
    /// Status 200 delivers the token; 409 means the identity is already
    /// provisioned and is reported as a failure with that status code. The
    /// received token is *not* stored on the client - pass it to
    /// [`set_token`](Self::set_token) for subsequent authenticated calls.
    pub fn provision<const N: usize>(
        &mut self,
        identity: &str,
        token: &mut String<N>,
    ) -> ApiResponse {
        token.clear();
        let mut outcome = ApiResponse::default();

        if identity.is_empty() {
            net_debug!("provision: empty identity");
            return outcome;
        }

        let encoded_len = match codec::encode_into(identity.as_bytes(), &mut self.encode_buf) {
            Ok(len) => len,
            Err(_) => return outcome,
        };
        let Ok(encoded) = core::str::from_utf8(&self.encode_buf[..encoded_len]) else {
            return outcome;
        };
        let request = match self.build_post(PROVISION_PATH, "id", encoded, false) {
            Ok(request) => request,
            Err(_) => return outcome,
        };

        let len = match self.exchange(request.as_str(), self.rx_timeout_ms) {
            Ok(len) => len,
            Err(e) => {
                net_debug!("provision: request failed: {}", e);
                return outcome;
            }
        };

        let raw = &self.response_buf[..len];
        let Some(status) = response::status_code(raw) else {
            net_debug!("provision: could not parse HTTP status line");
            return outcome;
        };
        outcome.status_code = status;

        match status {
            200 => match response::body(raw).ok_or(Error::MalformedResponse) {
                Ok(body) => {
                    outcome.success = decode_value(body, &mut self.decode_buf, token);
                }
                Err(e) => net_debug!("provision: {}", e),
            },
            409 => net_debug!("provision: identity is already provisioned (409)"),
            other => net_debug!("provision: unexpected HTTP status {=u16}", other),
        }
        outcome
    }

    /// Read the latest value of `resource`, leaving the percent-decoded
    /// value in `value`.
    ///
    /// Status 200 carries a `resource=value` body; 204 is success with no
    /// value.
    pub fn read<const N: usize>(&mut self, resource: &str, value: &mut String<N>) -> ApiResponse {
        value.clear();
        let mut outcome = ApiResponse::default();

        let request = match self.build_get(ALIAS_PATH, Some(resource), true, None) {
            Ok(request) => request,
            Err(_) => return outcome,
        };

        let len = match self.exchange(request.as_str(), self.rx_timeout_ms) {
            Ok(len) => len,
            Err(e) => {
                net_debug!("read: request failed: {}", e);
                return outcome;
            }
        };

        let raw = &self.response_buf[..len];
        let Some(status) = response::status_code(raw) else {
            net_debug!("read: could not parse HTTP status line");
            return outcome;
        };
        outcome.status_code = status;

        match status {
            200 => match alias_body(raw) {
                Ok(raw_value) => {
                    outcome.success = decode_value(raw_value, &mut self.decode_buf, value);
                }
                Err(e) => net_debug!("read: {}", e),
            },
            204 => outcome.success = true,
            other => net_debug!("read: unexpected HTTP status {=u16}", other),
        }
        outcome
    }

    /// Write `value` to `resource`.
    ///
    /// The value is percent-encoded before transmission; status 204
    /// acknowledges the write.
    pub fn write(&mut self, resource: &str, value: &str) -> ApiResponse {
        let mut outcome = ApiResponse::default();

        let encoded_len = match codec::encode_into(value.as_bytes(), &mut self.encode_buf) {
            Ok(len) => len,
            Err(_) => {
                net_debug!("write: value does not fit the encode buffer");
                return outcome;
            }
        };
        let Ok(encoded) = core::str::from_utf8(&self.encode_buf[..encoded_len]) else {
            return outcome;
        };
        let request = match self.build_post(ALIAS_PATH, resource, encoded, true) {
            Ok(request) => request,
            Err(_) => return outcome,
        };

        let len = match self.exchange(request.as_str(), self.rx_timeout_ms) {
            Ok(len) => len,
            Err(e) => {
                net_debug!("write: request failed: {}", e);
                return outcome;
            }
        };

        let raw = &self.response_buf[..len];
        let Some(status) = response::status_code(raw) else {
            net_debug!("write: could not parse HTTP status line");
            return outcome;
        };
        outcome.status_code = status;

        if status == 204 {
            outcome.success = true;
        } else {
            net_debug!("write: unexpected HTTP status {=u16}", status);
        }
        outcome
    }

    /// Wait for a new value on `resource`.
    ///
    /// The request is held open server-side until the resource changes or
    /// `poll_timeout_ms` elapses. Status 200 delivers the new value into
    /// `value`; 304 means no change before the poll timeout and is success
    /// with no value. The receive timeout is extended by the poll timeout
    /// for this call only.
    pub fn long_poll<const N: usize>(
        &mut self,
        resource: &str,
        value: &mut String<N>,
        last_modified: u64,
        poll_timeout_ms: u32,
    ) -> ApiResponse {
        value.clear();
        let mut outcome = ApiResponse::default();

        let mut poll_headers: String<POLL_HEADER_LEN> = String::new();
        if write!(
            poll_headers,
            "If-Modified-Since: {last_modified}\r\nRequest-Timeout: {poll_timeout_ms}"
        )
        .is_err()
        {
            return outcome;
        }

        let request =
            match self.build_get(ALIAS_PATH, Some(resource), true, Some(poll_headers.as_str())) {
                Ok(request) => request,
                Err(_) => return outcome,
            };

        let timeout = self.rx_timeout_ms.saturating_add(poll_timeout_ms);
        let len = match self.exchange(request.as_str(), timeout) {
            Ok(len) => len,
            Err(e) => {
                net_debug!("long_poll: request failed: {}", e);
                return outcome;
            }
        };

        let raw = &self.response_buf[..len];
        let Some(status) = response::status_code(raw) else {
            net_debug!("long_poll: could not parse HTTP status line");
            return outcome;
        };
        outcome.status_code = status;

        match status {
            200 => match alias_body(raw) {
                Ok(raw_value) => {
                    outcome.success = decode_value(raw_value, &mut self.decode_buf, value);
                }
                Err(e) => net_debug!("long_poll: {}", e),
            },
            304 => outcome.success = true,
            other => net_debug!("long_poll: unexpected HTTP status {=u16}", other),
        }
        outcome
    }

    /// Retrieve the current time from the server as epoch seconds.
    ///
    /// Unauthenticated, so it also doubles as a connectivity check.
    pub fn timestamp(&mut self) -> Option<u64> {
        let request = self.build_get(TIMESTAMP_PATH, None, false, None).ok()?;

        let len = match self.exchange(request.as_str(), self.rx_timeout_ms) {
            Ok(len) => len,
            Err(e) => {
                net_debug!("timestamp: request failed: {}", e);
                return None;
            }
        };

        let raw = &self.response_buf[..len];
        if response::status_code(raw) != Some(200) {
            net_debug!("timestamp: unexpected HTTP response");
            return None;
        }
        parse_decimal(response::body(raw)?)
    }

    /// Send one request and receive one response into `response_buf`,
    /// returning the response length.
    fn exchange(&mut self, request: &str, timeout_ms: u32) -> Result<usize, Error> {
        if !self.ensure_connected() {
            return Err(Error::NotConnected);
        }
        self.discard_pending();

        self.transport
            .write_all(request.as_bytes())
            .map_err(|_| Error::WriteError)?;

        let outcome = response::read_response(
            &mut self.transport,
            &mut self.clock,
            &mut self.response_buf,
            timeout_ms,
            self.quiescence,
        );
        match outcome.termination {
            Termination::Complete => Ok(outcome.len),
            Termination::TimedOut => Err(Error::Timeout),
            Termination::Overflowed => Err(Error::Overflow),
        }
    }

    /// Reconnect the transport if it is not already open.
    fn ensure_connected(&mut self) -> bool {
        if self.transport.is_connected() {
            return true;
        }

        net_debug!("opening connection to {=str}", self.connector.as_str());
        self.transport.disconnect();
        if self
            .transport
            .connect(self.connector.as_str(), CONNECTOR_PORT)
            .is_err()
        {
            net_debug!("could not connect to connector");
            return false;
        }
        true
    }

    /// Throw away stale bytes a previous exchange may have left in the
    /// socket, bounded so a chattering peer cannot wedge us here.
    fn discard_pending(&mut self) {
        let mut discarded = 0;
        while self.transport.available() && discarded < RESPONSE_BUFFER_SIZE {
            let _ = self.transport.read_byte();
            discarded += 1;
        }
    }

    fn build_get(
        &self,
        path: &str,
        resource: Option<&str>,
        authenticated: bool,
        extra_headers: Option<&str>,
    ) -> Result<String<REQUEST_BUFFER_SIZE>, Error> {
        let mut request: String<REQUEST_BUFFER_SIZE> = String::new();

        write!(request, "GET {path}").map_err(|_| Error::Overflow)?;
        if let Some(resource) = resource {
            write!(request, "?{resource}").map_err(|_| Error::Overflow)?;
        }
        write!(
            request,
            " HTTP/1.1\r\nHost: {}\r\nUser-Agent: {USER_AGENT}\r\nAccept: {FORM_URLENCODED}\r\n",
            self.connector
        )
        .map_err(|_| Error::Overflow)?;

        if authenticated {
            if let Some(token) = self.token.as_ref() {
                write!(request, "Authorization: token {token}\r\n").map_err(|_| Error::Overflow)?;
            }
        }
        if let Some(extra) = extra_headers {
            write!(request, "{extra}\r\n").map_err(|_| Error::Overflow)?;
        }

        request.push_str("\r\n").map_err(|_| Error::Overflow)?;
        Ok(request)
    }

    fn build_post(
        &self,
        path: &str,
        key: &str,
        value: &str,
        authenticated: bool,
    ) -> Result<String<REQUEST_BUFFER_SIZE>, Error> {
        let mut request: String<REQUEST_BUFFER_SIZE> = String::new();

        write!(
            request,
            "POST {path} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {USER_AGENT}\r\n\
             Accept: {FORM_URLENCODED}\r\nContent-Type: {FORM_URLENCODED}\r\n\
             Content-Length: {}\r\n",
            self.connector,
            key.len() + 1 + value.len()
        )
        .map_err(|_| Error::Overflow)?;

        if authenticated {
            if let Some(token) = self.token.as_ref() {
                write!(request, "Authorization: token {token}\r\n").map_err(|_| Error::Overflow)?;
            }
        }

        write!(request, "\r\n{key}={value}").map_err(|_| Error::Overflow)?;
        Ok(request)
    }
}

/// Locate the `resource=value` payload of a 200 response.
fn alias_body(raw: &[u8]) -> Result<&[u8], Error> {
    let body = response::body(raw).ok_or(Error::MalformedResponse)?;
    response::alias_value(body).ok_or(Error::MalformedResponse)
}

/// Percent-decode `raw` through `scratch` and copy the UTF-8 result into
/// the caller's container.
fn decode_value<const N: usize>(raw: &[u8], scratch: &mut [u8], out: &mut String<N>) -> bool {
    let len = match codec::decode_into(raw, scratch) {
        Ok(len) => len,
        Err(e) => {
            net_debug!("response value failed to decode: {}", e);
            return false;
        }
    };
    let Ok(text) = core::str::from_utf8(&scratch[..len]) else {
        net_debug!("response value is not valid UTF-8");
        return false;
    };
    out.push_str(text).is_ok()
}

/// Parse the leading decimal digits of `body` (at least one required).
fn parse_decimal(body: &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    let mut any = false;
    for &byte in body {
        if !byte.is_ascii_digit() {
            break;
        }
        value = value
            .checked_mul(10)?
            .checked_add(u64::from(byte - b'0'))?;
        any = true;
    }
    any.then_some(value)
}
