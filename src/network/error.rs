//! Common error types for network operations

/// A common error type for network operations.
///
/// This enum defines a set of common errors that can occur when talking to
/// the connector. It is designed to be simple and portable for `no_std`
/// environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The connection could not be opened or has dropped.
    NotConnected,
    /// An error occurred during a write operation.
    WriteError,
    /// The response deadline elapsed before a complete response arrived.
    Timeout,
    /// A fixed-capacity buffer was too small for the data.
    Overflow,
    /// A percent-escape was malformed.
    InvalidEscape,
    /// The response did not have the expected HTTP shape.
    MalformedResponse,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::Overflow => defmt::write!(f, "Overflow"),
            Error::InvalidEscape => defmt::write!(f, "InvalidEscape"),
            Error::MalformedResponse => defmt::write!(f, "MalformedResponse"),
        }
    }
}
