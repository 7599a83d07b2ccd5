//! Engine error taxonomy

use core::fmt;

use swarm_protocol::{ErrorCode, FrameError, ParseError, ProtocolError, Tag};

/// Everything `send`, `poll` and the typed commands can fail with
///
/// All variants are recoverable; the engine is back in its idle state by the
/// time one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The transport failed to read or write
    Communication,
    /// No matching response before the deadline
    Timeout,
    /// The response line failed its checksum
    ChecksumInvalid,
    /// The modem rejected the command
    Protocol { tag: Tag, code: ErrorCode },
    /// The response line was oversized or not a frame
    Framing,
    /// Called while a `send` or `poll` is already in progress
    Reentrancy,
    /// A command parameter is outside its documented range
    InvalidArgument,
    /// The response matched but its payload did not parse
    InvalidResponse,
}

impl Error {
    /// Vendor rejection, if this is one
    pub fn protocol(&self) -> Option<ProtocolError> {
        match *self {
            Error::Protocol { tag, code } => Some(ProtocolError { tag, code }),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Communication => f.write_str("transport failure"),
            Error::Timeout => f.write_str("timed out waiting for response"),
            Error::ChecksumInvalid => f.write_str("response checksum mismatch"),
            Error::Protocol { tag, code } => {
                write!(f, "{}: {}", ProtocolError { tag: *tag, code: *code }, code.description())
            }
            Error::Framing => f.write_str("malformed response line"),
            Error::Reentrancy => f.write_str("engine busy"),
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::InvalidResponse => f.write_str("unparseable response payload"),
        }
    }
}

/// Frame errors only arise while encoding a command, so they are the caller's
impl From<FrameError> for Error {
    fn from(_: FrameError) -> Self {
        Error::InvalidArgument
    }
}

impl From<ParseError> for Error {
    fn from(_: ParseError) -> Self {
        Error::InvalidResponse
    }
}
