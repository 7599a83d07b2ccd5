//! The byte stream the engine runs on

/// Bidirectional byte stream plus the time source the engine measures with
///
/// All methods are non-blocking except [`Transport::write_bytes`], which
/// returns once the bytes are handed to the link, and [`Transport::pause`],
/// which the engine calls while waiting for a response.
pub trait Transport {
    /// Link-level failure
    type Error;

    /// Bytes ready to read right now
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read one byte; only called after `bytes_available` reported data
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Write a complete command
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Monotonic milliseconds
    fn now_millis(&mut self) -> u64;

    /// Yield briefly while nothing is available
    fn pause(&mut self) {}
}
