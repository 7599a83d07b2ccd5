//! UART serial communication abstractions
//!
//! Provides traits for non-blocking serial reception and blocking
//! transmission that chip-specific HALs implement. The M138 runs its UART
//! at 115200 8N1.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Number of bytes that can be read without blocking
    ///
    /// Implementations that cannot count may report 1 while data is ready.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled or an error occurs.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}
