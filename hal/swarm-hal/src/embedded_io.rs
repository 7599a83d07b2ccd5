//! `embedded-io` UART bridge

use ::embedded_io::{Read, ReadReady, Write};

use crate::uart::{UartRx, UartTx};

/// Wraps an `embedded-io` byte stream as [`UartTx`] + [`UartRx`]
///
/// `ReadReady` cannot count, so availability is reported as 1 or 0.
pub struct EmbeddedIoUart<S>(pub S);

impl<S: Write> UartTx for EmbeddedIoUart<S> {
    type Error = S::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

impl<S: Read + ReadReady> UartRx for EmbeddedIoUart<S> {
    type Error = S::Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(usize::from(self.0.read_ready()?))
    }

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.0.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}
