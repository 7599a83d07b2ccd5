//! Transport over a UART

use crate::clock::Clock;
use crate::transport::Transport;
use crate::uart::{UartRx, UartTx};

/// Delay between availability checks while the engine waits
const IDLE_PAUSE_MS: u32 = 1;

/// [`Transport`] over a full-duplex UART
pub struct SerialTransport<U, C> {
    uart: U,
    clock: C,
}

impl<U, C> SerialTransport<U, C> {
    pub fn new(uart: U, clock: C) -> Self {
        Self { uart, clock }
    }

    /// Give back the UART and clock
    pub fn release(self) -> (U, C) {
        (self.uart, self.clock)
    }
}

impl<U, C, E> Transport for SerialTransport<U, C>
where
    U: UartTx<Error = E> + UartRx<Error = E>,
    C: Clock,
{
    type Error = E;

    fn bytes_available(&mut self) -> Result<usize, E> {
        self.uart.bytes_available()
    }

    fn read_byte(&mut self) -> Result<u8, E> {
        self.uart.read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), E> {
        self.uart.write_blocking(bytes)?;
        self.uart.flush()
    }

    fn now_millis(&mut self) -> u64 {
        self.clock.now_millis()
    }

    fn pause(&mut self) {
        self.clock.delay_ms(IDLE_PAUSE_MS);
    }
}
