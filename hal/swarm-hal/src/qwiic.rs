//! Transport over the Qwiic I2C bridge
//!
//! The breakout's ATtiny841 buffers the modem UART and exposes it as two
//! registers:
//!
//! | Register | Read                         | Write                          |
//! |----------|------------------------------|--------------------------------|
//! | `0xFD`   | pending byte count (u16 BE)  | -                              |
//! | `0xFF`   | up to 8 buffered bytes       | bytes to send + u16 BE sum     |
//!
//! Writes are split into 29-byte packets (32-byte bus buffer minus register,
//! checksum MSB and checksum LSB); the 16-bit wrapping sum of every data byte
//! trails the final packet only.

use heapless::Deque;

use crate::clock::Clock;
use crate::i2c::I2cBus;
use crate::transport::Transport;

/// Factory address of the Qwiic breakout
pub const DEFAULT_ADDRESS: u8 = 0x52;

const LEN_REG: u8 = 0xFD;
const DATA_REG: u8 = 0xFF;

/// Bytes the bridge returns per read
const SER_PACKET_SIZE: usize = 8;

/// Host-side bus buffer; register and checksum take three of it
const I2C_BUFFER_LENGTH: usize = 32;
const WRITE_CHUNK: usize = I2C_BUFFER_LENGTH - 3;

/// Back-off after an empty length read, to keep bus traffic down
const POLLING_WAIT_MS: u64 = 2;

/// Local staging for bytes pulled off the bridge
const FIFO_LEN: usize = 64;

/// Error from the Qwiic transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QwiicError<E> {
    /// Underlying bus failure
    Bus(E),
    /// `read_byte` called with nothing buffered
    Empty,
}

/// [`Transport`] over the Qwiic breakout's register interface
pub struct QwiicTransport<B, C> {
    bus: B,
    clock: C,
    address: u8,
    fifo: Deque<u8, FIFO_LEN>,
    last_empty_check: Option<u64>,
}

impl<B, C> QwiicTransport<B, C>
where
    B: I2cBus,
    C: Clock,
{
    /// Transport at the factory address
    pub fn new(bus: B, clock: C) -> Self {
        Self::with_address(bus, clock, DEFAULT_ADDRESS)
    }

    pub fn with_address(bus: B, clock: C, address: u8) -> Self {
        Self {
            bus,
            clock,
            address,
            fifo: Deque::new(),
            last_empty_check: None,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the bus and clock
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    /// Ask the bridge how many bytes it holds
    fn pending(&mut self) -> Result<usize, QwiicError<B::Error>> {
        let mut len = [0u8; 2];
        self.bus
            .write(self.address, &[LEN_REG])
            .map_err(QwiicError::Bus)?;
        self.bus
            .read(self.address, &mut len)
            .map_err(QwiicError::Bus)?;
        Ok(usize::from(u16::from_be_bytes(len)))
    }

    /// Pull `count` bytes into the local FIFO, one packet at a time
    fn fill(&mut self, count: usize) -> Result<(), QwiicError<B::Error>> {
        self.bus
            .write(self.address, &[DATA_REG])
            .map_err(QwiicError::Bus)?;

        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(SER_PACKET_SIZE);
            let mut packet = [0u8; SER_PACKET_SIZE];
            self.bus
                .read(self.address, &mut packet[..chunk])
                .map_err(QwiicError::Bus)?;
            for &byte in &packet[..chunk] {
                // Space was reserved before reading
                let _ = self.fifo.push_back(byte);
            }
            remaining -= chunk;
        }
        Ok(())
    }
}

impl<B, C> Transport for QwiicTransport<B, C>
where
    B: I2cBus,
    C: Clock,
{
    type Error = QwiicError<B::Error>;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if !self.fifo.is_empty() {
            return Ok(self.fifo.len());
        }

        let now = self.clock.now_millis();
        if let Some(checked) = self.last_empty_check {
            if now.saturating_sub(checked) < POLLING_WAIT_MS {
                return Ok(0);
            }
        }

        let pending = self.pending()?;
        if pending == 0 {
            self.last_empty_check = Some(now);
            return Ok(0);
        }
        self.last_empty_check = None;

        let room = self.fifo.capacity() - self.fifo.len();
        self.fill(pending.min(room))?;
        Ok(self.fifo.len())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.fifo.pop_front().ok_or(QwiicError::Empty)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut checksum: u16 = 0;
        let mut chunks = bytes.chunks(WRITE_CHUNK).peekable();

        while let Some(chunk) = chunks.next() {
            let mut packet = [0u8; I2C_BUFFER_LENGTH];
            packet[0] = DATA_REG;
            packet[1..=chunk.len()].copy_from_slice(chunk);
            let mut len = 1 + chunk.len();

            for &byte in chunk {
                checksum = checksum.wrapping_add(u16::from(byte));
            }
            if chunks.peek().is_none() {
                packet[len..len + 2].copy_from_slice(&checksum.to_be_bytes());
                len += 2;
            }

            self.bus
                .write(self.address, &packet[..len])
                .map_err(QwiicError::Bus)?;
        }
        Ok(())
    }

    fn now_millis(&mut self) -> u64 {
        self.clock.now_millis()
    }

    fn pause(&mut self) {
        self.clock.delay_ms(POLLING_WAIT_MS as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Simulated bridge: answers LEN_REG and DATA_REG reads from a byte queue
    #[derive(Default)]
    struct MockBridge {
        pending: VecDeque<u8>,
        register: u8,
        writes: Vec<Vec<u8>>,
        len_reads: usize,
    }

    impl I2cBus for MockBridge {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            assert_eq!(address, DEFAULT_ADDRESS);
            self.register = data[0];
            self.writes.push(data.to_vec());
            Ok(())
        }

        fn read(&mut self, _address: u8, buf: &mut [u8]) -> Result<(), ()> {
            match self.register {
                LEN_REG => {
                    self.len_reads += 1;
                    buf.copy_from_slice(&(self.pending.len() as u16).to_be_bytes());
                }
                DATA_REG => {
                    assert!(buf.len() <= SER_PACKET_SIZE);
                    for slot in buf.iter_mut() {
                        *slot = self.pending.pop_front().ok_or(())?;
                    }
                }
                _ => return Err(()),
            }
            Ok(())
        }
    }

    struct ManualClock(u64);

    impl Clock for ManualClock {
        fn now_millis(&mut self) -> u64 {
            self.0
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0 += u64::from(ms);
        }
    }

    fn transport(rx: &[u8]) -> QwiicTransport<MockBridge, ManualClock> {
        let mut bridge = MockBridge::default();
        bridge.pending.extend(rx);
        QwiicTransport::new(bridge, ManualClock(0))
    }

    #[test]
    fn test_reads_in_packets() {
        let mut qwiic = transport(b"$M138 BOOT,RUNNING*2A\n");
        assert_eq!(qwiic.bytes_available(), Ok(22));

        let mut line = Vec::new();
        while qwiic.bytes_available().unwrap() > 0 {
            line.push(qwiic.read_byte().unwrap());
        }
        assert_eq!(line, b"$M138 BOOT,RUNNING*2A\n");
        assert_eq!(qwiic.read_byte(), Err(QwiicError::Empty));
    }

    #[test]
    fn test_fifo_capacity_bounds_fill() {
        let rx = [b'A'; FIFO_LEN + 10];
        let mut qwiic = transport(&rx);
        assert_eq!(qwiic.bytes_available(), Ok(FIFO_LEN));
        for _ in 0..FIFO_LEN {
            qwiic.read_byte().unwrap();
        }
        assert_eq!(qwiic.bytes_available(), Ok(10));
    }

    #[test]
    fn test_empty_poll_backs_off() {
        let mut qwiic = transport(b"");
        assert_eq!(qwiic.bytes_available(), Ok(0));
        assert_eq!(qwiic.bytes_available(), Ok(0));
        let (bridge, clock) = qwiic.release();
        assert_eq!(bridge.len_reads, 1);

        let mut qwiic = QwiicTransport::new(bridge, clock);
        qwiic.last_empty_check = Some(0);
        qwiic.pause();
        assert_eq!(qwiic.bytes_available(), Ok(0));
        let (bridge, _) = qwiic.release();
        assert_eq!(bridge.len_reads, 2);
    }

    #[test]
    fn test_short_write_has_checksum() {
        let mut qwiic = transport(b"");
        qwiic.write_bytes(b"$CS*10\n").unwrap();
        let (bridge, _) = qwiic.release();

        let sum: u16 = b"$CS*10\n".iter().map(|&b| u16::from(b)).sum();
        let mut expected = vec![DATA_REG];
        expected.extend_from_slice(b"$CS*10\n");
        expected.extend_from_slice(&sum.to_be_bytes());
        assert_eq!(bridge.writes, vec![expected]);
    }

    #[test]
    fn test_long_write_is_chunked() {
        let data = [0xFFu8; 70];
        let mut qwiic = transport(b"");
        qwiic.write_bytes(&data).unwrap();
        let (bridge, _) = qwiic.release();

        let lengths: Vec<usize> = bridge.writes.iter().map(|w| w.len()).collect();
        assert_eq!(lengths, vec![1 + 29, 1 + 29, 1 + 12 + 2]);
        assert!(bridge.writes.iter().all(|w| w[0] == DATA_REG));

        let last = bridge.writes.last().unwrap();
        let sum = 70u16 * 0xFF;
        assert_eq!(&last[last.len() - 2..], &sum.to_be_bytes());
    }

    #[test]
    fn test_exact_chunk_multiple() {
        let data = [b'x'; WRITE_CHUNK * 2];
        let mut qwiic = transport(b"");
        qwiic.write_bytes(&data).unwrap();
        let (bridge, _) = qwiic.release();
        let lengths: Vec<usize> = bridge.writes.iter().map(|w| w.len()).collect();
        assert_eq!(lengths, vec![1 + 29, 1 + 29 + 2]);
    }

    #[test]
    fn test_empty_write_sends_nothing() {
        let mut qwiic = transport(b"");
        qwiic.write_bytes(&[]).unwrap();
        let (bridge, _) = qwiic.release();
        assert!(bridge.writes.is_empty());
    }
}
