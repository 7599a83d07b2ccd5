//! Line reader
//!
//! Drains the transport into a [`LineBuffer`]. A line ends at `\n`, or when
//! bytes stop arriving for the quiet window while a partial line is pending.
//! Partial lines are delivered with `is_terminated() == false`.
//!
//! The transport clock ticks in whole milliseconds, so a tick can land
//! between two bytes of the same line. A partial line is only flushed once
//! the gap since its last byte is strictly longer than the window.

use swarm_hal::Transport;
use swarm_protocol::{Line, LineBuffer};

/// What one read attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    /// A complete or quiet-window-flushed line
    Line(Line),
    /// A line outgrew the buffer and was dropped
    Overflow,
}

/// Byte accumulator with quiet-window flushing
#[derive(Debug, Clone, Default)]
pub struct LineReader {
    buffer: LineBuffer,
    last_byte_ms: Option<u64>,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while part of a line is buffered
    pub fn has_partial(&self) -> bool {
        self.buffer.has_pending()
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.last_byte_ms = None;
    }

    /// Read at most one line
    ///
    /// Consumes transport bytes only up to the end of the first line, so
    /// later lines stay queued in the transport in arrival order.
    pub fn poll_line<T: Transport>(
        &mut self,
        transport: &mut T,
        quiet_window_ms: u32,
    ) -> Result<Option<ReadEvent>, T::Error> {
        self.poll_line_holding(transport, quiet_window_ms, |_| false)
    }

    /// Like [`LineReader::poll_line`], but a partial line for which `hold`
    /// returns true is kept until its terminator arrives
    ///
    /// `hold` sees the buffered bytes as received.
    pub fn poll_line_holding<T: Transport>(
        &mut self,
        transport: &mut T,
        quiet_window_ms: u32,
        hold: impl Fn(&[u8]) -> bool,
    ) -> Result<Option<ReadEvent>, T::Error> {
        let mut received = false;

        while transport.bytes_available()? > 0 {
            let byte = transport.read_byte()?;
            received = true;
            match self.buffer.feed(byte) {
                Ok(Some(line)) => {
                    self.last_byte_ms = Some(transport.now_millis());
                    return Ok(Some(ReadEvent::Line(line)));
                }
                Ok(None) => {}
                Err(_) => {
                    self.last_byte_ms = Some(transport.now_millis());
                    return Ok(Some(ReadEvent::Overflow));
                }
            }
        }

        let now = transport.now_millis();
        if received {
            self.last_byte_ms = Some(now);
            return Ok(None);
        }

        if self.buffer.has_pending() && !hold(self.buffer.pending()) {
            let last = self.last_byte_ms.unwrap_or(now);
            if now.saturating_sub(last) > u64::from(quiet_window_ms) {
                return Ok(self.buffer.take_partial().map(ReadEvent::Line));
            }
        }
        Ok(None)
    }
}
