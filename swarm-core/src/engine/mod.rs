//! The protocol engine
//!
//! ```text
//!             ┌──────────────┐
//!  transport ─▶│ LineReader   │─┬─▶ send(): Correlator ──▶ Result<Frame>
//!             └──────────────┘ │        │ non-matching unsolicited
//!                              │        ▼
//!                              │   ┌──────────┐
//!                              │   │ Backlog  │ (bounded, FIFO)
//!                              │   └──────────┘
//!                              │        │ oldest first
//!                              │        ▼
//!                              └─▶ poll(): Dispatcher ──▶ observers
//! ```
//!
//! One [`Modem`] owns every buffer it uses. Only one `send` or `poll` can be
//! in flight; the [`EngineState`] check at each entry point refuses the rest.

mod backlog;
mod correlator;
mod dispatcher;
mod observer;
mod reader;

pub use backlog::{Backlog, BacklogEntry};
pub use correlator::Expect;
pub(crate) use correlator::is_number;
pub use observer::{Observer, ObserverTable};
pub use reader::{LineReader, ReadEvent};

use swarm_hal::Transport;
use swarm_protocol::{nmea_checksum, validate_with, ChecksumFn, EventKind, Line, Validation};

use crate::config::{ConfigError, EngineConfig};
use crate::diagnostics::{Counter, Diagnostics};
use crate::error::Error;
use crate::state::{EngineEvent, EngineState};

/// Unsolicited lines held between a `send` and the next `poll`
pub const BACKLOG_CAPACITY: usize = 8;

/// Swarm M138 protocol engine
///
/// `C` is caller context reachable from observers through
/// [`Modem::context_mut`].
pub struct Modem<T, C = ()> {
    transport: T,
    context: C,
    config: EngineConfig,
    checksum: ChecksumFn,
    state: EngineState,
    reader: LineReader,
    backlog: Backlog<BACKLOG_CAPACITY>,
    observers: ObserverTable<T, C>,
    diagnostics: Diagnostics,
    next_seq: u32,
}

impl<T: Transport> Modem<T, ()> {
    /// Engine with default configuration and no context
    pub fn new(transport: T) -> Self {
        Self::with_context(transport, ())
    }
}

impl<T: Transport, C> Modem<T, C> {
    /// Engine with default configuration carrying `context`
    pub fn with_context(transport: T, context: C) -> Self {
        Self {
            transport,
            context,
            config: EngineConfig::default(),
            checksum: nmea_checksum,
            state: EngineState::Idle,
            reader: LineReader::new(),
            backlog: Backlog::new(),
            observers: ObserverTable::new(),
            diagnostics: Diagnostics::default(),
            next_seq: 0,
        }
    }

    /// Replace the configuration after validating it
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Use a different line checksum for both directions
    pub fn with_checksum(mut self, checksum: ChecksumFn) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn reset_diagnostics(&mut self) {
        self.diagnostics = Diagnostics::default();
    }

    /// Lines waiting for the next `poll()`
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Give back the transport and context
    pub fn release(self) -> (T, C) {
        (self.transport, self.context)
    }

    /// Register (or with `None`, clear) the observer for `kind`
    ///
    /// Returns the observer it replaced.
    pub fn set_observer(
        &mut self,
        kind: EventKind,
        observer: Option<Observer<T, C>>,
    ) -> Option<Observer<T, C>> {
        self.observers.set(kind, observer)
    }

    pub fn has_observer(&self, kind: EventKind) -> bool {
        self.observers.is_registered(kind)
    }

    /// Move from idle into a busy state, or refuse
    fn begin(&mut self, event: EngineEvent) -> Result<(), Error> {
        if !self.state.is_idle() {
            self.diagnostics.record(Counter::ReentrancyRejections);
            warn!("rejected re-entrant call while {}", self.state);
            return Err(Error::Reentrancy);
        }
        self.state = self.state.transition(event);
        Ok(())
    }

    fn end(&mut self, event: EngineEvent) {
        self.state = self.state.transition(event);
    }

    /// Next line from the transport, counting overflows on the way
    fn read_line(&mut self) -> Result<Option<Line>, Error> {
        self.read_line_holding(|_| false)
    }

    /// [`Modem::read_line`], keeping partial lines `hold` accepts buffered
    /// past the quiet window
    fn read_line_holding(&mut self, hold: impl Fn(&[u8]) -> bool) -> Result<Option<Line>, Error> {
        loop {
            match self.reader.poll_line_holding(
                &mut self.transport,
                self.config.quiet_window_ms,
                &hold,
            ) {
                Ok(Some(ReadEvent::Line(line))) => {
                    self.diagnostics.record(Counter::LinesReceived);
                    trace!("rx {=[u8]:a}", line.as_bytes());
                    return Ok(Some(line));
                }
                Ok(Some(ReadEvent::Overflow)) => {
                    self.diagnostics.record(Counter::FramingErrors);
                    warn!("dropped oversized line");
                }
                Ok(None) => return Ok(None),
                Err(_) => return Err(Error::Communication),
            }
        }
    }

    fn validate(&self, line: &Line) -> Validation {
        validate_with(line.from_start(), self.checksum)
    }

    /// Count a line that will never reach an observer or a caller
    fn discard(&mut self, validation: &Validation) {
        match validation {
            Validation::Valid(frame) => {
                self.diagnostics.record(Counter::UnrecognizedLines);
                debug!("no one waiting for {}", frame.tag());
            }
            Validation::ChecksumInvalid(tag) => {
                self.diagnostics.record(Counter::ChecksumFailures);
                warn!("checksum mismatch on {}", tag);
            }
            Validation::Unrecognized => {
                self.diagnostics.record(Counter::UnrecognizedLines);
                debug!("unrecognized line");
            }
            Validation::Malformed => {
                self.diagnostics.record(Counter::FramingErrors);
                debug!("malformed line");
            }
        }
    }

    /// Keep a valid unsolicited line for the next `poll()`; count the rest
    fn stash(&mut self, line: Line) {
        let validation = self.validate(&line);
        let kind = match &validation {
            Validation::Valid(frame) => EventKind::for_tag(frame.tag()),
            _ => None,
        };
        let Some(kind) = kind else {
            self.discard(&validation);
            return;
        };

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        if let Some(evicted) = self.backlog.offer(BacklogEntry { seq, line, kind }) {
            self.diagnostics.record(Counter::BacklogEvictions);
            warn!("backlog full, evicted line {}", evicted.seq);
        }
    }

    /// Drop backlog entries nobody is observing
    fn prune_backlog(&mut self) {
        let observers = &self.observers;
        let removed = self.backlog.retain(|entry| observers.is_registered(entry.kind));
        if removed > 0 {
            self.diagnostics
                .add(Counter::BacklogPruned, u32::try_from(removed).unwrap_or(u32::MAX));
            debug!("pruned {} unobserved backlog lines", removed);
        }
    }
}
