//! Engine health counters
//!
//! Unsolicited traffic has no caller to report problems to, so the engine
//! counts them here instead. All counters saturate.

/// Counters kept by a [`crate::Modem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Lines produced by the line reader, including partial ones
    pub lines_received: u32,
    /// Oversized lines and lines that are not frames
    pub framing_errors: u32,
    /// Lines with a known tag and a bad checksum
    pub checksum_failures: u32,
    /// Lines with no `$`, an unknown tag, or an answer nobody was waiting for
    pub unrecognized_lines: u32,
    /// Valid unsolicited lines whose payload did not parse
    pub malformed_events: u32,
    /// Events handed to an observer
    pub events_dispatched: u32,
    /// Backlog entries lost to overflow
    pub backlog_evictions: u32,
    /// Backlog entries discarded because nobody observes their kind
    pub backlog_pruned: u32,
    /// `send`/`poll` calls refused because the engine was busy
    pub reentrancy_rejections: u32,
}

/// Which counter to bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Counter {
    LinesReceived,
    FramingErrors,
    ChecksumFailures,
    UnrecognizedLines,
    MalformedEvents,
    EventsDispatched,
    BacklogEvictions,
    BacklogPruned,
    ReentrancyRejections,
}

impl Diagnostics {
    pub(crate) fn record(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    pub(crate) fn add(&mut self, counter: Counter, n: u32) {
        let slot = match counter {
            Counter::LinesReceived => &mut self.lines_received,
            Counter::FramingErrors => &mut self.framing_errors,
            Counter::ChecksumFailures => &mut self.checksum_failures,
            Counter::UnrecognizedLines => &mut self.unrecognized_lines,
            Counter::MalformedEvents => &mut self.malformed_events,
            Counter::EventsDispatched => &mut self.events_dispatched,
            Counter::BacklogEvictions => &mut self.backlog_evictions,
            Counter::BacklogPruned => &mut self.backlog_pruned,
            Counter::ReentrancyRejections => &mut self.reentrancy_rejections,
        };
        *slot = slot.saturating_add(n);
    }

    /// Lines that were received but never reached an observer or a caller
    pub fn lines_dropped(&self) -> u32 {
        self.framing_errors
            .saturating_add(self.checksum_failures)
            .saturating_add(self.unrecognized_lines)
            .saturating_add(self.malformed_events)
            .saturating_add(self.backlog_evictions)
            .saturating_add(self.backlog_pruned)
    }
}
