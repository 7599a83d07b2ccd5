//! Events that trigger engine state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineEvent {
    // Correlator events
    /// A command line was written to the transport
    CommandSent,
    /// The expected response arrived (or failed its checksum)
    ResponseMatched,
    /// The error prefix arrived
    ErrorMatched,
    /// The response deadline passed
    DeadlinePassed,

    // Dispatcher events
    /// `poll()` began draining lines
    PollStarted,
    /// `poll()` ran out of lines or budget
    PollFinished,

    /// Read or write on the transport failed
    TransportFailed,
}

impl EngineEvent {
    /// Check if this event ends a `send`
    pub fn ends_command(&self) -> bool {
        matches!(
            self,
            EngineEvent::ResponseMatched
                | EngineEvent::ErrorMatched
                | EngineEvent::DeadlinePassed
                | EngineEvent::TransportFailed
        )
    }
}
