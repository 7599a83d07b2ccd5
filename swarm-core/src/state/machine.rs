//! Engine state machine
//!
//! The engine is either idle, waiting on one command, or dispatching
//! unsolicited events. Every public entry point checks this first; that is
//! what turns a nested call from an observer into a `Reentrancy` error.

use super::events::EngineEvent;

/// Engine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Nothing in flight
    #[default]
    Idle,
    /// A command has been written and its response is awaited
    AwaitingResponse,
    /// `poll()` is draining lines and invoking observers
    Dispatching,
}

impl EngineState {
    /// Check if a new `send` or `poll` may start
    pub fn is_idle(&self) -> bool {
        matches!(self, EngineState::Idle)
    }

    /// Check if observers may be running
    pub fn is_dispatching(&self) -> bool {
        matches!(self, EngineState::Dispatching)
    }

    /// Process an event and return the next state
    ///
    /// Events that make no sense in the current state leave it unchanged;
    /// the caller detects a refused start by comparing the result.
    pub fn transition(self, event: EngineEvent) -> Self {
        use EngineEvent::*;
        use EngineState::*;

        match (self, event) {
            (Idle, CommandSent) => AwaitingResponse,
            (Idle, PollStarted) => Dispatching,

            (AwaitingResponse, ResponseMatched) => Idle,
            (AwaitingResponse, ErrorMatched) => Idle,
            (AwaitingResponse, DeadlinePassed) => Idle,
            (AwaitingResponse, TransportFailed) => Idle,

            (Dispatching, PollFinished) => Idle,
            (Dispatching, TransportFailed) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
