//! Engine configuration type

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timeout class a command is sent under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutClass {
    /// Ordinary commands
    Command,
    /// Message store reads, counts and marks
    MessageRead,
    /// Message store deletes (the modem compacts its database)
    MessageDelete,
    /// `$TD` queueing
    Transmit,
}

/// Tunables for the protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Response deadline for ordinary commands (ms)
    pub command_timeout_ms: u32,
    /// Response deadline for message reads (ms)
    pub message_read_timeout_ms: u32,
    /// Response deadline for message deletes (ms)
    pub message_delete_timeout_ms: u32,
    /// Response deadline for `$TD` (ms)
    pub transmit_timeout_ms: u32,
    /// Inter-byte silence after which a partial line is flushed (ms)
    pub quiet_window_ms: u32,
    /// Most lines a single `poll()` will consume
    pub max_lines_per_poll: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 1000,
            message_read_timeout_ms: 2000,
            message_delete_timeout_ms: 5000,
            transmit_timeout_ms: 2000,
            quiet_window_ms: 1,
            max_lines_per_poll: 16,
        }
    }
}

impl EngineConfig {
    /// Deadline for a timeout class
    pub fn timeout_ms(&self, class: TimeoutClass) -> u32 {
        match class {
            TimeoutClass::Command => self.command_timeout_ms,
            TimeoutClass::MessageRead => self.message_read_timeout_ms,
            TimeoutClass::MessageDelete => self.message_delete_timeout_ms,
            TimeoutClass::Transmit => self.transmit_timeout_ms,
        }
    }
}
