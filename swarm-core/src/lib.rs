//! Protocol engine for the Swarm M138 satellite modem
//!
//! This crate drives the modem's line protocol over any
//! [`swarm_hal::Transport`]:
//!
//! - Line reader with quiet-window flushing of partial lines
//! - Command/response correlation with per-command deadlines
//! - Unsolicited event dispatch to per-kind observers
//! - Bounded backlog for reports that arrive mid-command
//! - Typed wrappers for every vendor command
//! - Diagnostics counters and a persisted engine configuration
//!
//! ```ignore
//! let mut modem = Modem::new(SerialTransport::new(uart, clock));
//! modem.set_observer(EventKind::Geospatial, Some(on_fix));
//! let id = modem.device_id()?;
//! loop {
//!     modem.poll()?;
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod state;

#[cfg(test)]
mod mock;

pub use commands::{DeviceInfo, Gpio1Level, RxMessage, StoredMessage, TxMessage};
pub use config::{EngineConfig, TimeoutClass};
pub use diagnostics::Diagnostics;
pub use engine::{Expect, Modem, Observer};
pub use error::Error;

pub use swarm_hal;
pub use swarm_protocol;
