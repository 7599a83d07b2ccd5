//! Swarm M138 Hardware Abstraction Layer
//!
//! The modem engine needs a byte stream and a millisecond clock, nothing
//! more. This crate defines that seam ([`Transport`]) and builds it from the
//! two physical links the M138 is reachable over:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  swarm-core (Modem engine)              │
//! └─────────────────────────────────────────┘
//!                     │ Transport
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ SerialTransport│      │ QwiicTransport│
//! │ UartTx + UartRx│      │ I2cBus @ 0x52 │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`clock::Clock`] - Monotonic milliseconds and blocking delay
//! - [`transport::Transport`] - What the engine consumes
//!
//! Optional features bridge `embedded-hal`, `embedded-io` and
//! `embassy-time` implementations onto these traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod i2c;
pub mod qwiic;
pub mod serial;
pub mod transport;
pub mod uart;

#[cfg(feature = "embassy-time")]
pub mod embassy;
#[cfg(feature = "embedded-hal")]
pub mod embedded_hal;
#[cfg(feature = "embedded-io")]
pub mod embedded_io;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use i2c::I2cBus;
pub use qwiic::{QwiicError, QwiicTransport};
pub use serial::SerialTransport;
pub use transport::Transport;
pub use uart::{UartRx, UartTx};
