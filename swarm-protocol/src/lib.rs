//! Swarm M138 Line Protocol
//!
//! This crate defines the text protocol spoken by the Swarm M138 satellite
//! modem. It is pure data handling: no I/O, no timing. The engine that drives
//! a real transport lives in `swarm-core`.
//!
//! # Protocol Overview
//!
//! Every command, response and unsolicited report is a single ASCII line:
//! ```text
//! ┌───┬───────┬───┬──────────────────┬───┬──────────┬────┐
//! │ $ │ TAG   │ ␠ │ PAYLOAD          │ * │ CHECKSUM │ \n │
//! │ 1 │ 2-4   │ 1 │ 0-504            │ 1 │ 2 (hex)  │ 1  │
//! └───┴───────┴───┴──────────────────┴───┴──────────┴────┘
//! ```
//!
//! The checksum is the XOR of every byte between `$` and `*`. Errors come
//! back on the same tag as `$XX ERR,<CODE>*CC`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod codes;
pub mod events;
pub mod fields;
pub mod frame;
pub mod line;
pub mod messages;
pub mod tag;

pub use codes::{ErrorCode, ProtocolError};
pub use events::{EventKind, ModemEvent};
pub use fields::ParseError;
pub use frame::{
    nmea_checksum, validate, validate_with, ChecksumFn, Frame, FrameError, Validation,
    MAX_ENCODED_LEN, MAX_LINE_LEN,
};
pub use line::{Line, LineBuffer};
pub use messages::{Command, Gpio1Mode, ReadTarget, Report, Retention, TransmitOptions};
pub use tag::Tag;
