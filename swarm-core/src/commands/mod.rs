//! Typed vendor commands
//!
//! Each method is one [`Modem::send`] round trip: the command is encoded
//! from a [`Command`], the answer is matched on its documented prefix under
//! the configured timeout class, and the payload is parsed into a typed
//! value. Payloads that match but do not parse come back as
//! [`Error::InvalidResponse`].

mod messages;
mod status;

use core::fmt::Write;

use heapless::{String, Vec};
use swarm_hal::Transport;
use swarm_protocol::fields::{self, ParseError};
use swarm_protocol::messages::{MAX_HEX_PAYLOAD_LEN, MAX_PAYLOAD_BYTES};
use swarm_protocol::{Command, Frame, Tag};

use crate::config::TimeoutClass;
use crate::engine::{is_number, Expect, Modem};
use crate::error::Error;

/// Capacity for the `$CS` and `$FV` text answers
pub const MAX_SETTINGS_LEN: usize = 64;

/// Capacity for the device name in `$CS`
pub const MAX_DEVICE_NAME_LEN: usize = 32;

/// Identity reported by `$CS`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    pub id: u32,
    /// Empty if the modem did not report one
    pub name: String<MAX_DEVICE_NAME_LEN>,
}

impl DeviceInfo {
    /// Parse `DI=0x<hex>,DN=<name>`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut id = None;
        let mut name = String::new();
        for field in payload.split(',') {
            if let Ok(hex) = fields::keyed(field, "DI") {
                id = Some(fields::hex_u32(hex)?);
            } else if let Ok(text) = fields::keyed(field, "DN") {
                name = fields::text(text)?;
            }
        }
        Ok(Self {
            id: id.ok_or(ParseError::MissingKey)?,
            name,
        })
    }
}

/// GPIO1 reading from `$GP @`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gpio1Level {
    Low,
    High,
    /// Analog mode reading
    Volts(f32),
}

impl Gpio1Level {
    /// Parse `L`, `H` or `<volts>V`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        match payload {
            "L" => Ok(Gpio1Level::Low),
            "H" => Ok(Gpio1Level::High),
            _ => {
                let volts = payload.strip_suffix('V').ok_or(ParseError::UnknownValue)?;
                fields::number_in(volts, 0.0, f32::MAX).map(Gpio1Level::Volts)
            }
        }
    }

    fn looks_like(text: &str) -> bool {
        matches!(text, "L" | "H") || text.ends_with('V')
    }
}

/// A message held in the modem's receive or transmit store
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredMessage {
    pub id: u64,
    pub app_id: Option<u16>,
    /// Payload as ASCII hex
    pub payload_hex: String<MAX_HEX_PAYLOAD_LEN>,
    /// Unix time the message was received or queued
    pub epoch: Option<u32>,
}

/// A message read back with `$MM L=` or `$MM R=`
pub type RxMessage = StoredMessage;

/// An unsent message listed with `$MT L=`
pub type TxMessage = StoredMessage;

impl StoredMessage {
    /// Parse `[AI=n,]HEX,ID[,EPOCH]`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut parts = payload.split(',');
        let mut field = parts.next().ok_or(ParseError::FieldCount)?;

        let app_id = if field.starts_with("AI=") {
            let id = fields::keyed_number(field, "AI")?;
            field = parts.next().ok_or(ParseError::FieldCount)?;
            Some(id)
        } else {
            None
        };

        let payload_hex = fields::hex_text(field)?;
        let id = fields::number(parts.next().ok_or(ParseError::FieldCount)?)?;
        let epoch = parts.next().map(fields::number).transpose()?;
        if parts.next().is_some() {
            return Err(ParseError::FieldCount);
        }

        Ok(Self {
            id,
            app_id,
            payload_hex,
            epoch,
        })
    }

    /// Decoded payload bytes
    pub fn payload_bytes(&self) -> Result<Vec<u8, MAX_PAYLOAD_BYTES>, ParseError> {
        fields::decode_hex(&self.payload_hex)
    }
}

/// `$XX <suffix>`, the raw line prefix of an answer on `tag`
///
/// `None` if it does not fit; the longest in use is `$MM DELETED`.
fn prefix(tag: Tag, suffix: &str) -> Option<String<16>> {
    let mut out = String::new();
    write!(out, "${} {}", tag.mnemonic(), suffix).ok()?;
    Some(out)
}

impl<T: Transport, C> Modem<T, C> {
    /// Send `command`, accepting the first line that starts with `$XX <response>`
    fn execute(
        &mut self,
        command: &Command<'_>,
        response: &str,
        class: TimeoutClass,
        accept: Option<fn(&str) -> bool>,
    ) -> Result<Frame, Error> {
        let frame = command.to_frame()?;
        let tag = command.tag();
        let response = prefix(tag, response).ok_or(Error::InvalidArgument)?;
        let expect = Expect {
            accept,
            ..Expect::on(tag, &response, self.config().timeout_ms(class))
        };
        self.send(&frame, &expect)
    }

    /// Commands answered with `$XX OK*`
    fn acknowledged(&mut self, command: &Command<'_>, class: TimeoutClass) -> Result<(), Error> {
        self.execute(command, "OK*", class, None).map(|_| ())
    }

    /// Commands answered with a bare count
    fn counted(&mut self, command: &Command<'_>, class: TimeoutClass) -> Result<u32, Error> {
        let frame = self.execute(command, "", class, Some(is_number))?;
        Ok(fields::number(frame.payload())?)
    }
}
