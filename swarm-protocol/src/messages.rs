//! Command encoding for the M138
//!
//! Every command is a [`Frame`]: a tag plus argument text. Argument
//! conventions shared by most tags:
//! - `@` asks for the most recent report now
//! - `?` asks for the current report rate
//! - a bare number sets the report rate in seconds (0 disables)

use core::fmt::Write;

use crate::events::DateTime;
use crate::fields;
use crate::frame::{Frame, FrameError};
use crate::tag::Tag;

/// Largest report rate the modem accepts, in seconds
pub const MAX_MESSAGE_RATE: u32 = 2_147_483_647;

/// Highest application ID available to users; 65000+ is vendor-reserved
pub const MAX_APP_ID: u16 = 64_999;

/// Longest hold duration for a queued message, in seconds
pub const MAX_HOLD_SECONDS: u32 = 34_819_200;

/// Maximum user payload per message, in bytes
pub const MAX_PAYLOAD_BYTES: usize = 192;

/// Maximum payload as ASCII hex
pub const MAX_HEX_PAYLOAD_LEN: usize = MAX_PAYLOAD_BYTES * 2;

/// Periodic reports with a configurable rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    DateTime,
    Jamming,
    Geospatial,
    FixQuality,
    PowerStatus,
    ReceiveTest,
}

impl Report {
    pub const fn tag(self) -> Tag {
        match self {
            Report::DateTime => Tag::Dt,
            Report::Jamming => Tag::Gj,
            Report::Geospatial => Tag::Gn,
            Report::FixQuality => Tag::Gs,
            Report::PowerStatus => Tag::Pw,
            Report::ReceiveTest => Tag::Rt,
        }
    }
}

/// GPIO1 pin function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gpio1Mode {
    /// Analog input (default)
    Analog = 0,
    /// Input: low-to-high edge exits sleep
    ExitSleepLowHigh = 1,
    /// Input: high-to-low edge exits sleep
    ExitSleepHighLow = 2,
    OutputLow = 3,
    OutputHigh = 4,
    /// Output: low while unread messages are pending
    MessagesPendingLow = 5,
    /// Output: high while unread messages are pending
    MessagesPendingHigh = 6,
    /// Output: low while asleep
    SleepModeLow = 7,
    /// Output: high while asleep
    SleepModeHigh = 8,
}

impl Gpio1Mode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Gpio1Mode::Analog,
            1 => Gpio1Mode::ExitSleepLowHigh,
            2 => Gpio1Mode::ExitSleepHighLow,
            3 => Gpio1Mode::OutputLow,
            4 => Gpio1Mode::OutputHigh,
            5 => Gpio1Mode::MessagesPendingLow,
            6 => Gpio1Mode::MessagesPendingHigh,
            7 => Gpio1Mode::SleepModeLow,
            8 => Gpio1Mode::SleepModeHigh,
            _ => return None,
        })
    }
}

/// Which received message to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadTarget {
    Id(u64),
    Oldest,
    Newest,
}

/// How long an unsent message may wait in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Retention {
    /// Modem default (48 hours)
    #[default]
    Default,
    /// Hold for this many seconds, at most [`MAX_HOLD_SECONDS`]
    Hold(u32),
    /// Expire at this Unix epoch second
    Expiry(u32),
}

/// Options for `$TD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitOptions {
    /// Application ID, at most [`MAX_APP_ID`]
    pub app_id: Option<u16>,
    pub retention: Retention,
}

impl TransmitOptions {
    fn check(&self) -> Result<(), FrameError> {
        if matches!(self.app_id, Some(id) if id > MAX_APP_ID) {
            return Err(FrameError::InvalidArgument);
        }
        if matches!(self.retention, Retention::Hold(secs) if secs > MAX_HOLD_SECONDS) {
            return Err(FrameError::InvalidArgument);
        }
        Ok(())
    }

    fn write_prefix<W: Write>(&self, out: &mut W) -> core::fmt::Result {
        if let Some(id) = self.app_id {
            write!(out, "AI={},", id)?;
        }
        match self.retention {
            Retention::Default => Ok(()),
            Retention::Hold(secs) => write!(out, "HD={},", secs),
            Retention::Expiry(epoch) => write!(out, "ET={},", epoch),
        }
    }
}

/// Commands understood by the modem
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// `$CS`: device ID and name
    ConfigurationSettings,
    /// `$FV`
    FirmwareVersion,
    /// `$XX @`: most recent report
    Query(Report),
    /// `$XX ?`: current report rate
    RateQuery(Report),
    /// `$XX <seconds>`
    SetRate(Report, u32),
    /// `$GP ?`
    Gpio1ModeQuery,
    /// `$GP <mode>`
    SetGpio1Mode(Gpio1Mode),
    /// `$GP @`: read pin level or voltage
    Gpio1Read,
    /// `$PO`
    PowerOff,
    /// `$RS` or `$RS deletedb`
    Restart { delete_db: bool },
    /// `$SL S=<seconds>`
    SleepFor(u32),
    /// `$SL U=[YYYY-MM-DDT]hh:mm:ss`
    SleepUntil { time: DateTime, with_date: bool },
    /// `$MM C=U` or `$MM C=*`
    RxCount { unread_only: bool },
    /// `$MM D=<id>`
    RxDelete(u64),
    /// `$MM D=R` or `$MM D=*`
    RxDeleteAll { read_only: bool },
    /// `$MM M=<id>`
    RxMark(u64),
    /// `$MM M=*`
    RxMarkAll,
    /// `$MM N=?`
    RxNotificationsQuery,
    /// `$MM N=E` or `$MM N=D`
    SetRxNotifications(bool),
    /// `$MM L=<id>`: read without marking
    RxList(u64),
    /// `$MM R=<id>`, `R=O`, `R=N`
    RxRead(ReadTarget),
    /// `$MT C=U`
    TxCount,
    /// `$MT D=<id>`
    TxDelete(u64),
    /// `$MT D=U`
    TxDeleteAll,
    /// `$MT L=<id>`
    TxList(u64),
    /// `$TD [..]"text"`
    TransmitText {
        text: &'a str,
        options: TransmitOptions,
    },
    /// `$TD [..]HEX`
    TransmitBytes {
        data: &'a [u8],
        options: TransmitOptions,
    },
}

impl Command<'_> {
    /// Tag the command is sent (and answered) on
    pub fn tag(&self) -> Tag {
        match self {
            Command::ConfigurationSettings => Tag::Cs,
            Command::FirmwareVersion => Tag::Fv,
            Command::Query(report) | Command::RateQuery(report) | Command::SetRate(report, _) => {
                report.tag()
            }
            Command::Gpio1ModeQuery | Command::SetGpio1Mode(_) | Command::Gpio1Read => Tag::Gp,
            Command::PowerOff => Tag::Po,
            Command::Restart { .. } => Tag::Rs,
            Command::SleepFor(_) | Command::SleepUntil { .. } => Tag::Sl,
            Command::RxCount { .. }
            | Command::RxDelete(_)
            | Command::RxDeleteAll { .. }
            | Command::RxMark(_)
            | Command::RxMarkAll
            | Command::RxNotificationsQuery
            | Command::SetRxNotifications(_)
            | Command::RxList(_)
            | Command::RxRead(_) => Tag::Mm,
            Command::TxCount | Command::TxDelete(_) | Command::TxDeleteAll | Command::TxList(_) => {
                Tag::Mt
            }
            Command::TransmitText { .. } | Command::TransmitBytes { .. } => Tag::Td,
        }
    }

    /// Encode this command into a frame
    ///
    /// Parameters outside the modem's documented ranges are rejected here
    /// with [`FrameError::InvalidArgument`], before anything is sent.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut frame = Frame::empty(self.tag());
        let out = frame.payload_mut();

        let written = match self {
            Command::ConfigurationSettings | Command::FirmwareVersion | Command::PowerOff => Ok(()),
            Command::Query(_) | Command::Gpio1Read => out.write_str("@"),
            Command::RateQuery(_) | Command::Gpio1ModeQuery => out.write_str("?"),
            Command::SetRate(_, rate) => {
                if *rate > MAX_MESSAGE_RATE {
                    return Err(FrameError::InvalidArgument);
                }
                write!(out, "{}", rate)
            }
            Command::SetGpio1Mode(mode) => write!(out, "{}", *mode as u8),
            Command::Restart { delete_db } => {
                if *delete_db {
                    out.write_str("deletedb")
                } else {
                    Ok(())
                }
            }
            Command::SleepFor(seconds) => write!(out, "S={}", seconds),
            Command::SleepUntil { time, with_date } => {
                if !time.is_in_range() {
                    return Err(FrameError::InvalidArgument);
                }
                out.write_str("U=")
                    .and_then(|_| {
                        if *with_date {
                            time.write_iso_date(out)?;
                            out.write_str("T")
                        } else {
                            Ok(())
                        }
                    })
                    .and_then(|_| time.write_iso_time(out))
            }
            Command::RxCount { unread_only } => {
                out.write_str(if *unread_only { "C=U" } else { "C=*" })
            }
            Command::RxDelete(id) => write!(out, "D={}", id),
            Command::RxDeleteAll { read_only } => {
                out.write_str(if *read_only { "D=R" } else { "D=*" })
            }
            Command::RxMark(id) => write!(out, "M={}", id),
            Command::RxMarkAll => out.write_str("M=*"),
            Command::RxNotificationsQuery => out.write_str("N=?"),
            Command::SetRxNotifications(enabled) => {
                out.write_str(if *enabled { "N=E" } else { "N=D" })
            }
            Command::RxList(id) => write!(out, "L={}", id),
            Command::RxRead(ReadTarget::Id(id)) => write!(out, "R={}", id),
            Command::RxRead(ReadTarget::Oldest) => out.write_str("R=O"),
            Command::RxRead(ReadTarget::Newest) => out.write_str("R=N"),
            Command::TxCount => out.write_str("C=U"),
            Command::TxDelete(id) => write!(out, "D={}", id),
            Command::TxDeleteAll => out.write_str("D=U"),
            Command::TxList(id) => write!(out, "L={}", id),
            Command::TransmitText { text, options } => {
                options.check()?;
                if text.len() > MAX_PAYLOAD_BYTES
                    || !text.bytes().all(|b| (b' '..=b'~').contains(&b))
                {
                    return Err(FrameError::InvalidArgument);
                }
                options
                    .write_prefix(out)
                    .and_then(|_| write!(out, "\"{}\"", text))
            }
            Command::TransmitBytes { data, options } => {
                options.check()?;
                if data.is_empty() || data.len() > MAX_PAYLOAD_BYTES {
                    return Err(FrameError::InvalidArgument);
                }
                options.write_prefix(out).map_err(|_| FrameError::LineTooLong)?;
                fields::encode_hex(data, out).map_err(|_| FrameError::LineTooLong)?;
                Ok(())
            }
        };

        written.map_err(|_| FrameError::LineTooLong)?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(command: Command<'_>) -> std::string::String {
        let frame = command.to_frame().unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        std::string::String::from_utf8(encoded.to_vec()).unwrap()
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(wire(Command::ConfigurationSettings), "$CS*10\n");
        assert_eq!(wire(Command::Query(Report::DateTime)), "$DT @*70\n");
        assert!(wire(Command::RateQuery(Report::Geospatial)).starts_with("$GN ?*"));
        assert!(wire(Command::SetRate(Report::PowerStatus, 60)).starts_with("$PW 60*"));
        assert!(wire(Command::Restart { delete_db: true }).starts_with("$RS deletedb*"));
        assert!(wire(Command::Restart { delete_db: false }).starts_with("$RS*"));
    }

    #[test]
    fn test_rate_limit() {
        assert_eq!(
            Command::SetRate(Report::DateTime, MAX_MESSAGE_RATE + 1).to_frame(),
            Err(FrameError::InvalidArgument)
        );
        assert!(Command::SetRate(Report::DateTime, MAX_MESSAGE_RATE).to_frame().is_ok());
    }

    #[test]
    fn test_message_store_commands() {
        assert!(wire(Command::RxCount { unread_only: false }).starts_with("$MM C=**"));
        assert!(wire(Command::RxDeleteAll { read_only: true }).starts_with("$MM D=R*"));
        assert!(wire(Command::RxRead(ReadTarget::Id(5354)))
            .starts_with("$MM R=5354*"));
        assert!(wire(Command::RxRead(ReadTarget::Newest)).starts_with("$MM R=N*"));
        assert!(wire(Command::TxDeleteAll).starts_with("$MT D=U*"));
    }

    #[test]
    fn test_sleep_until() {
        let time = DateTime { year: 2022, month: 3, day: 7, hour: 4, minute: 5, second: 6 };
        assert!(wire(Command::SleepUntil { time, with_date: true })
            .starts_with("$SL U=2022-03-07T04:05:06*"));
        assert!(wire(Command::SleepUntil { time, with_date: false })
            .starts_with("$SL U=04:05:06*"));
    }

    #[test]
    fn test_transmit_text() {
        let options = TransmitOptions {
            app_id: Some(1234),
            retention: Retention::Hold(3600),
        };
        let line = wire(Command::TransmitText { text: "Hello World", options });
        assert!(line.starts_with("$TD AI=1234,HD=3600,\"Hello World\"*"));
    }

    #[test]
    fn test_transmit_bytes() {
        let options = TransmitOptions {
            app_id: None,
            retention: Retention::Expiry(1_700_000_000),
        };
        let line = wire(Command::TransmitBytes { data: &[0x00, 0xAB, 0xFF], options });
        assert!(line.starts_with("$TD ET=1700000000,00ABFF*"));
    }

    #[test]
    fn test_transmit_rejects_bad_options() {
        let bad_app = TransmitOptions { app_id: Some(65000), ..Default::default() };
        assert_eq!(
            Command::TransmitText { text: "x", options: bad_app }.to_frame(),
            Err(FrameError::InvalidArgument)
        );

        let bad_hold = TransmitOptions {
            app_id: None,
            retention: Retention::Hold(MAX_HOLD_SECONDS + 1),
        };
        assert_eq!(
            Command::TransmitBytes { data: &[1], options: bad_hold }.to_frame(),
            Err(FrameError::InvalidArgument)
        );

        let long = [0u8; MAX_PAYLOAD_BYTES + 1];
        assert_eq!(
            Command::TransmitBytes { data: &long, options: TransmitOptions::default() }
                .to_frame(),
            Err(FrameError::InvalidArgument)
        );
    }

    #[test]
    fn test_max_payload_fits_line() {
        let data = [0x5Au8; MAX_PAYLOAD_BYTES];
        let options = TransmitOptions {
            app_id: Some(MAX_APP_ID),
            retention: Retention::Hold(MAX_HOLD_SECONDS),
        };
        let frame = Command::TransmitBytes { data: &data, options }.to_frame().unwrap();
        assert!(frame.encode_to_vec().is_ok());
    }

    #[test]
    fn test_gpio_mode_roundtrip() {
        for value in 0..=8u8 {
            let mode = Gpio1Mode::from_u8(value).unwrap();
            assert_eq!(mode as u8, value);
        }
        assert_eq!(Gpio1Mode::from_u8(9), None);
    }
}
