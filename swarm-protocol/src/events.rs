//! Unsolicited modem reports
//!
//! Ten report categories arrive without a command: the periodic reports
//! whose rate is set with `$XX <seconds>`, plus received data, sleep wake,
//! boot/status messages and transmit confirmations. Each has a payload
//! parser; the periodic ones share it with the `$XX @` query response.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::fields::{self, ParseError};
use crate::frame::Frame;
use crate::messages::{MAX_HEX_PAYLOAD_LEN, MAX_PAYLOAD_BYTES};
use crate::tag::Tag;

/// Capacity for free text carried by `$M138` reports
pub const MAX_STATUS_TEXT_LEN: usize = 128;

/// Observer slot an event is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    DateTime,
    Jamming,
    Geospatial,
    FixQuality,
    PowerStatus,
    ReceivedMessage,
    ReceiveTest,
    SleepWake,
    ModemStatus,
    TransmitSent,
}

impl EventKind {
    /// Number of event kinds (observer table size)
    pub const COUNT: usize = 10;

    /// Every kind, indexed by [`EventKind::index`]
    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::DateTime,
        EventKind::Jamming,
        EventKind::Geospatial,
        EventKind::FixQuality,
        EventKind::PowerStatus,
        EventKind::ReceivedMessage,
        EventKind::ReceiveTest,
        EventKind::SleepWake,
        EventKind::ModemStatus,
        EventKind::TransmitSent,
    ];

    /// Stable table index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The kind carried on an unsolicited tag
    pub const fn for_tag(tag: Tag) -> Option<Self> {
        match tag {
            Tag::Dt => Some(EventKind::DateTime),
            Tag::Gj => Some(EventKind::Jamming),
            Tag::Gn => Some(EventKind::Geospatial),
            Tag::Gs => Some(EventKind::FixQuality),
            Tag::Pw => Some(EventKind::PowerStatus),
            Tag::Rd => Some(EventKind::ReceivedMessage),
            Tag::Rt => Some(EventKind::ReceiveTest),
            Tag::Sl => Some(EventKind::SleepWake),
            Tag::M138 => Some(EventKind::ModemStatus),
            Tag::Td => Some(EventKind::TransmitSent),
            _ => None,
        }
    }
}

/// Calendar date and time (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Parse the compact `YYYYMMDDhhmmss` form used by `$DT`
    pub fn parse_compact(text: &str) -> Result<Self, ParseError> {
        if text.len() != 14 || !text.is_ascii() {
            return Err(ParseError::InvalidNumber);
        }
        Ok(Self {
            year: fields::digits(&text[0..4], 4)?,
            month: fields::digits(&text[4..6], 2)? as u8,
            day: fields::digits(&text[6..8], 2)? as u8,
            hour: fields::digits(&text[8..10], 2)? as u8,
            minute: fields::digits(&text[10..12], 2)? as u8,
            second: fields::digits(&text[12..14], 2)? as u8,
        })
    }

    /// Parse the ISO `YYYY-MM-DDThh:mm:ss` form used by `$RT`
    pub fn parse_iso(text: &str) -> Result<Self, ParseError> {
        let bytes = text.as_bytes();
        if bytes.len() != 19
            || !text.is_ascii()
            || bytes[4] != b'-'
            || bytes[7] != b'-'
            || bytes[10] != b'T'
            || bytes[13] != b':'
            || bytes[16] != b':'
        {
            return Err(ParseError::InvalidNumber);
        }
        Ok(Self {
            year: fields::digits(&text[0..4], 4)?,
            month: fields::digits(&text[5..7], 2)? as u8,
            day: fields::digits(&text[8..10], 2)? as u8,
            hour: fields::digits(&text[11..13], 2)? as u8,
            minute: fields::digits(&text[14..16], 2)? as u8,
            second: fields::digits(&text[17..19], 2)? as u8,
        })
    }

    /// Whether every field lies in its calendar range
    pub fn is_in_range(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 60
    }

    /// Write the compact form
    pub fn write_compact<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// Write the ISO date (`YYYY-MM-DD`)
    pub fn write_iso_date<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Write the ISO time of day (`hh:mm:ss`)
    pub fn write_iso_time<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// `$DT` report: time plus the modem's validity flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTimeStatus {
    pub time: DateTime,
    /// `V` (valid) or `I` (invalid)
    pub valid: bool,
}

impl DateTimeStatus {
    /// Parse `YYYYMMDDhhmmss,V|I`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let [stamp, flag] = fields::split_exact::<2>(payload)?;
        let valid = match flag {
            "V" => true,
            "I" => false,
            _ => return Err(ParseError::UnknownValue),
        };
        let time = DateTime::parse_compact(stamp)?;
        // An invalid clock may report zeros; only a claimed-valid time is range checked
        if valid && !time.is_in_range() {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self { time, valid })
    }

    pub fn write_payload<W: Write>(&self, out: &mut W) -> fmt::Result {
        self.time.write_compact(out)?;
        out.write_str(if self.valid { ",V" } else { ",I" })
    }
}

/// `$GJ` report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JammingIndication {
    /// 0 unknown, 1 no spoofing, 2 spoofing indicated, 3 multiple indications
    pub spoof_state: u8,
    /// 0 (none) to 255 (strong)
    pub jamming_level: u8,
}

impl JammingIndication {
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let [spoof, level] = fields::split_exact::<2>(payload)?;
        Ok(Self {
            spoof_state: fields::number_in(spoof, 0, 3)?,
            jamming_level: fields::number(level)?,
        })
    }
}

/// `$GN` report
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeospatialData {
    /// Degrees, -90..=90
    pub latitude: f32,
    /// Degrees, -180..=180
    pub longitude: f32,
    /// Meters
    pub altitude: f32,
    /// Degrees from north, 0..=359
    pub course: u16,
    /// km/h
    pub speed: f32,
}

impl GeospatialData {
    /// Parse `lat,lon,alt,course,speed`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let [lat, lon, alt, course, speed] = fields::split_exact::<5>(payload)?;
        Ok(Self {
            latitude: fields::number_in(lat, -90.0, 90.0)?,
            longitude: fields::number_in(lon, -180.0, 180.0)?,
            altitude: fields::number(alt)?,
            course: fields::number_in(course, 0, 359)?,
            speed: fields::number_in(speed, 0.0, f32::MAX)?,
        })
    }

    /// Write the payload at wire precision (1e-4 degree, 1 m, 1 km/h)
    pub fn write_payload<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "{:.4},{:.4},{:.0},{},{:.0}",
            self.latitude, self.longitude, self.altitude, self.course, self.speed
        )
    }
}

/// GNSS fix type reported by `$GS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixType {
    /// `NF`
    NoFix,
    /// `DR`
    DeadReckoning,
    /// `G2`
    Standalone2D,
    /// `G3`
    Standalone3D,
    /// `D2`
    Differential2D,
    /// `D3`
    Differential3D,
    /// `RK`
    GnssDeadReckoning,
    /// `TT`
    TimeOnly,
}

impl FixType {
    const TABLE: [(FixType, &'static str); 8] = [
        (FixType::NoFix, "NF"),
        (FixType::DeadReckoning, "DR"),
        (FixType::Standalone2D, "G2"),
        (FixType::Standalone3D, "G3"),
        (FixType::Differential2D, "D2"),
        (FixType::Differential3D, "D3"),
        (FixType::GnssDeadReckoning, "RK"),
        (FixType::TimeOnly, "TT"),
    ];

    pub fn from_code(code: &str) -> Result<Self, ParseError> {
        Self::TABLE
            .iter()
            .find(|(_, text)| *text == code)
            .map(|(fix, _)| *fix)
            .ok_or(ParseError::UnknownValue)
    }

    pub fn code(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(fix, _)| *fix == self)
            .map(|(_, text)| *text)
            .unwrap_or("NF")
    }
}

/// `$GS` report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixQuality {
    /// Horizontal dilution of precision ×100
    pub hdop: u16,
    /// Vertical dilution of precision ×100
    pub vdop: u16,
    pub gnss_sats: u8,
    pub unused: u8,
    pub fix_type: FixType,
}

impl FixQuality {
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let [hdop, vdop, sats, unused, fix] = fields::split_exact::<5>(payload)?;
        Ok(Self {
            hdop: fields::number(hdop)?,
            vdop: fields::number(vdop)?,
            gnss_sats: fields::number(sats)?,
            unused: fields::number(unused)?,
            fix_type: FixType::from_code(fix)?,
        })
    }

    pub fn write_payload<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "{},{},{},{},{}",
            self.hdop,
            self.vdop,
            self.gnss_sats,
            self.unused,
            self.fix_type.code()
        )
    }
}

/// `$PW` report
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerStatus {
    /// CPU supply, volts
    pub cpu_volts: f32,
    pub unused1: f32,
    pub unused2: f32,
    pub unused3: f32,
    /// CPU temperature, °C
    pub temperature: f32,
}

impl PowerStatus {
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let [volts, u1, u2, u3, temp] = fields::split_exact::<5>(payload)?;
        Ok(Self {
            cpu_volts: fields::number(volts)?,
            unused1: fields::number(u1)?,
            unused2: fields::number(u2)?,
            unused3: fields::number(u3)?,
            temperature: fields::number(temp)?,
        })
    }
}

/// `$RD` report: a message received from the satellite
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedData {
    pub app_id: Option<u16>,
    /// dBm
    pub rssi: i16,
    /// dB
    pub snr: i16,
    /// Hz
    pub fdev: i16,
    /// Payload as ASCII hex
    pub payload_hex: String<MAX_HEX_PAYLOAD_LEN>,
}

impl ReceivedData {
    /// Parse `[AI=n,]RSSI=n,SNR=n,FDEV=n,HEX`
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

        let rssi = fields::keyed_number(field, "RSSI")?;
        let snr = fields::keyed_number(parts.next().ok_or(ParseError::FieldCount)?, "SNR")?;
        let fdev = fields::keyed_number(parts.next().ok_or(ParseError::FieldCount)?, "FDEV")?;
        let hex = parts.next().ok_or(ParseError::FieldCount)?;
        if parts.next().is_some() {
            return Err(ParseError::FieldCount);
        }

        Ok(Self {
            app_id,
            rssi,
            snr,
            fdev,
            payload_hex: fields::hex_text(hex)?,
        })
    }

    /// Decoded payload bytes
    pub fn payload_bytes(&self) -> Result<Vec<u8, MAX_PAYLOAD_BYTES>, ParseError> {
        fields::decode_hex(&self.payload_hex)
    }
}

/// `$RT` report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveTest {
    /// No satellite packet; background noise only
    Background { rssi: i16 },
    /// A satellite packet was heard
    Satellite {
        rssi: i16,
        snr: i16,
        fdev: i16,
        time: DateTime,
        satellite_id: u32,
    },
}

impl ReceiveTest {
    /// Parse `RSSI=n` or `RSSI=n,SNR=n,FDEV=n,TS=...,DI=0x...`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        if !payload.contains(',') {
            return Ok(ReceiveTest::Background {
                rssi: fields::keyed_number(payload, "RSSI")?,
            });
        }
        let [rssi, snr, fdev, ts, di] = fields::split_exact::<5>(payload)?;
        Ok(ReceiveTest::Satellite {
            rssi: fields::keyed_number(rssi, "RSSI")?,
            snr: fields::keyed_number(snr, "SNR")?,
            fdev: fields::keyed_number(fdev, "FDEV")?,
            time: DateTime::parse_iso(fields::keyed(ts, "TS")?)?,
            satellite_id: fields::hex_u32(fields::keyed(di, "DI")?)?,
        })
    }
}

/// Why the modem left sleep mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeCause {
    /// GPIO1 edge
    Gpio,
    /// Serial activity
    Serial,
    /// Sleep timer expired
    Time,
}

impl WakeCause {
    /// Parse `WAKE,GPIO|SERIAL|TIME`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let mut parts = payload.split(',');
        if parts.next() != Some("WAKE") {
            return Err(ParseError::UnknownValue);
        }
        let cause = parts.next().ok_or(ParseError::FieldCount)?;
        match cause.split(' ').next().unwrap_or("") {
            "GPIO" => Ok(WakeCause::Gpio),
            "SERIAL" => Ok(WakeCause::Serial),
            "TIME" => Ok(WakeCause::Time),
            _ => Err(ParseError::UnknownValue),
        }
    }
}

/// `$M138` status categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemStatus {
    BootAbort,
    BootDeviceId,
    BootPowerOn,
    BootRunning,
    BootUpdated,
    BootVersion,
    BootRestart,
    BootShutdown,
    /// First valid GPS time
    DateTime,
    /// First valid GPS position
    Position,
    Debug,
    Error,
    Unknown,
}

/// `$M138` report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub status: ModemStatus,
    pub text: Option<String<MAX_STATUS_TEXT_LEN>>,
}

impl StatusReport {
    /// Parse `BOOT,<stage>[,text]`, `DATETIME`, `POSITION`, `DEBUG,text`, `ERROR,text`
    ///
    /// Anything else is kept verbatim as [`ModemStatus::Unknown`]. Over-long
    /// text is truncated.
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let (head, tail) = split_once(payload);
        let (status, text) = match head {
            "BOOT" => {
                let (stage, extra) = split_once(tail.unwrap_or(""));
                let status = match stage {
                    "ABORT" => ModemStatus::BootAbort,
                    "DEVICEID" => ModemStatus::BootDeviceId,
                    "POWERON" => ModemStatus::BootPowerOn,
                    "RUNNING" => ModemStatus::BootRunning,
                    "UPDATED" => ModemStatus::BootUpdated,
                    "VERSION" => ModemStatus::BootVersion,
                    "RESTART" => ModemStatus::BootRestart,
                    "SHUTDOWN" => ModemStatus::BootShutdown,
                    _ => ModemStatus::Unknown,
                };
                if status == ModemStatus::Unknown {
                    (status, Some(payload))
                } else {
                    (status, extra)
                }
            }
            "DATETIME" => (ModemStatus::DateTime, tail),
            "POSITION" => (ModemStatus::Position, tail),
            "DEBUG" => (ModemStatus::Debug, tail),
            "ERROR" => (ModemStatus::Error, tail),
            _ if payload.is_empty() => return Err(ParseError::FieldCount),
            _ => (ModemStatus::Unknown, Some(payload)),
        };
        Ok(Self {
            status,
            text: text.map(fields::truncated),
        })
    }
}

/// `$TD SENT` report: a queued message went out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitSent {
    pub rssi: i16,
    pub snr: i16,
    pub fdev: i16,
    pub message_id: u64,
}

impl TransmitSent {
    /// Parse `SENT RSSI=n,SNR=n,FDEV=n,ID`
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let rest = payload
            .strip_prefix("SENT ")
            .ok_or(ParseError::UnknownValue)?;
        let [rssi, snr, fdev, id] = fields::split_exact::<4>(rest)?;
        Ok(Self {
            rssi: fields::keyed_number(rssi, "RSSI")?,
            snr: fields::keyed_number(snr, "SNR")?,
            fdev: fields::keyed_number(fdev, "FDEV")?,
            message_id: fields::number(id)?,
        })
    }
}

/// A parsed unsolicited report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemEvent {
    DateTime(DateTimeStatus),
    Jamming(JammingIndication),
    Geospatial(GeospatialData),
    FixQuality(FixQuality),
    PowerStatus(PowerStatus),
    ReceivedMessage(ReceivedData),
    ReceiveTest(ReceiveTest),
    SleepWake(WakeCause),
    ModemStatus(StatusReport),
    TransmitSent(TransmitSent),
}

impl ModemEvent {
    /// Decode a validated frame into an event
    ///
    /// Fails with [`ParseError::UnknownValue`] for tags that never carry a report.
    pub fn parse(frame: &Frame) -> Result<Self, ParseError> {
        let payload = frame.payload();
        match frame.tag() {
            Tag::Dt => DateTimeStatus::parse(payload).map(ModemEvent::DateTime),
            Tag::Gj => JammingIndication::parse(payload).map(ModemEvent::Jamming),
            Tag::Gn => GeospatialData::parse(payload).map(ModemEvent::Geospatial),
            Tag::Gs => FixQuality::parse(payload).map(ModemEvent::FixQuality),
            Tag::Pw => PowerStatus::parse(payload).map(ModemEvent::PowerStatus),
            Tag::Rd => ReceivedData::parse(payload).map(ModemEvent::ReceivedMessage),
            Tag::Rt => ReceiveTest::parse(payload).map(ModemEvent::ReceiveTest),
            Tag::Sl => WakeCause::parse(payload).map(ModemEvent::SleepWake),
            Tag::M138 => StatusReport::parse(payload).map(ModemEvent::ModemStatus),
            Tag::Td => TransmitSent::parse(payload).map(ModemEvent::TransmitSent),
            _ => Err(ParseError::UnknownValue),
        }
    }

    /// Observer slot for this event
    pub fn kind(&self) -> EventKind {
        match self {
            ModemEvent::DateTime(_) => EventKind::DateTime,
            ModemEvent::Jamming(_) => EventKind::Jamming,
            ModemEvent::Geospatial(_) => EventKind::Geospatial,
            ModemEvent::FixQuality(_) => EventKind::FixQuality,
            ModemEvent::PowerStatus(_) => EventKind::PowerStatus,
            ModemEvent::ReceivedMessage(_) => EventKind::ReceivedMessage,
            ModemEvent::ReceiveTest(_) => EventKind::ReceiveTest,
            ModemEvent::SleepWake(_) => EventKind::SleepWake,
            ModemEvent::ModemStatus(_) => EventKind::ModemStatus,
            ModemEvent::TransmitSent(_) => EventKind::TransmitSent,
        }
    }
}

fn split_once(text: &str) -> (&str, Option<&str>) {
    match text.split_once(',') {
        Some((head, tail)) => (head, Some(tail)),
        None => (text, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(tag: Tag, payload: &str) -> Frame {
        Frame::new(tag, payload).unwrap()
    }

    #[test]
    fn test_kind_table_matches_index() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_parse_date_time() {
        let event = ModemEvent::parse(&frame(Tag::Dt, "20190408195123,V")).unwrap();
        let ModemEvent::DateTime(status) = event else {
            panic!("wrong variant");
        };
        assert!(status.valid);
        assert_eq!(
            status.time,
            DateTime { year: 2019, month: 4, day: 8, hour: 19, minute: 51, second: 23 }
        );
    }

    #[test]
    fn test_date_time_invalid_flag_skips_range_check() {
        let status = DateTimeStatus::parse("00000000000000,I").unwrap();
        assert!(!status.valid);
        assert_eq!(
            DateTimeStatus::parse("20191308195123,V"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            DateTimeStatus::parse("20190408195123,X"),
            Err(ParseError::UnknownValue)
        );
    }

    #[test]
    fn test_date_time_payload_roundtrip() {
        let status = DateTimeStatus::parse("20220208102141,V").unwrap();
        let mut out = String::<32>::new();
        status.write_payload(&mut out).unwrap();
        assert_eq!(out.as_str(), "20220208102141,V");
    }

    #[test]
    fn test_parse_geospatial() {
        let data = GeospatialData::parse("37.8921,-122.1264,77,89,2").unwrap();
        assert!((data.latitude - 37.8921).abs() < 1e-4);
        assert!((data.longitude + 122.1264).abs() < 1e-4);
        assert_eq!(data.altitude, 77.0);
        assert_eq!(data.course, 89);
        assert_eq!(data.speed, 2.0);
    }

    #[test]
    fn test_geospatial_roundtrip() {
        let fix = GeospatialData {
            latitude: 12.34,
            longitude: -56.78,
            altitude: 100.0,
            course: 90,
            speed: 5.0,
        };
        let mut out = String::<64>::new();
        fix.write_payload(&mut out).unwrap();
        assert_eq!(out.as_str(), "12.3400,-56.7800,100,90,5");

        let parsed = GeospatialData::parse(&out).unwrap();
        assert!((parsed.latitude - fix.latitude).abs() < 1e-4);
        assert!((parsed.longitude - fix.longitude).abs() < 1e-4);
        assert!((parsed.altitude - fix.altitude).abs() < 1.0);
        assert_eq!(parsed.course, fix.course);
        assert!((parsed.speed - fix.speed).abs() < 1.0);
    }

    #[test]
    fn test_geospatial_out_of_range() {
        assert_eq!(
            GeospatialData::parse("91.0,0.0,0,0,0"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            GeospatialData::parse("0.0,0.0,0,360,0"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(GeospatialData::parse("0.0,0.0,0,0"), Err(ParseError::FieldCount));
        assert_eq!(
            GeospatialData::parse("north,0.0,0,0,0"),
            Err(ParseError::InvalidNumber)
        );
    }

    #[test]
    fn test_parse_fix_quality() {
        let fix = FixQuality::parse("109,214,9,0,G3").unwrap();
        assert_eq!(fix.hdop, 109);
        assert_eq!(fix.vdop, 214);
        assert_eq!(fix.gnss_sats, 9);
        assert_eq!(fix.fix_type, FixType::Standalone3D);
        assert_eq!(FixQuality::parse("1,1,1,0,XX"), Err(ParseError::UnknownValue));

        let mut out = String::<32>::new();
        fix.write_payload(&mut out).unwrap();
        assert_eq!(out.as_str(), "109,214,9,0,G3");
    }

    #[test]
    fn test_parse_power_status() {
        let power = PowerStatus::parse("3.30000,0.00000,0.00000,0.00000,31.5").unwrap();
        assert!((power.cpu_volts - 3.3).abs() < 1e-4);
        assert!((power.temperature - 31.5).abs() < 1e-4);
    }

    #[test]
    fn test_parse_received_data() {
        let data = ReceivedData::parse("AI=65535,RSSI=-95,SNR=-9,FDEV=-1,68656C6C6F").unwrap();
        assert_eq!(data.app_id, Some(65535));
        assert_eq!(data.rssi, -95);
        assert_eq!(data.snr, -9);
        assert_eq!(data.fdev, -1);
        assert_eq!(&data.payload_bytes().unwrap()[..], b"hello");

        let data = ReceivedData::parse("RSSI=-95,SNR=-9,FDEV=-1,00FF").unwrap();
        assert_eq!(data.app_id, None);
        assert_eq!(data.payload_hex.as_str(), "00FF");

        assert_eq!(
            ReceivedData::parse("RSSI=-95,SNR=-9,FDEV=-1,ABC"),
            Err(ParseError::InvalidHex)
        );
    }

    #[test]
    fn test_parse_receive_test() {
        assert_eq!(
            ReceiveTest::parse("RSSI=-103").unwrap(),
            ReceiveTest::Background { rssi: -103 }
        );

        let test = ReceiveTest::parse(
            "RSSI=-103,SNR=-1,FDEV=426,TS=2022-02-08T10:21:41,DI=0x000abc",
        )
        .unwrap();
        assert_eq!(
            test,
            ReceiveTest::Satellite {
                rssi: -103,
                snr: -1,
                fdev: 426,
                time: DateTime { year: 2022, month: 2, day: 8, hour: 10, minute: 21, second: 41 },
                satellite_id: 0xABC,
            }
        );
    }

    #[test]
    fn test_parse_wake_cause() {
        assert_eq!(WakeCause::parse("WAKE,GPIO"), Ok(WakeCause::Gpio));
        assert_eq!(WakeCause::parse("WAKE,SERIAL"), Ok(WakeCause::Serial));
        assert_eq!(WakeCause::parse("WAKE,TIME"), Ok(WakeCause::Time));
        assert_eq!(WakeCause::parse("WAKE,MAGIC"), Err(ParseError::UnknownValue));
        assert_eq!(WakeCause::parse("OK"), Err(ParseError::UnknownValue));
    }

    #[test]
    fn test_parse_status_reports() {
        let report = StatusReport::parse("BOOT,RUNNING").unwrap();
        assert_eq!(report.status, ModemStatus::BootRunning);
        assert_eq!(report.text, None);

        let report = StatusReport::parse("BOOT,VERSION,2021-07-16-00:30:29,v1.1.0").unwrap();
        assert_eq!(report.status, ModemStatus::BootVersion);
        assert_eq!(report.text.unwrap().as_str(), "2021-07-16-00:30:29,v1.1.0");

        let report = StatusReport::parse("DEBUG,Something happened").unwrap();
        assert_eq!(report.status, ModemStatus::Debug);
        assert_eq!(report.text.unwrap().as_str(), "Something happened");

        let report = StatusReport::parse("DATETIME").unwrap();
        assert_eq!(report.status, ModemStatus::DateTime);

        let report = StatusReport::parse("FOO,BAR").unwrap();
        assert_eq!(report.status, ModemStatus::Unknown);
        assert_eq!(report.text.unwrap().as_str(), "FOO,BAR");
    }

    #[test]
    fn test_parse_transmit_sent() {
        let sent = TransmitSent::parse("SENT RSSI=-98,SNR=-2,FDEV=101,4428826476689").unwrap();
        assert_eq!(sent.rssi, -98);
        assert_eq!(sent.message_id, 4428826476689);
        assert_eq!(TransmitSent::parse("OK,4428826476689"), Err(ParseError::UnknownValue));
    }

    #[test]
    fn test_non_report_tag() {
        assert_eq!(
            ModemEvent::parse(&frame(Tag::Mm, "3")),
            Err(ParseError::UnknownValue)
        );
    }

    #[test]
    fn test_event_kind_matches_tag() {
        let event = ModemEvent::parse(&frame(Tag::Sl, "WAKE,GPIO")).unwrap();
        assert_eq!(Some(event.kind()), EventKind::for_tag(Tag::Sl));
    }

    proptest! {
        #[test]
        fn prop_parsers_never_panic(payload in "[ -~]{0,120}", index in 0usize..17) {
            let tag = Tag::ALL[index];
            let _ = ModemEvent::parse(&frame(tag, &payload));
        }

        #[test]
        fn prop_geospatial_roundtrip(
            lat in -90.0f32..=90.0,
            lon in -180.0f32..=180.0,
            alt in -500i32..10000,
            course in 0u16..360,
            speed in 0u16..2000,
        ) {
            let fix = GeospatialData {
                latitude: lat,
                longitude: lon,
                altitude: alt as f32,
                course,
                speed: speed as f32,
            };
            let mut out = String::<64>::new();
            fix.write_payload(&mut out).unwrap();
            let parsed = GeospatialData::parse(&out).unwrap();
            prop_assert!((parsed.latitude - lat).abs() <= 1e-4 + lat.abs() * 1e-6);
            prop_assert!((parsed.longitude - lon).abs() <= 1e-4 + lon.abs() * 1e-6);
            prop_assert_eq!(parsed.course, course);
            prop_assert_eq!(parsed.altitude, alt as f32);
            prop_assert_eq!(parsed.speed, speed as f32);
        }
    }
}
