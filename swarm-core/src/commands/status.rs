//! Device, GPS, power and sleep commands

use heapless::String;
use swarm_hal::Transport;
use swarm_protocol::events::{
    DateTime, DateTimeStatus, FixQuality, GeospatialData, JammingIndication, PowerStatus,
    ReceiveTest,
};
use swarm_protocol::fields;
use swarm_protocol::{Command, Frame, Gpio1Mode, Report};

use super::{DeviceInfo, Gpio1Level, MAX_DEVICE_NAME_LEN, MAX_SETTINGS_LEN};
use crate::config::TimeoutClass;
use crate::engine::{is_number, Modem};
use crate::error::Error;

/// Longest report payload a query returns
const MAX_QUERY_LEN: usize = 128;

impl<T: Transport, C> Modem<T, C> {
    /// Raw `$CS` answer, e.g. `DI=0x000e57,DN=TILE`
    pub fn configuration_settings(&mut self) -> Result<String<MAX_SETTINGS_LEN>, Error> {
        let frame = self.settings()?;
        Ok(fields::text(frame.payload())?)
    }

    pub fn device_info(&mut self) -> Result<DeviceInfo, Error> {
        let frame = self.settings()?;
        Ok(DeviceInfo::parse(frame.payload())?)
    }

    pub fn device_id(&mut self) -> Result<u32, Error> {
        self.device_info().map(|info| info.id)
    }

    pub fn device_name(&mut self) -> Result<String<MAX_DEVICE_NAME_LEN>, Error> {
        self.device_info().map(|info| info.name)
    }

    pub fn firmware_version(&mut self) -> Result<String<MAX_SETTINGS_LEN>, Error> {
        let frame = self.execute(&Command::FirmwareVersion, "", TimeoutClass::Command, None)?;
        Ok(fields::text(frame.payload())?)
    }

    /// Most recent `$DT` report
    pub fn date_time(&mut self) -> Result<DateTimeStatus, Error> {
        let payload = self.query(Report::DateTime)?;
        Ok(DateTimeStatus::parse(&payload)?)
    }

    pub fn jamming_indication(&mut self) -> Result<JammingIndication, Error> {
        let payload = self.query(Report::Jamming)?;
        Ok(JammingIndication::parse(&payload)?)
    }

    pub fn geospatial(&mut self) -> Result<GeospatialData, Error> {
        let payload = self.query(Report::Geospatial)?;
        Ok(GeospatialData::parse(&payload)?)
    }

    pub fn fix_quality(&mut self) -> Result<FixQuality, Error> {
        let payload = self.query(Report::FixQuality)?;
        Ok(FixQuality::parse(&payload)?)
    }

    pub fn power_status(&mut self) -> Result<PowerStatus, Error> {
        let payload = self.query(Report::PowerStatus)?;
        Ok(PowerStatus::parse(&payload)?)
    }

    /// CPU supply voltage from `$PW @`
    pub fn cpu_voltage(&mut self) -> Result<f32, Error> {
        self.power_status().map(|power| power.cpu_volts)
    }

    /// CPU temperature (°C) from `$PW @`
    pub fn temperature(&mut self) -> Result<f32, Error> {
        self.power_status().map(|power| power.temperature)
    }

    pub fn receive_test(&mut self) -> Result<ReceiveTest, Error> {
        let payload = self.query(Report::ReceiveTest)?;
        Ok(ReceiveTest::parse(&payload)?)
    }

    /// Seconds between unsolicited reports of `report` (0 = off)
    pub fn rate(&mut self, report: Report) -> Result<u32, Error> {
        self.counted(&Command::RateQuery(report), TimeoutClass::Command)
    }

    /// Set the report interval; 0 turns the report off
    pub fn set_rate(&mut self, report: Report, seconds: u32) -> Result<(), Error> {
        self.acknowledged(&Command::SetRate(report, seconds), TimeoutClass::Command)
    }

    pub fn gpio1_mode(&mut self) -> Result<Gpio1Mode, Error> {
        let command = Command::Gpio1ModeQuery;
        let frame = self.execute(&command, "", TimeoutClass::Command, Some(is_number))?;
        let value = fields::number(frame.payload())?;
        Gpio1Mode::from_u8(value).ok_or(Error::InvalidResponse)
    }

    pub fn set_gpio1_mode(&mut self, mode: Gpio1Mode) -> Result<(), Error> {
        self.acknowledged(&Command::SetGpio1Mode(mode), TimeoutClass::Command)
    }

    /// Pin level (digital modes) or voltage (analog mode)
    pub fn gpio1_level(&mut self) -> Result<Gpio1Level, Error> {
        let frame = self.execute(
            &Command::Gpio1Read,
            "",
            TimeoutClass::Command,
            Some(Gpio1Level::looks_like),
        )?;
        Ok(Gpio1Level::parse(frame.payload())?)
    }

    /// Power the modem down; it needs a power cycle to come back
    pub fn power_off(&mut self) -> Result<(), Error> {
        self.acknowledged(&Command::PowerOff, TimeoutClass::Command)
    }

    /// Restart, optionally wiping the message database
    pub fn restart(&mut self, delete_db: bool) -> Result<(), Error> {
        self.acknowledged(&Command::Restart { delete_db }, TimeoutClass::Command)
    }

    pub fn sleep_for(&mut self, seconds: u32) -> Result<(), Error> {
        self.acknowledged(&Command::SleepFor(seconds), TimeoutClass::Command)
    }

    /// Sleep until a time of day, or a full date and time with `with_date`
    pub fn sleep_until(&mut self, time: DateTime, with_date: bool) -> Result<(), Error> {
        self.acknowledged(&Command::SleepUntil { time, with_date }, TimeoutClass::Command)
    }

    fn settings(&mut self) -> Result<Frame, Error> {
        let command = Command::ConfigurationSettings;
        self.execute(&command, "DI=0x", TimeoutClass::Command, None)
    }

    /// `$XX @` and the payload of its answer
    fn query(&mut self, report: Report) -> Result<String<MAX_QUERY_LEN>, Error> {
        let command = Command::Query(report);
        let frame = self.execute(&command, "", TimeoutClass::Command, Some(is_report))?;
        Ok(fields::text(frame.payload())?)
    }
}

/// A query answer carries a report, never a bare rate or `OK`
fn is_report(text: &str) -> bool {
    !is_number(text) && text != "OK"
}
