//! Message store and transmit commands

use swarm_hal::Transport;
use swarm_protocol::fields::{self, ParseError};
use swarm_protocol::{Command, ReadTarget, TransmitOptions};

use super::{RxMessage, StoredMessage, TxMessage};
use crate::config::TimeoutClass;
use crate::engine::Modem;
use crate::error::Error;

impl<T: Transport, C> Modem<T, C> {
    /// Received messages held by the modem, or only the unread ones
    pub fn rx_message_count(&mut self, unread_only: bool) -> Result<u32, Error> {
        self.counted(&Command::RxCount { unread_only }, TimeoutClass::MessageRead)
    }

    pub fn delete_rx_message(&mut self, id: u64) -> Result<(), Error> {
        self.execute(&Command::RxDelete(id), "DELETED", TimeoutClass::MessageDelete, None)
            .map(|_| ())
    }

    /// Delete every received message, or only those already read
    ///
    /// Returns how many were deleted.
    pub fn delete_rx_messages(&mut self, read_only: bool) -> Result<u32, Error> {
        self.counted(&Command::RxDeleteAll { read_only }, TimeoutClass::MessageDelete)
    }

    pub fn mark_rx_message(&mut self, id: u64) -> Result<(), Error> {
        self.execute(&Command::RxMark(id), "MARKED", TimeoutClass::MessageRead, None)
            .map(|_| ())
    }

    /// Mark every received message read, returning how many were marked
    pub fn mark_all_rx_messages(&mut self) -> Result<u32, Error> {
        self.counted(&Command::RxMarkAll, TimeoutClass::MessageRead)
    }

    /// Whether `$RD` notifications are enabled
    pub fn rx_notifications(&mut self) -> Result<bool, Error> {
        let command = Command::RxNotificationsQuery;
        let frame = self.execute(&command, "N=", TimeoutClass::Command, None)?;
        match fields::keyed(frame.payload(), "N")? {
            "E" => Ok(true),
            "D" => Ok(false),
            _ => Err(ParseError::UnknownValue.into()),
        }
    }

    pub fn set_rx_notifications(&mut self, enabled: bool) -> Result<(), Error> {
        self.acknowledged(&Command::SetRxNotifications(enabled), TimeoutClass::Command)
    }

    /// Read a received message without marking it read
    pub fn list_rx_message(&mut self, id: u64) -> Result<RxMessage, Error> {
        self.stored(&Command::RxList(id))
    }

    /// Read a received message and mark it read
    pub fn read_rx_message(&mut self, id: u64) -> Result<RxMessage, Error> {
        self.stored(&Command::RxRead(ReadTarget::Id(id)))
    }

    pub fn read_oldest_rx_message(&mut self) -> Result<RxMessage, Error> {
        self.stored(&Command::RxRead(ReadTarget::Oldest))
    }

    pub fn read_newest_rx_message(&mut self) -> Result<RxMessage, Error> {
        self.stored(&Command::RxRead(ReadTarget::Newest))
    }

    /// Messages queued for transmission
    pub fn unsent_message_count(&mut self) -> Result<u32, Error> {
        self.counted(&Command::TxCount, TimeoutClass::MessageRead)
    }

    pub fn delete_unsent_message(&mut self, id: u64) -> Result<(), Error> {
        self.execute(&Command::TxDelete(id), "DELETED", TimeoutClass::MessageDelete, None)
            .map(|_| ())
    }

    /// Drop the whole transmit queue, returning how many were deleted
    pub fn delete_all_unsent_messages(&mut self) -> Result<u32, Error> {
        self.counted(&Command::TxDeleteAll, TimeoutClass::MessageDelete)
    }

    /// Listings of unsent messages may omit `AI=`
    pub fn list_unsent_message(&mut self, id: u64) -> Result<TxMessage, Error> {
        let command = Command::TxList(id);
        let frame = self.execute(&command, "", TimeoutClass::MessageRead, Some(is_listing))?;
        Ok(StoredMessage::parse(frame.payload())?)
    }

    /// Queue printable ASCII text for transmission
    ///
    /// Returns the message ID the modem assigned. The `$TD SENT` report
    /// for that ID arrives later through `poll()`.
    pub fn transmit_text(&mut self, text: &str, options: TransmitOptions) -> Result<u64, Error> {
        self.transmit(&Command::TransmitText { text, options })
    }

    /// Queue binary data (sent as hex) for transmission
    pub fn transmit_bytes(&mut self, data: &[u8], options: TransmitOptions) -> Result<u64, Error> {
        self.transmit(&Command::TransmitBytes { data, options })
    }

    fn transmit(&mut self, command: &Command<'_>) -> Result<u64, Error> {
        let frame = self.execute(command, "OK,", TimeoutClass::Transmit, None)?;
        let id = frame
            .payload()
            .strip_prefix("OK,")
            .ok_or(Error::InvalidResponse)?;
        let id = fields::number(id)?;
        debug!("queued message {}", id);
        Ok(id)
    }

    /// `$MM`/`$MT` listing or read, answered with `AI=...`
    fn stored(&mut self, command: &Command<'_>) -> Result<StoredMessage, Error> {
        let frame = self.execute(command, "AI=", TimeoutClass::MessageRead, None)?;
        Ok(StoredMessage::parse(frame.payload())?)
    }
}

fn is_listing(text: &str) -> bool {
    StoredMessage::parse(text).is_ok()
}
