//! Vendor error codes
//!
//! The modem rejects a command with `$XX ERR,<CODE>*CC`. The code set is
//! closed; the tag it arrives on qualifies it (`MM` + `BADPARAM` is
//! `MM_BADPARAM`).

use core::fmt;

use crate::tag::Tag;

/// Command rejection code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    BadParamLength,
    BadParamValue,
    BadParam,
    InvalidChar,
    NotImplemented,
    ParamMissing,
    ParamDuplicate,
    DbxInvalidMessageId,
    DbxNoMore,
    TimeNotSet,
    NoCommand,
    NoTime,
    BadAppId,
    BadData,
    BadExpireTime,
    HoldTimeExpired,
    NoDeviceId,
    NoSpace,
    DbxToHiveFull,
    TooLong,
    /// Bare `ERR`, or a code this driver does not know
    Unspecified,
}

impl ErrorCode {
    const TABLE: [(ErrorCode, &'static str); 20] = [
        (ErrorCode::BadParamLength, "BADPARAMLENGTH"),
        (ErrorCode::BadParamValue, "BADPARAMVALUE"),
        (ErrorCode::BadParam, "BADPARAM"),
        (ErrorCode::InvalidChar, "INVALIDCHAR"),
        (ErrorCode::NotImplemented, "NOTIMPLEMENTED"),
        (ErrorCode::ParamMissing, "PARAMMISSING"),
        (ErrorCode::ParamDuplicate, "PARAMDUPLICATE"),
        (ErrorCode::DbxInvalidMessageId, "DBX_INVMSGID"),
        (ErrorCode::DbxNoMore, "DBX_NOMORE"),
        (ErrorCode::TimeNotSet, "TIMENOTSET"),
        (ErrorCode::NoCommand, "NOCOMMAND"),
        (ErrorCode::NoTime, "NOTIME"),
        (ErrorCode::BadAppId, "BADAPPID"),
        (ErrorCode::BadData, "BADDATA"),
        (ErrorCode::BadExpireTime, "BADEXPIRETIME"),
        (ErrorCode::HoldTimeExpired, "HOLDTIMEEXPIRED"),
        (ErrorCode::NoDeviceId, "NODEVICEID"),
        (ErrorCode::NoSpace, "NOSPACE"),
        (ErrorCode::DbxToHiveFull, "DBXTOHIVEFULL"),
        (ErrorCode::TooLong, "TOOLONG"),
    ];

    /// Look up a code by its wire text
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        Self::TABLE
            .iter()
            .find(|(_, text)| *text == code)
            .map(|(value, _)| *value)
            .unwrap_or(ErrorCode::Unspecified)
    }

    /// Extract the code from an error payload (`ERR,BADPARAM` or `ERR`)
    ///
    /// Returns `None` if the payload is not an error at all.
    pub fn from_payload(payload: &str) -> Option<Self> {
        let rest = payload.strip_prefix("ERR")?;
        match rest.strip_prefix(',') {
            Some(code) => Some(Self::from_code(code.split(',').next().unwrap_or(""))),
            None if rest.is_empty() => Some(ErrorCode::Unspecified),
            None => None,
        }
    }

    /// Wire text, `ERR` for [`ErrorCode::Unspecified`]
    pub fn code(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(value, _)| *value == self)
            .map(|(_, text)| *text)
            .unwrap_or("ERR")
    }

    /// Human-readable meaning
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::BadParamLength => "A parameter has an incorrect length",
            ErrorCode::BadParamValue => "A parameter has a value that is out of range",
            ErrorCode::BadParam => "Unrecognizable parameter after command",
            ErrorCode::InvalidChar => "A parameter has an invalid character",
            ErrorCode::NotImplemented => "The command is not recognized as valid",
            ErrorCode::ParamMissing => "A required parameter is missing",
            ErrorCode::ParamDuplicate => "A parameter has been duplicated",
            ErrorCode::DbxInvalidMessageId => "Invalid message ID",
            ErrorCode::DbxNoMore => "No messages found",
            ErrorCode::TimeNotSet => "Time not yet set from GPS",
            ErrorCode::NoCommand => "No S or U parameter",
            ErrorCode::NoTime => "Attempt to sleep before time is set",
            ErrorCode::BadAppId => "Invalid application ID",
            ErrorCode::BadData => "Odd number of characters or non-hex data",
            ErrorCode::BadExpireTime => "Invalid hold time",
            ErrorCode::HoldTimeExpired => "Unable to send within requested hold time",
            ErrorCode::NoDeviceId => "The device ID has not been provisioned",
            ErrorCode::NoSpace => "No space for message",
            ErrorCode::DbxToHiveFull => "Transmit queue is full (2048 messages)",
            ErrorCode::TooLong => "Message is too large to send",
            ErrorCode::Unspecified => "Command input error",
        }
    }
}

/// A code qualified by the tag it was returned on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolError {
    pub tag: Tag,
    pub code: ErrorCode,
}

impl ProtocolError {
    /// Vendor code text, e.g. `DBXINVMSGID` (qualified names drop the `DBX_` underscore)
    pub fn qualified_code(&self) -> &'static str {
        match self.code {
            ErrorCode::DbxInvalidMessageId => "DBXINVMSGID",
            ErrorCode::DbxNoMore => "DBXNOMORE",
            code => code.code(),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.tag.mnemonic(), self.qualified_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_roundtrips() {
        for (code, text) in ErrorCode::TABLE {
            assert_eq!(ErrorCode::from_code(text), code);
            assert_eq!(code.code(), text);
        }
    }

    #[test]
    fn test_prefix_codes_not_confused() {
        assert_eq!(ErrorCode::from_code("BADPARAM"), ErrorCode::BadParam);
        assert_eq!(ErrorCode::from_code("BADPARAMLENGTH"), ErrorCode::BadParamLength);
        assert_eq!(ErrorCode::from_code("NOTIME"), ErrorCode::NoTime);
        assert_eq!(ErrorCode::from_code("TIMENOTSET"), ErrorCode::TimeNotSet);
    }

    #[test]
    fn test_from_payload() {
        assert_eq!(ErrorCode::from_payload("ERR,NOSPACE"), Some(ErrorCode::NoSpace));
        assert_eq!(ErrorCode::from_payload("ERR"), Some(ErrorCode::Unspecified));
        assert_eq!(ErrorCode::from_payload("ERR,WHATEVER"), Some(ErrorCode::Unspecified));
        assert_eq!(ErrorCode::from_payload("OK"), None);
        assert_eq!(ErrorCode::from_payload("ERRATA"), None);
    }

    #[test]
    fn test_qualified_names() {
        let err = ProtocolError { tag: Tag::Mm, code: ErrorCode::BadParam };
        assert_eq!(err.to_string(), "MM_BADPARAM");
        let err = ProtocolError { tag: Tag::Td, code: ErrorCode::NoSpace };
        assert_eq!(err.to_string(), "TD_NOSPACE");
        let err = ProtocolError { tag: Tag::Mt, code: ErrorCode::DbxInvalidMessageId };
        assert_eq!(err.to_string(), "MT_DBXINVMSGID");
    }
}
