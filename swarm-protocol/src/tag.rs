//! Message tags
//!
//! The closed set of `$XX` prefixes the modem understands.

use core::fmt;

use crate::events::EventKind;

/// Command, response and report category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tag {
    /// Configuration settings
    Cs,
    /// Date/time status
    Dt,
    /// Firmware version
    Fv,
    /// GPS jamming/spoofing indication
    Gj,
    /// Geospatial information
    Gn,
    /// GPIO1 control
    Gp,
    /// GPS fix quality
    Gs,
    /// Received message management
    Mm,
    /// Unsent message management
    Mt,
    /// Power off
    Po,
    /// Power status
    Pw,
    /// Received data
    Rd,
    /// Restart device
    Rs,
    /// Receive test
    Rt,
    /// Sleep mode
    Sl,
    /// Modem status
    M138,
    /// Transmit data
    Td,
}

impl Tag {
    /// Every tag, in declaration order
    pub const ALL: [Tag; 17] = [
        Tag::Cs,
        Tag::Dt,
        Tag::Fv,
        Tag::Gj,
        Tag::Gn,
        Tag::Gp,
        Tag::Gs,
        Tag::Mm,
        Tag::Mt,
        Tag::Po,
        Tag::Pw,
        Tag::Rd,
        Tag::Rs,
        Tag::Rt,
        Tag::Sl,
        Tag::M138,
        Tag::Td,
    ];

    /// Wire mnemonic without the leading `$`
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Tag::Cs => "CS",
            Tag::Dt => "DT",
            Tag::Fv => "FV",
            Tag::Gj => "GJ",
            Tag::Gn => "GN",
            Tag::Gp => "GP",
            Tag::Gs => "GS",
            Tag::Mm => "MM",
            Tag::Mt => "MT",
            Tag::Po => "PO",
            Tag::Pw => "PW",
            Tag::Rd => "RD",
            Tag::Rs => "RS",
            Tag::Rt => "RT",
            Tag::Sl => "SL",
            Tag::M138 => "M138",
            Tag::Td => "TD",
        }
    }

    /// Start of the line the modem rejects a command on this tag with
    pub const fn error_prefix(self) -> &'static str {
        match self {
            Tag::Cs => "$CS ERR",
            Tag::Dt => "$DT ERR",
            Tag::Fv => "$FV ERR",
            Tag::Gj => "$GJ ERR",
            Tag::Gn => "$GN ERR",
            Tag::Gp => "$GP ERR",
            Tag::Gs => "$GS ERR",
            Tag::Mm => "$MM ERR",
            Tag::Mt => "$MT ERR",
            Tag::Po => "$PO ERR",
            Tag::Pw => "$PW ERR",
            Tag::Rd => "$RD ERR",
            Tag::Rs => "$RS ERR",
            Tag::Rt => "$RT ERR",
            Tag::Sl => "$SL ERR",
            Tag::M138 => "$M138 ERR",
            Tag::Td => "$TD ERR",
        }
    }

    /// Look up a tag from its mnemonic bytes (no `$`)
    pub fn from_mnemonic(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.mnemonic().as_bytes() == bytes)
    }

    /// Whether the modem may send this tag without being asked
    ///
    /// `$TD` qualifies because of the `$TD SENT` report.
    pub const fn is_unsolicited(self) -> bool {
        EventKind::for_tag(self).is_some()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_lookup_roundtrip() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_mnemonic(tag.mnemonic().as_bytes()), Some(tag));
        }
    }

    #[test]
    fn test_unknown_mnemonic() {
        assert_eq!(Tag::from_mnemonic(b"XX"), None);
        assert_eq!(Tag::from_mnemonic(b"M13"), None);
        assert_eq!(Tag::from_mnemonic(b""), None);
    }

    #[test]
    fn test_unsolicited_set() {
        assert!(Tag::Dt.is_unsolicited());
        assert!(Tag::M138.is_unsolicited());
        assert!(!Tag::Mm.is_unsolicited());
        assert!(!Tag::Cs.is_unsolicited());
    }

    #[test]
    fn test_error_prefix_matches_mnemonic() {
        for tag in Tag::ALL {
            let expected = std::format!("${} ERR", tag.mnemonic());
            assert_eq!(tag.error_prefix(), expected);
        }
    }
}
