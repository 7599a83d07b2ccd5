//! Line encoding and validation for the M138 protocol.
//!
//! Line format:
//! - `$` start marker
//! - TAG: two to four uppercase letters/digits
//! - optional separator (space, or comma on some firmware) and payload
//! - `*` followed by two hex digits: XOR of every byte between `$` and `*`
//! - `\n` terminator
//!
//! The checksum delimiter is the last `*` on the line. Commands such as
//! `$MM C=**` carry a literal `*` argument that is covered by the checksum.

use heapless::{String, Vec};

use crate::tag::Tag;

/// Line start marker
pub const LINE_START: u8 = b'$';

/// Separates the checksummed body from the checksum digits
pub const CHECKSUM_DELIMITER: u8 = b'*';

/// Line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Maximum line length in bytes, terminator excluded
pub const MAX_LINE_LEN: usize = 512;

/// Maximum encoded line length, terminator included
pub const MAX_ENCODED_LEN: usize = MAX_LINE_LEN + 1;

/// Checksum over the bytes between `$` and `*`
pub type ChecksumFn = fn(&[u8]) -> u8;

/// NMEA-style XOR checksum used by the M138
pub fn nmea_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// Errors that can occur while building or encoding a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Encoded line would exceed [`MAX_LINE_LEN`]
    LineTooLong,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// A command parameter is outside the range the modem accepts
    InvalidArgument,
}

/// A validated (or to-be-sent) line: tag plus payload text
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    tag: Tag,
    payload: String<MAX_LINE_LEN>,
}

impl Frame {
    /// Create a frame with the given tag and payload
    pub fn new(tag: Tag, payload: &str) -> Result<Self, FrameError> {
        let mut text = String::new();
        text.push_str(payload)
            .map_err(|_| FrameError::LineTooLong)?;
        Ok(Self { tag, payload: text })
    }

    /// Create a frame with no payload
    pub fn empty(tag: Tag) -> Self {
        Self {
            tag,
            payload: String::new(),
        }
    }

    /// The frame's tag
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Payload text between the tag separator and `*`
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Mutable payload, for command builders appending arguments
    pub(crate) fn payload_mut(&mut self) -> &mut String<MAX_LINE_LEN> {
        &mut self.payload
    }

    /// Encode this frame as a complete wire line into `buffer`
    ///
    /// Returns the number of bytes written, terminator included.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        self.encode_with(buffer, nmea_checksum)
    }

    /// [`Frame::encode`] with a caller-supplied checksum
    pub fn encode_with(&self, buffer: &mut [u8], checksum: ChecksumFn) -> Result<usize, FrameError> {
        let mnemonic = self.tag.mnemonic().as_bytes();
        let payload = self.payload.as_bytes();
        let separator = usize::from(!payload.is_empty());
        let body_len = mnemonic.len() + separator + payload.len();
        let line_len = 1 + body_len + 3; // $ + body + * + 2 hex digits

        if line_len > MAX_LINE_LEN {
            return Err(FrameError::LineTooLong);
        }
        if buffer.len() < line_len + 1 {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = LINE_START;
        let mut pos = 1;
        buffer[pos..pos + mnemonic.len()].copy_from_slice(mnemonic);
        pos += mnemonic.len();
        if separator == 1 {
            buffer[pos] = b' ';
            pos += 1;
        }
        buffer[pos..pos + payload.len()].copy_from_slice(payload);
        pos += payload.len();

        let checksum = checksum(&buffer[1..pos]);
        buffer[pos] = CHECKSUM_DELIMITER;
        buffer[pos + 1] = hex_digit(checksum >> 4);
        buffer[pos + 2] = hex_digit(checksum & 0x0F);
        buffer[pos + 3] = LINE_TERMINATOR;

        Ok(pos + 4)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_ENCODED_LEN>, FrameError> {
        let mut buffer = [0u8; MAX_ENCODED_LEN];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Outcome of validating one received line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Validation {
    /// Recognized tag, checksum correct
    Valid(Frame),
    /// Recognized tag, checksum mismatch
    ChecksumInvalid(Tag),
    /// No `$` or a tag outside the known set
    Unrecognized,
    /// Recognized tag but no `*CC` trailer, bad hex digits, or non-UTF-8 payload
    Malformed,
}

/// Validate a line with the modem's XOR checksum
pub fn validate(line: &[u8]) -> Validation {
    validate_with(line, nmea_checksum)
}

/// Validate a line with an explicit checksum function
pub fn validate_with(line: &[u8], checksum: ChecksumFn) -> Validation {
    let Some(start) = line.iter().position(|&b| b == LINE_START) else {
        return Validation::Unrecognized;
    };
    let body = &line[start + 1..];

    let tag_len = body
        .iter()
        .position(|&b| matches!(b, b' ' | b',' | CHECKSUM_DELIMITER))
        .unwrap_or(body.len());
    let Some(tag) = Tag::from_mnemonic(&body[..tag_len]) else {
        return Validation::Unrecognized;
    };

    let Some(star) = body.iter().rposition(|&b| b == CHECKSUM_DELIMITER) else {
        return Validation::Malformed;
    };
    let Some(expected) = parse_checksum(&body[star + 1..]) else {
        return Validation::Malformed;
    };

    let covered = &body[..star];
    if checksum(covered) != expected {
        return Validation::ChecksumInvalid(tag);
    }

    let rest = &covered[tag_len..];
    let payload = match rest.first() {
        Some(b' ') | Some(b',') => &rest[1..],
        _ => rest,
    };

    match core::str::from_utf8(payload) {
        Ok(text) => match Frame::new(tag, text) {
            Ok(frame) => Validation::Valid(frame),
            Err(_) => Validation::Malformed,
        },
        Err(_) => Validation::Malformed,
    }
}

fn parse_checksum(digits: &[u8]) -> Option<u8> {
    match digits {
        [hi, lo] => Some((hex_value(*hi)? << 4) | hex_value(*lo)?),
        _ => None,
    }
}

pub(crate) fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

pub(crate) fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        _ => b'A' + nibble - 10,
    }
}
