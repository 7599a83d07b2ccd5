//! Command/response correlation
//!
//! `send` writes one command and waits for the line that answers it. Lines
//! are classified against the raw text from `$`, before checksum validation,
//! so a corrupted answer is reported as such instead of being mistaken for
//! unsolicited traffic.

use swarm_hal::Transport;
use swarm_protocol::{ErrorCode, Frame, Line, Tag, Validation, MAX_ENCODED_LEN};

use super::Modem;
use crate::diagnostics::Counter;
use crate::error::Error;
use crate::state::EngineEvent;

/// What a command's answer looks like
#[derive(Debug, Clone, Copy)]
pub struct Expect<'a> {
    /// Raw line prefix of a successful response, e.g. `$CS DI=0x`
    pub response: &'a str,
    /// Raw line prefix of a rejection, e.g. `$CS ERR`
    pub error: &'a str,
    /// Deadline measured from the moment the command is written
    pub timeout_ms: u32,
    /// Extra check on the text after `response`, up to the checksum
    ///
    /// Separates answers that share a prefix with unsolicited reports, such
    /// as the numeric `$DT 60` rate reply and a `$DT` date report.
    pub accept: Option<fn(&str) -> bool>,
}

impl<'a> Expect<'a> {
    pub const fn new(response: &'a str, error: &'a str, timeout_ms: u32) -> Self {
        Self {
            response,
            error,
            timeout_ms,
            accept: None,
        }
    }

    /// Response prefix on `tag`, rejected by `$XX ERR`
    pub const fn on(tag: Tag, response: &'a str, timeout_ms: u32) -> Self {
        Self::new(response, tag.error_prefix(), timeout_ms)
    }

    pub const fn accepting(mut self, accept: fn(&str) -> bool) -> Self {
        self.accept = Some(accept);
        self
    }

    /// True if a partial line could still grow into the answer
    fn could_answer(&self, pending: &[u8]) -> bool {
        let Some(start) = pending.iter().position(|&b| b == b'$') else {
            return false;
        };
        let raw = &pending[start..];
        [self.response, self.error].iter().any(|prefix| {
            let prefix = prefix.as_bytes();
            raw.starts_with(prefix) || prefix.starts_with(raw)
        })
    }

    fn is_error(&self, raw: &[u8]) -> bool {
        raw.starts_with(self.error.as_bytes())
    }

    fn is_response(&self, raw: &[u8]) -> bool {
        let Some(rest) = raw.strip_prefix(self.response.as_bytes()) else {
            return false;
        };
        let Some(accept) = self.accept else {
            return true;
        };
        let body = match rest.iter().rposition(|&b| b == b'*') {
            Some(star) => &rest[..star],
            None => rest,
        };
        core::str::from_utf8(body).map(accept).unwrap_or(false)
    }
}

/// A line that answers the pending command
enum Matched {
    Response,
    Error,
}

/// Accept only a plain unsigned number
pub(crate) fn is_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

impl<T: Transport, C> Modem<T, C> {
    /// Write `command` and wait for its answer
    ///
    /// Returns the validated response frame, or:
    /// - `Protocol { tag, code }` if the error prefix arrived
    /// - `ChecksumInvalid` / `Framing` if the answer was damaged
    /// - `Timeout` once `timeout_ms` has elapsed, never earlier
    /// - `Communication` if the transport failed
    /// - `Reentrancy` if another `send` or `poll` is in progress
    ///
    /// Unsolicited lines that arrive meanwhile are kept for the next `poll()`
    /// and never dispatched from here.
    pub fn send(&mut self, command: &Frame, expect: &Expect<'_>) -> Result<Frame, Error> {
        let mut encoded = [0u8; MAX_ENCODED_LEN];
        let len = command.encode_with(&mut encoded, self.checksum)?;

        self.begin(EngineEvent::CommandSent)?;

        // Anything complete before the command goes out cannot answer it
        if let Err(e) = self.stash_pending() {
            return self.finish(EngineEvent::TransportFailed, Err(e));
        }

        trace!("tx {=[u8]:a}", &encoded[..len]);
        if self.transport.write_bytes(&encoded[..len]).is_err() {
            return self.finish(EngineEvent::TransportFailed, Err(Error::Communication));
        }

        let start = self.transport.now_millis();
        let timeout = u64::from(expect.timeout_ms);

        // A partial answer waits for its terminator, bounded by the deadline
        loop {
            match self.read_line_holding(|pending| expect.could_answer(pending)) {
                Err(e) => return self.finish(EngineEvent::TransportFailed, Err(e)),
                Ok(Some(line)) => {
                    if let Some(result) = self.correlate(line, expect) {
                        let event = match result {
                            Err(Error::Protocol { .. }) => EngineEvent::ErrorMatched,
                            _ => EngineEvent::ResponseMatched,
                        };
                        return self.finish(event, result);
                    }
                }
                Ok(None) => {
                    if self.transport.now_millis().saturating_sub(start) >= timeout {
                        return self.finish(EngineEvent::DeadlinePassed, Err(Error::Timeout));
                    }
                    self.transport.pause();
                    continue;
                }
            }

            // A steady stream of unrelated lines must not hold off the deadline
            if self.transport.now_millis().saturating_sub(start) >= timeout {
                return self.finish(EngineEvent::DeadlinePassed, Err(Error::Timeout));
            }
        }
    }

    /// Classify one line against the pending command
    ///
    /// Returns `None` (after stashing or counting the line) if it is not the
    /// answer.
    fn correlate(&mut self, line: Line, expect: &Expect<'_>) -> Option<Result<Frame, Error>> {
        let raw = line.from_start();
        let matched = if expect.is_error(raw) {
            Matched::Error
        } else if expect.is_response(raw) {
            Matched::Response
        } else {
            self.stash(line);
            return None;
        };

        let result = match (self.validate(&line), matched) {
            (Validation::Valid(frame), Matched::Response) => Ok(frame),
            (Validation::Valid(frame), Matched::Error) => {
                let code = ErrorCode::from_payload(frame.payload()).unwrap_or(ErrorCode::Unspecified);
                warn!("{} rejected: {}", frame.tag(), code.code());
                Err(Error::Protocol {
                    tag: frame.tag(),
                    code,
                })
            }
            (Validation::ChecksumInvalid(tag), _) => {
                self.diagnostics.record(Counter::ChecksumFailures);
                warn!("checksum mismatch on response {}", tag);
                Err(Error::ChecksumInvalid)
            }
            (Validation::Unrecognized | Validation::Malformed, _) => {
                self.diagnostics.record(Counter::FramingErrors);
                Err(Error::Framing)
            }
        };
        Some(result)
    }

    /// Move already-complete lines into the backlog
    fn stash_pending(&mut self) -> Result<(), Error> {
        for _ in 0..self.config.max_lines_per_poll {
            match self.read_line()? {
                Some(line) => self.stash(line),
                None => break,
            }
        }
        Ok(())
    }

    fn finish(&mut self, event: EngineEvent, result: Result<Frame, Error>) -> Result<Frame, Error> {
        debug_assert!(event.ends_command());
        self.end(event);
        self.prune_backlog();
        result
    }
}
