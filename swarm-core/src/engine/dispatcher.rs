//! Unsolicited event dispatch

use swarm_hal::Transport;
use swarm_protocol::{EventKind, Line, ModemEvent, Validation};

use super::Modem;
use crate::diagnostics::Counter;
use crate::error::Error;
use crate::state::EngineEvent;

impl<T: Transport, C> Modem<T, C> {
    /// Dispatch pending unsolicited events without blocking
    ///
    /// The backlog is drained first (oldest first), then whatever the
    /// transport has ready, up to `max_lines_per_poll` lines. Each valid
    /// report is parsed and handed to its observer, if one is registered.
    /// Damaged or unparseable lines are counted in [`Modem::diagnostics`]
    /// and dropped.
    ///
    /// Returns `true` if at least one event was parsed.
    pub fn poll(&mut self) -> Result<bool, Error> {
        self.begin(EngineEvent::PollStarted)?;

        let mut consumed = false;
        for _ in 0..self.config.max_lines_per_poll {
            let line = match self.backlog.take_oldest() {
                Some(entry) => entry.line,
                None => match self.read_line() {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        self.end(EngineEvent::TransportFailed);
                        return Err(e);
                    }
                },
            };
            consumed |= self.dispatch_line(&line);
        }

        self.end(EngineEvent::PollFinished);
        Ok(consumed)
    }

    /// Parse one line and invoke its observer; true if it parsed
    fn dispatch_line(&mut self, line: &Line) -> bool {
        let frame = match self.validate(line) {
            Validation::Valid(frame) if frame.tag().is_unsolicited() => frame,
            other => {
                self.discard(&other);
                return false;
            }
        };

        let event = match ModemEvent::parse(&frame) {
            Ok(event) => event,
            Err(e) => {
                self.diagnostics.record(Counter::MalformedEvents);
                warn!("malformed {} report: {}", frame.tag(), e);
                return false;
            }
        };

        if let Some(observer) = self.observers.get(event.kind()) {
            self.diagnostics.record(Counter::EventsDispatched);
            observer(self, &event);
        } else {
            trace!("no observer for {}", event.kind());
        }
        true
    }

    /// Report whether any line of `kind` is waiting in the backlog
    pub fn has_backlogged(&self, kind: EventKind) -> bool {
        self.backlog.iter().any(|entry| entry.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Expect;
    use crate::mock::{line, MockTransport};
    use crate::state::EngineState;
    use std::vec::Vec;
    use swarm_protocol::events::{GeospatialData, ModemStatus};
    use swarm_protocol::{Frame, Tag};

    type TestModem = Modem<MockTransport, Vec<ModemEvent>>;

    fn modem() -> TestModem {
        let mut modem = Modem::with_context(MockTransport::new(), Vec::new());
        for kind in EventKind::ALL {
            modem.set_observer(kind, Some(record));
        }
        modem
    }

    fn record(modem: &mut TestModem, event: &ModemEvent) {
        modem.context_mut().push(event.clone());
    }

    #[test]
    fn test_dispatches_to_observer() {
        let mut modem = modem();
        modem.transport_mut().feed(&line("GN 12.3400,-56.7800,100,90,5"));

        assert_eq!(modem.poll(), Ok(true));
        let events = modem.context();
        assert_eq!(events.len(), 1);
        let ModemEvent::Geospatial(GeospatialData {
            latitude,
            longitude,
            course,
            ..
        }) = events[0]
        else {
            panic!("expected geospatial, got {:?}", events[0]);
        };
        assert!((latitude - 12.34).abs() < 1e-4);
        assert!((longitude + 56.78).abs() < 1e-4);
        assert_eq!(course, 90);
        assert_eq!(modem.diagnostics().events_dispatched, 1);
    }

    #[test]
    fn test_second_poll_is_idle() {
        let mut modem = modem();
        modem.transport_mut().feed(&line("M138 BOOT,RUNNING"));

        assert_eq!(modem.poll(), Ok(true));
        assert_eq!(modem.poll(), Ok(false));
        assert_eq!(modem.context().len(), 1);
    }

    #[test]
    fn test_backlog_then_live_in_order() {
        let mut modem = modem();
        let mut reply = line("GJ 0,1");
        reply.extend(line("RS OK"));
        reply.extend(line("GJ 0,2"));
        modem.transport_mut().reply(&reply);

        let expect = Expect::on(Tag::Rs, "$RS OK*", 1000);
        let answer = modem.send(&Frame::empty(Tag::Rs), &expect).unwrap();
        assert_eq!(answer.payload(), "OK");
        assert!(modem.context().is_empty());
        assert_eq!(modem.backlog_len(), 1);

        assert_eq!(modem.poll(), Ok(true));
        let levels: Vec<u8> = modem
            .context()
            .iter()
            .map(|e| match e {
                ModemEvent::Jamming(j) => j.jamming_level,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(levels, [1, 2]);
    }

    #[test]
    fn test_corrupted_line_never_dispatched() {
        let mut modem = modem();
        modem.transport_mut().feed(b"$GJ 0,0*00\n");

        assert_eq!(modem.poll(), Ok(false));
        assert!(modem.context().is_empty());
        assert_eq!(modem.diagnostics().checksum_failures, 1);
    }

    #[test]
    fn test_malformed_payload_counted() {
        let mut modem = modem();
        modem.transport_mut().feed(&line("GN 95.0,0.0,0,0,0"));

        assert_eq!(modem.poll(), Ok(false));
        assert_eq!(modem.diagnostics().malformed_events, 1);
        assert!(modem.context().is_empty());
    }

    #[test]
    fn test_unregistered_kind_parsed_and_dropped() {
        let mut modem = modem();
        modem.set_observer(EventKind::PowerStatus, None);
        modem.transport_mut().feed(&line("PW 3.30,0,0,0,31.0"));

        assert_eq!(modem.poll(), Ok(true));
        assert!(modem.context().is_empty());
        assert_eq!(modem.diagnostics().events_dispatched, 0);
    }

    #[test]
    fn test_reregister_replaces() {
        fn other(_: &mut TestModem, _: &ModemEvent) {}

        let mut modem = modem();
        let previous = modem.set_observer(EventKind::SleepWake, Some(other));
        assert!(previous.is_some());
        modem.transport_mut().feed(&line("SL WAKE,GPIO"));
        assert_eq!(modem.poll(), Ok(true));
        assert!(modem.context().is_empty());
    }

    #[test]
    fn test_observer_cannot_reenter() {
        fn reenter(modem: &mut TestModem, event: &ModemEvent) {
            let expect = Expect::on(Tag::Cs, "$CS DI=0x", 1000);
            assert_eq!(
                modem.send(&Frame::empty(Tag::Cs), &expect),
                Err(Error::Reentrancy)
            );
            assert_eq!(modem.poll(), Err(Error::Reentrancy));
            assert_eq!(modem.state(), EngineState::Dispatching);
            modem.context_mut().push(event.clone());
        }

        let mut modem = modem();
        modem.set_observer(EventKind::ModemStatus, Some(reenter));
        modem.transport_mut().feed(&line("M138 DATETIME"));

        assert_eq!(modem.poll(), Ok(true));
        assert_eq!(modem.context().len(), 1);
        assert_eq!(modem.diagnostics().reentrancy_rejections, 2);
        assert_eq!(modem.state(), EngineState::Idle);
        assert!(modem.transport().written.is_empty());
    }

    #[test]
    fn test_backlog_overflow_evicts_oldest() {
        let mut modem = modem();
        let mut reply = Vec::new();
        for level in 0..(crate::engine::BACKLOG_CAPACITY as u8 + 3) {
            reply.extend(line(&std::format!("GJ 0,{}", level)));
        }
        reply.extend(line("RS OK"));
        modem.transport_mut().reply(&reply);

        let expect = Expect::on(Tag::Rs, "$RS OK*", 1000);
        modem.send(&Frame::empty(Tag::Rs), &expect).unwrap();
        assert_eq!(modem.diagnostics().backlog_evictions, 3);
        assert_eq!(modem.backlog_len(), crate::engine::BACKLOG_CAPACITY);

        assert_eq!(modem.poll(), Ok(true));
        let first = match &modem.context()[0] {
            ModemEvent::Jamming(j) => j.jamming_level,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(first, 3);
    }

    #[test]
    fn test_split_fragments_not_dispatched() {
        let mut modem = modem();
        let full = line("M138 BOOT,RUNNING");
        let (head, tail) = full.split_at(9);
        modem.transport_mut().feed(head).at(5, tail);

        // Quiet window expires between the fragments
        for _ in 0..3 {
            modem.transport_mut().pause();
            assert_eq!(modem.poll(), Ok(false));
        }
        for _ in 0..3 {
            modem.transport_mut().pause();
            modem.poll().unwrap();
        }

        assert!(modem.context().is_empty());
        let diag = modem.diagnostics();
        assert_eq!(diag.lines_received, 2);
        assert_eq!(diag.framing_errors, 1);
        assert_eq!(diag.unrecognized_lines, 1);
    }

    #[test]
    fn test_status_text_dispatched() {
        let mut modem = modem();
        modem.transport_mut().feed(&line("M138 DEBUG,hello"));
        assert_eq!(modem.poll(), Ok(true));
        match &modem.context()[0] {
            ModemEvent::ModemStatus(report) => {
                assert_eq!(report.status, ModemStatus::Debug);
                assert_eq!(report.text.as_deref(), Some("hello"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_poll_budget_bounds_work() {
        let mut modem = modem()
            .with_config(crate::config::EngineConfig {
                max_lines_per_poll: 2,
                ..Default::default()
            })
            .unwrap();
        for level in 0..5 {
            modem
                .transport_mut()
                .feed(&line(&std::format!("GJ 0,{}", level)));
        }
        assert_eq!(modem.poll(), Ok(true));
        assert_eq!(modem.context().len(), 2);
        assert!(!modem.has_backlogged(EventKind::Jamming));
    }
}
