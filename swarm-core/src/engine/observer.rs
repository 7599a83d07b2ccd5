//! Per-kind observer table

use swarm_protocol::{EventKind, ModemEvent};

use super::Modem;

/// Callback for one kind of unsolicited event
///
/// Runs synchronously inside `poll()`. It receives the engine so it can
/// reach its context; calling `send` or `poll` from here fails with
/// `Error::Reentrancy`.
pub type Observer<T, C> = fn(&mut Modem<T, C>, &ModemEvent);

/// One optional observer slot per [`EventKind`]
pub struct ObserverTable<T, C> {
    slots: [Option<Observer<T, C>>; EventKind::COUNT],
}

impl<T, C> ObserverTable<T, C> {
    pub const fn new() -> Self {
        Self {
            slots: [None; EventKind::COUNT],
        }
    }

    /// Install or clear the observer for `kind`, returning the previous one
    pub fn set(&mut self, kind: EventKind, observer: Option<Observer<T, C>>) -> Option<Observer<T, C>> {
        core::mem::replace(&mut self.slots[kind.index()], observer)
    }

    pub fn get(&self, kind: EventKind) -> Option<Observer<T, C>> {
        self.slots[kind.index()]
    }

    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.slots[kind.index()].is_some()
    }
}

impl<T, C> Default for ObserverTable<T, C> {
    fn default() -> Self {
        Self::new()
    }
}
