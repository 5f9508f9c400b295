// Copyright (c) 2024 Mike Tsao

use crate::types::prelude::*;
use std::sync::{Arc, RwLock};

// Listener uids are minted process-wide so that a single on() call can tag
// the same callback across many emitters and off() can find them all again.
static LISTENER_UID_FACTORY: UidFactory<ListenerUid> = UidFactory::<ListenerUid>::new(1);

/// A listener callback. Shared, so one registration can attach to many
/// emitters; state lives behind the callback's own interior mutability.
pub type ListenerFn = Arc<dyn Fn(f64) + Send + Sync>;

struct ListenerEntry {
    uid: ListenerUid,
    event: String,
    once: bool,
    callback: ListenerFn,
}

/// The event-emission capability each ugen owns. Emission is composition, not
/// inheritance: an owning entity holds an [Emitter] and exposes whatever
/// surface it wants on top.
#[derive(Clone, Default)]
pub struct Emitter(Arc<RwLock<Vec<ListenerEntry>>>);
impl core::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Emitter")
            .field(&self.0.read().unwrap().len())
            .finish()
    }
}
impl Emitter {
    /// Mints a fresh listener uid. One uid can tag the same callback on many
    /// emitters.
    pub fn mint_listener_uid() -> ListenerUid {
        LISTENER_UID_FACTORY.mint_next()
    }

    /// Attaches a callback for the given event under the given uid.
    pub fn attach(&self, uid: ListenerUid, event: &str, once: bool, callback: ListenerFn) {
        self.0.write().unwrap().push(ListenerEntry {
            uid,
            event: event.to_string(),
            once,
            callback,
        });
    }

    /// Attaches a callback and returns its freshly minted uid.
    pub fn on(&self, event: &str, callback: ListenerFn) -> ListenerUid {
        let uid = Self::mint_listener_uid();
        self.attach(uid, event, false, callback);
        uid
    }

    /// Like [Emitter::on], but the listener detaches itself after its first
    /// firing.
    pub fn once(&self, event: &str, callback: ListenerFn) -> ListenerUid {
        let uid = Self::mint_listener_uid();
        self.attach(uid, event, true, callback);
        uid
    }

    /// Detaches the listener with the given uid from the given event.
    pub fn off(&self, event: &str, uid: ListenerUid) {
        self.0
            .write()
            .unwrap()
            .retain(|l| !(l.uid == uid && l.event == event));
    }

    #[allow(missing_docs)]
    pub fn has_listeners(&self, event: &str) -> bool {
        self.0.read().unwrap().iter().any(|l| l.event == event)
    }

    /// The uids listening for the given event, in attachment order.
    pub fn listeners(&self, event: &str) -> Vec<ListenerUid> {
        self.0
            .read()
            .unwrap()
            .iter()
            .filter(|l| l.event == event)
            .map(|l| l.uid)
            .collect()
    }

    /// Fires every listener for the given event, in attachment order.
    /// One-shot listeners are detached first, so a listener that re-emits
    /// cannot fire them twice.
    pub fn emit(&self, event: &str, value: f64) {
        let due: Vec<ListenerFn> = {
            let mut listeners = self.0.write().unwrap();
            let due = listeners
                .iter()
                .filter(|l| l.event == event)
                .map(|l| Arc::clone(&l.callback))
                .collect();
            listeners.retain(|l| !(l.event == event && l.once));
            due
        };
        for callback in due {
            callback(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (Arc<RwLock<Vec<f64>>>, ListenerFn) {
        let seen: Arc<RwLock<Vec<f64>>> = Default::default();
        let seen_clone = Arc::clone(&seen);
        let f: ListenerFn = Arc::new(move |v| seen_clone.write().unwrap().push(v));
        (seen, f)
    }

    #[test]
    fn emit_fires_matching_listeners_in_order() {
        let e = Emitter::default();
        let (seen, f) = tracker();
        e.on("end", Arc::clone(&f));
        e.on("start", Arc::clone(&f));
        e.on("end", f);

        e.emit("end", 1.5);
        assert_eq!(*seen.read().unwrap(), vec![1.5, 1.5]);
    }

    #[test]
    fn once_listeners_fire_exactly_once() {
        let e = Emitter::default();
        let (seen, f) = tracker();
        e.once("end", f);

        e.emit("end", 1.0);
        e.emit("end", 2.0);
        assert_eq!(*seen.read().unwrap(), vec![1.0]);
        assert!(!e.has_listeners("end"));
    }

    #[test]
    fn off_detaches_by_uid_and_event() {
        let e = Emitter::default();
        let (seen, f) = tracker();
        let uid = e.on("end", Arc::clone(&f));
        e.on("end", f);

        e.off("end", uid);
        assert_eq!(e.listeners("end").len(), 1);
        e.emit("end", 3.0);
        assert_eq!(*seen.read().unwrap(), vec![3.0]);
    }
}
