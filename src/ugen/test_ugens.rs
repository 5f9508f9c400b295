// Copyright (c) 2024 Mike Tsao

//! Instrument-free ugens that record what the lifecycle does to them. They
//! stand in for real DSP in tests that care about when and with what
//! arguments units are driven, not what they sound like.

use super::{Registry, Unit};
use crate::graph::Component;
use crate::types::prelude::*;
use std::sync::{Arc, RwLock};

/// One recorded lifecycle interaction.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackedCall {
    Start(Seconds),
    Stop(Seconds),
    Method(String, Vec<f64>),
}

/// The shared journal tracking ugens append to.
pub type CallTracker = Arc<RwLock<Vec<TrackedCall>>>;

/// Registers a silent ugen under `name` whose `start`/`stop` hooks and
/// `trigger` method append to `tracker`. Fails only if `name` violates the
/// grammar.
pub fn register_tracking(registry: &mut Registry, name: &str, tracker: CallTracker) -> Result<()> {
    registry.register(name, move |shell, b, _spec, _inputs| {
        let node = b.ctx().create_node("test");
        let on_start = Arc::clone(&tracker);
        let on_stop = Arc::clone(&tracker);
        let on_trigger = Arc::clone(&tracker);
        let emitter = shell.emitter.clone();
        Ok(Unit::new(Component::new(node))
            .with_start(move |_, t| on_start.write().unwrap().push(TrackedCall::Start(t)))
            .with_stop(move |_, t| {
                on_stop.write().unwrap().push(TrackedCall::Stop(t));
                emitter.emit("end", t.0);
            })
            .with_method("trigger", move |_, args| {
                on_trigger
                    .write()
                    .unwrap()
                    .push(TrackedCall::Method("trigger".to_string(), args.to_vec()));
            }))
    })
}
