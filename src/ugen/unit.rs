// Copyright (c) 2024 Mike Tsao

use crate::engine::RenderContext;
use crate::graph::Component;
use crate::types::prelude::*;
use rustc_hash::FxHashMap;

/// A behavior hook owned by a [Unit]. Hooks run synchronously on the thread
/// driving the clock.
pub type UnitFn = Box<dyn FnMut(&mut RenderContext, Seconds) + Send + Sync>;

/// A named method dispatched through `apply`.
pub type UnitMethodFn = Box<dyn FnMut(&mut RenderContext, &[f64]) + Send + Sync>;

/// What a factory returns: the surface the new ugen exposes downstream, plus
/// its optional lifecycle behavior and named methods.
#[derive(Default)]
pub struct Unit {
    outlet: Option<Component>,
    is_output: bool,
    start: Option<UnitFn>,
    stop: Option<UnitFn>,
    methods: FxHashMap<String, UnitMethodFn>,
}
impl core::fmt::Debug for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Unit")
            .field("outlet", &self.outlet)
            .field("is_output", &self.is_output)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
impl Unit {
    /// A unit exposing the given node downstream.
    pub fn new(outlet: Component) -> Self {
        Self {
            outlet: Some(outlet),
            ..Self::default()
        }
    }

    /// A unit with no downstream surface, e.g. one that terminates at a bus.
    pub fn sink() -> Self {
        Self::default()
    }

    /// Marks the unit as already routed to an output, so the instrument does
    /// not also wire it to its default output bus.
    pub fn mark_output(mut self) -> Self {
        self.is_output = true;
        self
    }

    #[allow(missing_docs)]
    pub fn with_start(mut self, f: impl FnMut(&mut RenderContext, Seconds) + Send + Sync + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    #[allow(missing_docs)]
    pub fn with_stop(mut self, f: impl FnMut(&mut RenderContext, Seconds) + Send + Sync + 'static) -> Self {
        self.stop = Some(Box::new(f));
        self
    }

    /// Adds a named method reachable through `apply`.
    pub fn with_method(
        mut self,
        name: &str,
        f: impl FnMut(&mut RenderContext, &[f64]) + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.to_string(), Box::new(f));
        self
    }

    #[allow(missing_docs)]
    pub fn is_output(&self) -> bool {
        self.is_output
    }

    #[allow(missing_docs)]
    pub fn outlet(&self) -> Option<&Component> {
        self.outlet.as_ref()
    }

    #[allow(missing_docs)]
    pub fn outlet_mut(&mut self) -> Option<&mut Component> {
        self.outlet.as_mut()
    }

    // Hooks are taken out for invocation and put back afterwards, so the
    // caller never runs them while holding the lock that guards this unit.

    pub(crate) fn take_start(&mut self) -> Option<UnitFn> {
        self.start.take()
    }

    pub(crate) fn put_start(&mut self, f: UnitFn) {
        self.start = Some(f);
    }

    pub(crate) fn take_stop(&mut self) -> Option<UnitFn> {
        self.stop.take()
    }

    pub(crate) fn put_stop(&mut self, f: UnitFn) {
        self.stop = Some(f);
    }

    pub(crate) fn take_method(&mut self, name: &str) -> Option<UnitMethodFn> {
        self.methods.remove(name)
    }

    pub(crate) fn put_method(&mut self, name: &str, f: UnitMethodFn) {
        self.methods.insert(name.to_string(), f);
    }
}
