// Copyright (c) 2024 Mike Tsao

use super::{Key, Unit};
use crate::automation::Param;
use crate::engine::{ConnectTarget, RenderContext};
use crate::events::Emitter;
use crate::synth::SynthBuilder;
use crate::types::prelude::*;
use std::sync::{Arc, RwLock};

/// One upstream input to a factory: a plain scalar, a live [Param], or
/// another [Ugen].
#[derive(Clone, Debug)]
pub enum Input {
    Scalar(f64),
    Param(Param),
    Ugen(Ugen),
}
impl From<f64> for Input {
    fn from(value: f64) -> Self {
        Input::Scalar(value)
    }
}
impl From<Param> for Input {
    fn from(value: Param) -> Self {
        Input::Param(value)
    }
}
impl From<&Param> for Input {
    fn from(value: &Param) -> Self {
        Input::Param(value.clone())
    }
}
impl From<Ugen> for Input {
    fn from(value: Ugen) -> Self {
        Input::Ugen(value)
    }
}
impl From<&Ugen> for Input {
    fn from(value: &Ugen) -> Self {
        Input::Ugen(value.clone())
    }
}

/// The identity and emission surface a factory sees while it builds: the
/// parsed key plus the emitter the finished ugen will own. Factories capture
/// the emitter in their unit closures to fire events later.
#[derive(Clone, Debug)]
pub struct UgenShell {
    pub key: Key,
    pub emitter: Emitter,
}

#[derive(Debug)]
pub(crate) struct UgenCore {
    pub(crate) key: Key,
    pub(crate) emitter: Emitter,
    pub(crate) unit: Unit,
}

/// A compiled graph node: the unit a factory returned, tagged with the id and
/// class list parsed from its build key. Handles are cheap clones sharing one
/// core; the graph builder creates them and the instrument and event router
/// reference them.
#[derive(Clone, Debug)]
pub struct Ugen(Arc<RwLock<UgenCore>>);
impl Ugen {
    pub(crate) fn new(shell: UgenShell, unit: Unit) -> Self {
        Self(Arc::new(RwLock::new(UgenCore {
            key: shell.key,
            emitter: shell.emitter,
            unit,
        })))
    }

    /// The factory name this ugen was built from.
    pub fn name(&self) -> String {
        self.0.read().unwrap().key.name.clone()
    }

    /// The explicit instance id, if the build key carried one.
    pub fn id(&self) -> Option<String> {
        self.0.read().unwrap().key.id.clone()
    }

    #[allow(missing_docs)]
    pub fn class_list(&self) -> Vec<String> {
        self.0.read().unwrap().key.class_list.clone()
    }

    #[allow(missing_docs)]
    pub fn has_class(&self, class: &str) -> bool {
        self.0.read().unwrap().key.class_list.iter().any(|c| c == class)
    }

    /// The rendering node this ugen exposes downstream, if it has one.
    pub fn outlet(&self) -> Option<NodeUid> {
        self.0.read().unwrap().unit.outlet().map(|c| c.node())
    }

    /// Whether the factory already routed this ugen to an output.
    pub fn is_output(&self) -> bool {
        self.0.read().unwrap().unit.is_output()
    }

    /// This ugen's event-emission capability.
    pub fn emitter(&self) -> Emitter {
        self.0.read().unwrap().emitter.clone()
    }

    /// Fires an event on this ugen's emitter.
    pub fn emit(&self, event: &str, value: f64) {
        self.emitter().emit(event, value);
    }

    /// Connects this ugen's outlet to the given target, if it has one.
    pub fn connect(&self, ctx: &mut RenderContext, to: ConnectTarget) {
        if let Some(outlet) = self.0.write().unwrap().unit.outlet_mut() {
            outlet.connect(ctx, to);
        }
    }

    /// Tears down every linkage this ugen's outlet created.
    pub fn disconnect(&self, ctx: &mut RenderContext) {
        if let Some(outlet) = self.0.write().unwrap().unit.outlet_mut() {
            outlet.disconnect(ctx);
        }
    }

    // Lifecycle hooks can emit events whose listeners re-enter this ugen,
    // so each hook is taken out, run with the core lock released, and put
    // back once it returns.

    pub(crate) fn start(&self, ctx: &mut RenderContext, time: Seconds) {
        let hook = self.0.write().unwrap().unit.take_start();
        if let Some(mut hook) = hook {
            hook(ctx, time);
            self.0.write().unwrap().unit.put_start(hook);
        }
    }

    pub(crate) fn stop(&self, ctx: &mut RenderContext, time: Seconds) {
        let hook = self.0.write().unwrap().unit.take_stop();
        if let Some(mut hook) = hook {
            hook(ctx, time);
            self.0.write().unwrap().unit.put_stop(hook);
        }
    }

    /// Dispatches the named unit method. Unknown names are ignored.
    pub(crate) fn apply(&self, ctx: &mut RenderContext, method: &str, args: &[f64]) {
        let hook = self.0.write().unwrap().unit.take_method(method);
        if let Some(mut hook) = hook {
            hook(ctx, args);
            self.0.write().unwrap().unit.put_method(method, hook);
        }
    }

    /// Serializes this ugen's outlet and its fan-in.
    pub fn to_json(&self, ctx: &RenderContext) -> serde_json::Value {
        match self.outlet() {
            Some(node) => ctx.node_to_json(node),
            None => serde_json::Value::Null,
        }
    }

    /// Builds `self + rhs` through the registry's `"+"` factory, so that
    /// arithmetic composition is sugar over the ordinary build path.
    pub fn add(&self, builder: &mut SynthBuilder, rhs: impl Into<Input>) -> Result<Ugen> {
        builder.build_with_inputs("+", &Default::default(), vec![self.into(), rhs.into()])
    }

    /// Builds `self * rhs` through the registry's `"*"` factory.
    pub fn mul(&self, builder: &mut SynthBuilder, rhs: impl Into<Input>) -> Result<Ugen> {
        builder.build_with_inputs("*", &Default::default(), vec![self.into(), rhs.into()])
    }

    /// Builds `self * mul + add`.
    pub fn madd(
        &self,
        builder: &mut SynthBuilder,
        mul: impl Into<Input>,
        add: impl Into<Input>,
    ) -> Result<Ugen> {
        let scaled = self.mul(builder, mul)?;
        scaled.add(builder, add)
    }
}
