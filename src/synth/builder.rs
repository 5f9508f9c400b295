// Copyright (c) 2024 Mike Tsao

use super::synth::{SynthCore, SynthState};
use crate::automation::Param;
use crate::engine::{ConnectTarget, RenderContext};
use crate::events::Emitter;
use crate::types::prelude::*;
use crate::ugen::{Input, Key, Registry, SpecValue, Ugen, UgenShell, UgenSpec};
use std::sync::{Arc, RwLock};

/// The graph-building surface an instrument definition receives. Every build
/// call resolves a registered factory, which may recursively build its own
/// inputs through the same surface.
pub struct SynthBuilder<'a> {
    ctx: &'a mut RenderContext,
    registry: Arc<Registry>,
    core: Arc<RwLock<SynthCore>>,
}
impl<'a> SynthBuilder<'a> {
    pub(crate) fn new(
        ctx: &'a mut RenderContext,
        registry: Arc<Registry>,
        core: Arc<RwLock<SynthCore>>,
    ) -> Self {
        Self {
            ctx,
            registry,
            core,
        }
    }

    /// The rendering engine this instrument is being built against.
    pub fn ctx(&mut self) -> &mut RenderContext {
        self.ctx
    }

    /// Builds one ugen: parses the key, resolves the factory, invokes it with
    /// the shell, spec, and inputs, and registers the result into the
    /// instrument's ugen set.
    pub fn build(&mut self, key: &str, spec: &UgenSpec, inputs: &[Input]) -> Result<Ugen> {
        self.build_with_inputs(key, spec, inputs.to_vec())
    }

    #[allow(missing_docs)]
    pub fn build_with_inputs(
        &mut self,
        key: &str,
        spec: &UgenSpec,
        inputs: Vec<Input>,
    ) -> Result<Ugen> {
        let key = Key::parse(key)?;
        let registry = Arc::clone(&self.registry);
        let factory = registry.factory(&key.name)?;
        let shell = UgenShell {
            key,
            emitter: Emitter::default(),
        };
        let unit = factory(&shell, self, spec, &inputs)?;
        let ugen = Ugen::new(shell, unit);
        self.core.write().unwrap().ugens.push(ugen.clone());
        Ok(ugen)
    }

    /// Declares a named param, or retrieves it if the definition already
    /// declared it. Fails with [Error::ParamName] on a malformed name.
    pub fn param(&mut self, name: &str, default: f64) -> Result<Param> {
        if let Some(param) = self.core.read().unwrap().params.get(name) {
            return Ok(param.clone());
        }
        let param = Param::new(name, default)?;
        self.core
            .write()
            .unwrap()
            .params
            .insert(name.to_string(), param.clone());
        Ok(param)
    }

    /// Builds a ugen reading the instrument's named input bus.
    pub fn input(&mut self, index: usize) -> Result<Ugen> {
        let spec = UgenSpec::default().with("index", index as f64);
        self.build("in", &spec, &[])
    }

    /// Routes a ugen to the instrument's named output bus.
    pub fn output(&mut self, index: usize, ugen: &Ugen) -> Result<Ugen> {
        let spec = UgenSpec::default().with("index", index as f64);
        self.build("out", &spec, &[ugen.into()])
    }

    /// Schedules a one-shot callback for when construction-relative time
    /// reaches `after`. It fires only while the instrument is started, with
    /// the firing deadline and this instrument's running timeout call index.
    pub fn timeout(
        &mut self,
        after: impl Into<Seconds>,
        callback: impl FnOnce(Seconds, usize) + Send + 'static,
    ) {
        let deadline = self.core.read().unwrap().build_time + after.into();
        let weak = Arc::downgrade(&self.core);
        self.ctx.sched(deadline, move |_ctx, t| {
            let Some(core) = weak.upgrade() else {
                return;
            };
            let index = {
                let mut core = core.write().unwrap();
                if core.state != SynthState::Started {
                    return;
                }
                let index = core.timeout_calls;
                core.timeout_calls += 1;
                index
            };
            callback(t, index);
        });
    }

    /// Wires a live spec entry into a control param: a [Param] binds through
    /// its bridge, a [Ugen] connects its outlet. Scalar entries are assumed
    /// to have been consumed as the param's base value already.
    pub fn bind_signal(&mut self, value: Option<&SpecValue>, param: ParamUid) {
        match value {
            Some(SpecValue::Param(p)) => p.connect(self.ctx, ConnectTarget::Param(param)),
            Some(SpecValue::Ugen(u)) => u.connect(self.ctx, ConnectTarget::Param(param)),
            _ => {}
        }
    }

    /// The rendering node behind the instrument's named input bus.
    pub fn input_bus(&mut self, index: usize) -> NodeUid {
        self.core
            .write()
            .unwrap()
            .inputs
            .get_or_create(self.ctx, index)
            .node
    }

    /// The rendering node behind the instrument's named output bus.
    pub fn output_bus(&mut self, index: usize) -> NodeUid {
        self.core
            .write()
            .unwrap()
            .outputs
            .get_or_create(self.ctx, index)
            .node
    }

    /// The rendering node behind one of the instrument's private local buses.
    pub fn local_bus(&mut self, index: usize) -> NodeUid {
        self.core
            .write()
            .unwrap()
            .locals
            .get_or_create(self.ctx, index)
            .node
    }
}
