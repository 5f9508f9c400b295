// Copyright (c) 2024 Mike Tsao

use super::SynthBuilder;
use crate::automation::Param;
use crate::engine::{GainNode, RenderContext};
use crate::events::{ListenerFn, Selector, SelectorTarget};
use crate::types::prelude::*;
use crate::ugen::{Registry, Ugen};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock, Weak};

/// Where an instrument is in its life. The progression is strictly forward;
/// `Stopped` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SynthState {
    /// Immediately after construction, before any scheduled time has elapsed.
    #[default]
    Init,
    /// The clock has advanced past construction; nothing has started yet.
    Ready,
    /// The scheduled start has fired; timeouts are live.
    Started,
    /// The scheduled stop has fired.
    Stopped,
}

/// Lazily created, per-index gain stages used as named summation points.
/// Wiring through them is append-only, which is what makes inter-instrument
/// connection order irrelevant.
#[derive(Debug, Default)]
pub(crate) struct BusSet {
    buses: FxHashMap<usize, GainNode>,
}
impl BusSet {
    pub(crate) fn get_or_create(&mut self, ctx: &mut RenderContext, index: usize) -> GainNode {
        let index = index.min(crate::engine::AUDIO_BUS_CHANNELS - 1);
        if let Some(bus) = self.buses.get(&index) {
            *bus
        } else {
            let bus = ctx.create_gain();
            self.buses.insert(index, bus);
            bus
        }
    }

    fn entries(&self) -> Vec<(usize, GainNode)> {
        let mut entries: Vec<(usize, GainNode)> =
            self.buses.iter().map(|(i, b)| (*i, *b)).collect();
        entries.sort_unstable_by_key(|(i, _)| *i);
        entries
    }
}

#[derive(Debug)]
pub(crate) struct SynthCore {
    pub(crate) state: SynthState,
    pub(crate) build_time: Seconds,
    pub(crate) ugens: Vec<Ugen>,
    pub(crate) params: FxHashMap<String, Param>,
    pub(crate) inputs: BusSet,
    pub(crate) outputs: BusSet,
    pub(crate) locals: BusSet,
    pending_start: Option<Seconds>,
    effective_start: Option<Seconds>,
    pending_stop: Option<Seconds>,
    pub(crate) timeout_calls: usize,
}
impl SynthCore {
    fn new(build_time: Seconds) -> Self {
        Self {
            state: SynthState::default(),
            build_time,
            ugens: Vec::default(),
            params: FxHashMap::default(),
            inputs: BusSet::default(),
            outputs: BusSet::default(),
            locals: BusSet::default(),
            pending_start: None,
            effective_start: None,
            pending_stop: None,
            timeout_calls: 0,
        }
    }
}

/// A compiled instrument: the ugen set one definition call produced, its
/// named input/output buses, and the state machine that drives start/stop
/// through the scheduler.
///
/// `start` and `stop` overwrite their pending time until the scheduled
/// transition fires, then become no-ops, so every owned unit sees each
/// transition exactly once.
#[derive(Clone, Debug)]
pub struct Synth {
    core: Arc<RwLock<SynthCore>>,
}
impl Synth {
    /// Compiles an instrument by running `definition` with a graph builder.
    /// The returned root ugen is wired to output bus 0 unless the definition
    /// already routed it to an output. A build error aborts construction;
    /// nothing is wired to the destination.
    pub fn new<F>(
        ctx: &mut RenderContext,
        registry: &Arc<Registry>,
        definition: F,
    ) -> Result<Self>
    where
        F: FnOnce(&mut SynthBuilder) -> Result<Ugen>,
    {
        let now = ctx.current_time();
        let core = Arc::new(RwLock::new(SynthCore::new(now)));
        let root = {
            let mut builder = SynthBuilder::new(ctx, Arc::clone(registry), Arc::clone(&core));
            definition(&mut builder)?
        };
        if !root.is_output() && root.outlet().is_some() {
            let bus = core.write().unwrap().outputs.get_or_create(ctx, 0);
            root.connect(ctx, bus.node.into());
        }

        let weak = Arc::downgrade(&core);
        ctx.sched(now, move |_ctx, _t| {
            if let Some(core) = weak.upgrade() {
                let mut core = core.write().unwrap();
                if core.state == SynthState::Init {
                    core.state = SynthState::Ready;
                }
            }
        });
        Ok(Self { core })
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> SynthState {
        self.core.read().unwrap().state
    }

    /// The clock position at which this instrument was built. Timeout
    /// deadlines are measured from here.
    pub fn build_time(&self) -> Seconds {
        self.core.read().unwrap().build_time
    }

    /// Handles to the owned ugens, in creation order.
    pub fn ugens(&self) -> Vec<Ugen> {
        self.core.read().unwrap().ugens.clone()
    }

    /// The named param the definition declared, if any.
    pub fn param(&self, name: &str) -> Option<Param> {
        self.core.read().unwrap().params.get(name).cloned()
    }

    /// The time at which the start transition fired, once it has.
    pub fn effective_start(&self) -> Option<Seconds> {
        self.core.read().unwrap().effective_start
    }

    /// Schedules the start transition at the given time. Until the transition
    /// fires, repeat calls overwrite the pending time (last call wins); after
    /// it fires, calls are no-ops.
    pub fn start(&self, ctx: &mut RenderContext, time: impl Into<Seconds>) {
        let time = time.into();
        {
            let mut core = self.core.write().unwrap();
            if matches!(core.state, SynthState::Started | SynthState::Stopped) {
                return;
            }
            core.pending_start = Some(time);
        }
        let weak = Arc::downgrade(&self.core);
        ctx.sched(time, move |ctx, t| Self::fire_start(&weak, ctx, t));
    }

    fn fire_start(weak: &Weak<RwLock<SynthCore>>, ctx: &mut RenderContext, t: Seconds) {
        let Some(core) = weak.upgrade() else {
            return;
        };
        let (ugens, outputs) = {
            let mut core = core.write().unwrap();
            if core.pending_start != Some(t)
                || matches!(core.state, SynthState::Started | SynthState::Stopped)
            {
                return;
            }
            core.state = SynthState::Started;
            core.effective_start = Some(t);
            (core.ugens.clone(), core.outputs.entries())
        };
        for (index, bus) in outputs {
            let mix = ctx.audio_bus(index);
            ctx.connect(bus.node, mix.into());
        }
        for ugen in &ugens {
            ugen.start(ctx, t);
        }
    }

    /// Schedules the stop transition at the given time. The transition takes
    /// effect only once the instrument has started; like `start`, the pending
    /// time can be overwritten until it fires. After the units stop, a fixed
    /// teardown delay elapses before the instrument's output leaves the
    /// destination.
    pub fn stop(&self, ctx: &mut RenderContext, time: impl Into<Seconds>) {
        let time = time.into();
        {
            let mut core = self.core.write().unwrap();
            if core.state == SynthState::Stopped {
                return;
            }
            core.pending_stop = Some(time);
        }
        let weak = Arc::downgrade(&self.core);
        ctx.sched(time, move |ctx, t| Self::fire_stop(&weak, ctx, t));
    }

    fn fire_stop(weak: &Weak<RwLock<SynthCore>>, ctx: &mut RenderContext, t: Seconds) {
        let Some(core) = weak.upgrade() else {
            return;
        };
        let (ugens, outputs) = {
            let mut core = core.write().unwrap();
            if core.state != SynthState::Started || core.pending_stop != Some(t) {
                return;
            }
            core.state = SynthState::Stopped;
            (core.ugens.clone(), core.outputs.entries())
        };
        for ugen in &ugens {
            ugen.stop(ctx, t);
        }
        let delay = ctx.config().teardown_delay;
        ctx.sched(t + delay, move |ctx, _t| {
            for (index, bus) in outputs {
                let mix = ctx.audio_bus(index);
                ctx.disconnect(bus.node, mix.into());
            }
        });
    }

    /// Fans this instrument's output bus into another instrument's named
    /// input bus. Both buses are created lazily, so call order does not
    /// matter.
    pub fn connect(
        &self,
        ctx: &mut RenderContext,
        other: &Synth,
        output_index: usize,
        input_index: usize,
    ) {
        let out = self
            .core
            .write()
            .unwrap()
            .outputs
            .get_or_create(ctx, output_index);
        let dst = other
            .core
            .write()
            .unwrap()
            .inputs
            .get_or_create(ctx, input_index);
        ctx.connect(out.node, dst.node.into());
    }

    /// The rendering node behind the named input bus, creating it if needed.
    pub fn input_bus_node(&self, ctx: &mut RenderContext, index: usize) -> NodeUid {
        self.core
            .write()
            .unwrap()
            .inputs
            .get_or_create(ctx, index)
            .node
    }

    /// The rendering node behind the named output bus, creating it if needed.
    pub fn output_bus_node(&self, ctx: &mut RenderContext, index: usize) -> NodeUid {
        self.core
            .write()
            .unwrap()
            .outputs
            .get_or_create(ctx, index)
            .node
    }

    // ------------------------------------------------------------------
    // Selector routing
    // ------------------------------------------------------------------

    /// Attaches a listener to every ugen the pattern matches right now; ugens
    /// added later are not retroactively matched. Returns the listener's uid.
    /// A malformed pattern matches nothing.
    pub fn on(&self, pattern: &str, callback: ListenerFn) -> ListenerUid {
        self.attach(pattern, false, callback)
    }

    /// Like [Synth::on], but each attachment detaches itself after its first
    /// firing.
    pub fn once(&self, pattern: &str, callback: ListenerFn) -> ListenerUid {
        self.attach(pattern, true, callback)
    }

    fn attach(&self, pattern: &str, once: bool, callback: ListenerFn) -> ListenerUid {
        let uid = crate::events::Emitter::mint_listener_uid();
        if let Some(selector) = Selector::parse(pattern) {
            for ugen in self.core.read().unwrap().ugens.iter() {
                if selector.matches(ugen) {
                    ugen.emitter()
                        .attach(uid, selector.event(), once, Arc::clone(&callback));
                }
            }
        }
        uid
    }

    /// Detaches the listener with the given uid from every ugen the pattern
    /// matches right now.
    pub fn off(&self, pattern: &str, uid: ListenerUid) {
        if let Some(selector) = Selector::parse(pattern) {
            for ugen in self.core.read().unwrap().ugens.iter() {
                if selector.matches(ugen) {
                    ugen.emitter().off(selector.event(), uid);
                }
            }
        }
    }

    /// Whether any matching ugen currently has a listener for the pattern's
    /// event. Re-resolves the pattern, so ugens added since `on` count.
    pub fn has_listeners(&self, pattern: &str) -> bool {
        let Some(selector) = Selector::parse(pattern) else {
            return false;
        };
        self.core
            .read()
            .unwrap()
            .ugens
            .iter()
            .any(|u| selector.matches(u) && u.emitter().has_listeners(selector.event()))
    }

    /// Every listener uid attached for the pattern, in ugen creation order.
    pub fn listeners(&self, pattern: &str) -> Vec<ListenerUid> {
        let Some(selector) = Selector::parse(pattern) else {
            return Vec::default();
        };
        self.core
            .read()
            .unwrap()
            .ugens
            .iter()
            .filter(|u| selector.matches(u))
            .flat_map(|u| u.emitter().listeners(selector.event()))
            .collect()
    }

    /// Dispatches a named unit method on every ugen the target pattern
    /// matches, in creation order. Malformed patterns and unknown methods are
    /// ignored.
    pub fn apply(&self, ctx: &mut RenderContext, pattern: &str, method: &str, args: &[f64]) {
        let Some(target) = SelectorTarget::parse(pattern) else {
            return;
        };
        let ugens = self.ugens();
        for ugen in ugens.iter().filter(|u| target.matches(u)) {
            ugen.apply(ctx, method, args);
        }
    }

    /// Dispatches a named unit method on every owned ugen.
    pub fn call(&self, ctx: &mut RenderContext, method: &str, args: &[f64]) {
        for ugen in self.ugens() {
            ugen.apply(ctx, method, args);
        }
    }
}
