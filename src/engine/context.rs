// Copyright (c) 2024 Mike Tsao

use super::{
    node::{Connection, ConnectTarget, GainNode, NodeEntry},
    param::{ControlParam, ParamEvent},
};
use crate::types::prelude::*;
use delegate::delegate;
use derivative::Derivative;
use derive_builder::Builder;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The number of shared audio-bus summation points a context provides.
pub const AUDIO_BUS_CHANNELS: usize = 8;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct NodeUidFactory(UidFactory<NodeUid>);
impl Default for NodeUidFactory {
    fn default() -> Self {
        Self(UidFactory::<NodeUid>::new(1))
    }
}
impl NodeUidFactory {
    delegate! {
        to self.0 {
            pub fn mint_next(&self) -> NodeUid;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ParamUidFactory(UidFactory<ParamUid>);
impl Default for ParamUidFactory {
    fn default() -> Self {
        Self(UidFactory::<ParamUid>::new(1))
    }
}
impl ParamUidFactory {
    delegate! {
        to self.0 {
            pub fn mint_next(&self) -> ParamUid;
        }
    }
}

/// Tuning for the clock-driven scheduler.
#[derive(Clone, Copy, Debug, Derivative, Builder, PartialEq)]
#[derivative(Default)]
pub struct SchedulerConfig {
    /// How far the clock advances per process tick.
    #[builder(default = "Seconds(0.025)")]
    #[derivative(Default(value = "Seconds(0.025)"))]
    pub tick_interval: Seconds,

    /// Scheduled actions fire once their target time falls within this
    /// horizon of the advancing clock.
    #[builder(default = "Seconds(0.005)")]
    #[derivative(Default(value = "Seconds(0.005)"))]
    pub look_ahead: Seconds,

    /// How long after an instrument stops before its output is disconnected
    /// from the destination.
    #[builder(default = "Seconds(0.25)")]
    #[derivative(Default(value = "Seconds(0.25)"))]
    pub teardown_delay: Seconds,
}

/// A deferred closure keyed by a target time. The closure receives the
/// *target* time when it fires, not the (usually slightly later) firing time.
pub type SchedFn = Box<dyn FnOnce(&mut RenderContext, Seconds) + Send>;

struct ScheduledAction {
    time: Seconds,
    seq: usize,
    action: SchedFn,
}

/// The reference rendering engine: a repository of opaque rendering nodes and
/// their control params, an append-only connection list, per-context shared
/// resources (the constant-offset cache and the audio buses), and the clock
/// that drives the look-ahead scheduler.
///
/// The DSP that real nodes would perform is out of scope; what this engine
/// renders faithfully is graph shape, automation timelines, and time.
#[derive(Default)]
pub struct RenderContext {
    nodes: FxHashMap<NodeUid, NodeEntry>,
    params: FxHashMap<ParamUid, ControlParam>,
    connections: Vec<Connection>,

    node_uid_factory: NodeUidFactory,
    param_uid_factory: ParamUidFactory,

    // Constant-offset sources, cached per value, owned by this context.
    dc_cache: FxHashMap<u64, NodeUid>,
    audio_buses: FxHashMap<usize, GainNode>,

    config: SchedulerConfig,
    clock: Seconds,
    next_seq: usize,
    queue: Vec<ScheduledAction>,
}
impl core::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderContext")
            .field("nodes", &self.nodes.len())
            .field("connections", &self.connections.len())
            .field("clock", &self.clock)
            .field("pending", &self.queue.len())
            .finish()
    }
}
impl RenderContext {
    /// Creates a context with default scheduler tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with the given scheduler tuning.
    pub fn new_with(config: SchedulerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The clock's current position.
    pub fn current_time(&self) -> Seconds {
        self.clock
    }

    // ------------------------------------------------------------------
    // Node factories
    // ------------------------------------------------------------------

    /// Creates an opaque rendering node with the given label. Factories that
    /// wrap real DSP register their nodes through here.
    pub fn create_node(&mut self, label: &str) -> NodeUid {
        let uid = self.node_uid_factory.mint_next();
        self.nodes.insert(uid, NodeEntry::new(label));
        uid
    }

    /// Declares a named control param on a node, seeded with the given value.
    pub fn create_param(&mut self, node: NodeUid, name: &str, value: f64) -> ParamUid {
        let uid = self.param_uid_factory.mint_next();
        self.params.insert(uid, ControlParam::new(value));
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.params.push((name.to_string(), uid));
        } else {
            eprintln!("WARNING: create_param({name}) on unknown node {node}");
        }
        uid
    }

    /// Attaches an extra serializable attribute to a node.
    pub fn set_node_field(&mut self, node: NodeUid, name: &str, value: serde_json::Value) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.fields.retain(|(n, _)| n != name);
            entry.fields.push((name.to_string(), value));
        }
    }

    /// Creates a unary gain-like scaling stage with a `gain` param at 1.
    pub fn create_gain(&mut self) -> GainNode {
        self.create_gain_with(1.0)
    }

    /// Creates a gain stage with the given base gain.
    pub fn create_gain_with(&mut self, gain: f64) -> GainNode {
        let node = self.create_node("gain");
        let gain = self.create_param(node, "gain", gain);
        GainNode { node, gain }
    }

    /// Creates a constant-offset source: a stateless node producing the given
    /// scalar as a continuous signal.
    pub fn create_constant(&mut self, value: f64) -> NodeUid {
        let node = self.create_node("constant");
        self.set_node_field(node, "value", json!(value));
        node
    }

    /// The context's cached constant-offset source for the given value,
    /// lazily created, shared read-only. All scalar-to-signal bridging is
    /// built on this.
    pub fn dc(&mut self, value: f64) -> NodeUid {
        if let Some(node) = self.dc_cache.get(&value.to_bits()) {
            *node
        } else {
            let node = self.create_constant(value);
            self.dc_cache.insert(value.to_bits(), node);
            node
        }
    }

    /// The shared audio bus for the given channel, clamped to
    /// [AUDIO_BUS_CHANNELS], lazily created and permanently wired to the
    /// destination.
    pub fn audio_bus(&mut self, index: usize) -> NodeUid {
        let index = index.min(AUDIO_BUS_CHANNELS - 1);
        if let Some(bus) = self.audio_buses.get(&index) {
            bus.node
        } else {
            let bus = self.create_gain();
            self.connect(bus.node, ConnectTarget::Destination);
            self.audio_buses.insert(index, bus);
            bus.node
        }
    }

    /// Whether the node exists. Mostly useful for assertions.
    pub fn contains_node(&self, node: NodeUid) -> bool {
        self.nodes.contains_key(&node)
    }

    /// The label the node was created with, if it exists.
    pub fn node_label(&self, node: NodeUid) -> Option<&str> {
        self.nodes.get(&node).map(|e| e.label.as_str())
    }

    /// Looks up a node's control param by name.
    pub fn param_of(&self, node: NodeUid, name: &str) -> Option<ParamUid> {
        self.nodes
            .get(&node)
            .and_then(|e| e.params.iter().find(|(n, _)| n == name).map(|(_, p)| *p))
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Records a directed edge from a node to a target.
    pub fn connect(&mut self, from: NodeUid, to: ConnectTarget) {
        if !self.nodes.contains_key(&from) {
            eprintln!("WARNING: connect from unknown node {from}");
            return;
        }
        self.connections.push(Connection { from, to });
    }

    /// Removes every edge matching the given pair.
    pub fn disconnect(&mut self, from: NodeUid, to: ConnectTarget) {
        self.connections.retain(|c| !(c.from == from && c.to == to));
    }

    /// The sources currently fanning into the given target, in connection
    /// order.
    pub fn inputs_of(&self, to: ConnectTarget) -> Vec<NodeUid> {
        self.connections
            .iter()
            .filter(|c| c.to == to)
            .map(|c| c.from)
            .collect()
    }

    // ------------------------------------------------------------------
    // Param scheduling primitives
    // ------------------------------------------------------------------

    #[allow(missing_docs)]
    pub fn set_value_at_time(&mut self, param: ParamUid, value: f64, time: Seconds) {
        self.push_param_event(param, ParamEvent::SetValue { value, time });
    }

    #[allow(missing_docs)]
    pub fn linear_ramp_to_value_at_time(&mut self, param: ParamUid, value: f64, end_time: Seconds) {
        self.push_param_event(param, ParamEvent::LinearRamp { value, end_time });
    }

    #[allow(missing_docs)]
    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        param: ParamUid,
        value: f64,
        end_time: Seconds,
    ) {
        self.push_param_event(param, ParamEvent::ExponentialRamp { value, end_time });
    }

    #[allow(missing_docs)]
    pub fn set_target_at_time(
        &mut self,
        param: ParamUid,
        target: f64,
        start_time: Seconds,
        time_constant: f64,
    ) {
        self.push_param_event(
            param,
            ParamEvent::Target {
                target,
                start_time,
                time_constant,
            },
        );
    }

    #[allow(missing_docs)]
    pub fn set_value_curve_at_time(
        &mut self,
        param: ParamUid,
        values: Vec<f64>,
        start_time: Seconds,
        duration: Seconds,
    ) {
        self.push_param_event(
            param,
            ParamEvent::Curve {
                values,
                start_time,
                duration,
            },
        );
    }

    /// Removes all scheduled automation at and after the given time.
    pub fn cancel_scheduled_values(&mut self, param: ParamUid, time: Seconds) {
        if let Some(p) = self.params.get_mut(&param) {
            p.cancel(time);
        }
    }

    /// The param's live value at the clock's current position.
    pub fn param_value(&self, param: ParamUid) -> f64 {
        self.param_value_at(param, self.clock)
    }

    /// The param's value at the given time.
    pub fn param_value_at(&self, param: ParamUid, time: Seconds) -> f64 {
        self.params.get(&param).map_or(0.0, |p| p.value_at(time))
    }

    fn push_param_event(&mut self, param: ParamUid, event: ParamEvent) {
        if let Some(p) = self.params.get_mut(&param) {
            p.push(event);
        } else {
            eprintln!("WARNING: automation on unknown param {param}");
        }
    }

    // ------------------------------------------------------------------
    // Clock and scheduler
    // ------------------------------------------------------------------

    /// Registers a deferred closure keyed by the given target time. Within a
    /// tick, due actions fire in ascending target-time order; equal target
    /// times fire in registration order.
    pub fn sched<F>(&mut self, time: Seconds, action: F)
    where
        F: FnOnce(&mut RenderContext, Seconds) + Send + 'static,
    {
        self.next_seq += 1;
        self.queue.push(ScheduledAction {
            time,
            seq: self.next_seq,
            action: Box::new(action),
        });
    }

    /// Advances the clock by the given duration in fixed tick steps, firing
    /// every scheduled action whose target time the advancing clock crosses
    /// (within the look-ahead horizon).
    pub fn process(&mut self, duration: impl Into<Seconds>) {
        let end = self.clock + duration.into();
        while self.clock < end {
            self.clock = Seconds((self.clock.0 + self.config.tick_interval.0).min(end.0));
            self.run_due_actions();
        }
    }

    fn run_due_actions(&mut self) {
        loop {
            let horizon = self.clock + self.config.look_ahead;
            let due = self
                .queue
                .iter()
                .enumerate()
                .filter(|(_, a)| a.time <= horizon)
                .min_by(|(_, a), (_, b)| {
                    a.time
                        .0
                        .partial_cmp(&b.time.0)
                        .unwrap_or(core::cmp::Ordering::Equal)
                        .then(a.seq.cmp(&b.seq))
                })
                .map(|(i, _)| i);
            let Some(index) = due else {
                return;
            };
            let scheduled = self.queue.swap_remove(index);
            (scheduled.action)(self, scheduled.time);
        }
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serializes a node and everything fanning into it, in the shape
    /// output-identity tests compare: the node's label under `name`, each
    /// control param as `{value, inputs}`, extra fields inline, and `inputs`
    /// listing source nodes in connection order. A node already on the
    /// serialization path marks a feedback edge and appears as
    /// `{"ref": uid}` instead of recursing.
    pub fn node_to_json(&self, node: NodeUid) -> serde_json::Value {
        self.node_json(node, &mut Vec::default())
    }

    fn node_json(&self, node: NodeUid, path: &mut Vec<NodeUid>) -> serde_json::Value {
        let Some(entry) = self.nodes.get(&node) else {
            return serde_json::Value::Null;
        };
        if path.contains(&node) {
            return json!({ "ref": node });
        }
        path.push(node);
        let mut map = serde_json::Map::default();
        map.insert("name".to_string(), json!(entry.label));
        for (name, value) in &entry.fields {
            map.insert(name.clone(), value.clone());
        }
        for (name, param) in &entry.params {
            let inputs: Vec<serde_json::Value> = self
                .inputs_of(ConnectTarget::Param(*param))
                .iter()
                .map(|n| self.node_json(*n, path))
                .collect();
            map.insert(
                name.clone(),
                json!({
                    "value": self.param_value(*param),
                    "inputs": inputs,
                }),
            );
        }
        let inputs: Vec<serde_json::Value> = self
            .inputs_of(ConnectTarget::Node(node))
            .iter()
            .map(|n| self.node_json(*n, path))
            .collect();
        map.insert("inputs".to_string(), serde_json::Value::Array(inputs));
        path.pop();
        serde_json::Value::Object(map)
    }

    /// Serializes the destination's fan-in.
    pub fn destination_to_json(&self) -> serde_json::Value {
        let inputs: Vec<serde_json::Value> = self
            .inputs_of(ConnectTarget::Destination)
            .iter()
            .map(|n| self.node_to_json(*n))
            .collect();
        json!({ "name": "destination", "inputs": inputs })
    }
}
