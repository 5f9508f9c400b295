// Copyright (c) 2024 Mike Tsao

//! The stock factories every registry can start from: the `"+"`/`"*"`
//! arithmetic nodes that back the `add`/`mul`/`madd` sugar, the bus ugens,
//! and a plain sine oscillator.

use super::{Input, Registry, UgenShell, UgenSpec, Unit};
use crate::engine::ConnectTarget;
use crate::graph::{fan_into, Component};
use crate::synth::SynthBuilder;
use crate::types::prelude::*;
use serde_json::json;

/// Registers the built-in factories. Names are all grammar-valid, so the
/// registrations cannot fail.
pub fn register(registry: &mut Registry) {
    let _ = registry.register("+", sum);
    let _ = registry.register("*", product);
    let _ = registry.register("sin", sin);
    let _ = registry.register("in", input_bus);
    let _ = registry.register("out", output_bus);
    let _ = registry.register("local-in", local_input_bus);
    let _ = registry.register("local-out", local_output_bus);
}

/// Sums N inputs into one shared node. A single input degenerates to
/// pass-through, reusing the input's own outlet instead of creating a node;
/// output-identity checks depend on this shape, so it is load-bearing, not
/// just an optimization.
fn sum(_shell: &UgenShell, b: &mut SynthBuilder, _spec: &UgenSpec, inputs: &[Input]) -> Result<Unit> {
    if let [single] = inputs {
        match single {
            Input::Ugen(u) => {
                if let Some(node) = u.outlet() {
                    return Ok(Unit::new(Component::new(node)));
                }
            }
            Input::Scalar(v) => {
                let node = b.ctx().dc(*v);
                return Ok(Unit::new(Component::new(node)));
            }
            Input::Param(_) => {}
        }
    }
    let gain = b.ctx().create_gain();
    fan_into(b.ctx(), inputs, gain.node.into());
    Ok(Unit::new(Component::new(gain.node)))
}

/// Left-folds inputs into a chain of scaling stages. A signal operand drives
/// a gain param whose base value is 0; a constant operand becomes the gain's
/// base value.
fn product(
    _shell: &UgenShell,
    b: &mut SynthBuilder,
    _spec: &UgenSpec,
    inputs: &[Input],
) -> Result<Unit> {
    let mut iter = inputs.iter();
    let Some(first) = iter.next() else {
        // Multiplicative identity.
        let node = b.ctx().dc(1.0);
        return Ok(Unit::new(Component::new(node)));
    };

    // The first operand is the carrier; its ugen's own linkage record is
    // used when we chain it, so teardown still finds the edge.
    let mut head_ugen = None;
    let mut current = match first {
        Input::Scalar(v) => b.ctx().dc(*v),
        Input::Ugen(u) => {
            head_ugen = Some(u);
            match u.outlet() {
                Some(node) => node,
                None => b.ctx().dc(0.0),
            }
        }
        Input::Param(p) => {
            let through = b.ctx().create_gain();
            p.connect(b.ctx(), through.node.into());
            through.node
        }
    };

    for rhs in iter {
        let stage = match rhs {
            Input::Scalar(v) => b.ctx().create_gain_with(*v),
            Input::Ugen(u) => {
                let stage = b.ctx().create_gain_with(0.0);
                u.connect(b.ctx(), ConnectTarget::Param(stage.gain));
                stage
            }
            Input::Param(p) => {
                let stage = b.ctx().create_gain_with(0.0);
                p.connect(b.ctx(), ConnectTarget::Param(stage.gain));
                stage
            }
        };
        if let Some(u) = head_ugen.take() {
            u.connect(b.ctx(), stage.node.into());
        } else {
            b.ctx().connect(current, stage.node.into());
        }
        current = stage.node;
    }
    Ok(Unit::new(Component::new(current)))
}

/// A plain sine oscillator with `freq` and `detune` controls. Extra inputs
/// modulate the frequency. Emits `end` when stopped.
fn sin(shell: &UgenShell, b: &mut SynthBuilder, spec: &UgenSpec, inputs: &[Input]) -> Result<Unit> {
    let node = b.ctx().create_node("oscillator");
    b.ctx().set_node_field(node, "type", json!("sine"));

    let freq = b
        .ctx()
        .create_param(node, "frequency", spec.number_or("freq", 440.0));
    b.bind_signal(spec.value("freq"), freq);
    let detune = b
        .ctx()
        .create_param(node, "detune", spec.number_or("detune", 0.0));
    b.bind_signal(spec.value("detune"), detune);
    fan_into(b.ctx(), inputs, ConnectTarget::Param(freq));

    let emitter = shell.emitter.clone();
    Ok(Unit::new(Component::new(node)).with_stop(move |_ctx, t| emitter.emit("end", t.0)))
}

fn bus_index(spec: &UgenSpec) -> usize {
    spec.number_or("index", 0.0).max(0.0) as usize
}

fn input_bus(
    _shell: &UgenShell,
    b: &mut SynthBuilder,
    spec: &UgenSpec,
    _inputs: &[Input],
) -> Result<Unit> {
    let node = b.input_bus(bus_index(spec));
    Ok(Unit::new(Component::new(node)))
}

fn output_bus(
    _shell: &UgenShell,
    b: &mut SynthBuilder,
    spec: &UgenSpec,
    inputs: &[Input],
) -> Result<Unit> {
    let node = b.output_bus(bus_index(spec));
    fan_into(b.ctx(), inputs, node.into());
    Ok(Unit::new(Component::new(node)).mark_output())
}

fn local_input_bus(
    _shell: &UgenShell,
    b: &mut SynthBuilder,
    spec: &UgenSpec,
    _inputs: &[Input],
) -> Result<Unit> {
    let node = b.local_bus(bus_index(spec));
    Ok(Unit::new(Component::new(node)))
}

fn local_output_bus(
    _shell: &UgenShell,
    b: &mut SynthBuilder,
    spec: &UgenSpec,
    inputs: &[Input],
) -> Result<Unit> {
    let node = b.local_bus(bus_index(spec));
    fan_into(b.ctx(), inputs, node.into());
    Ok(Unit::new(Component::new(node)).mark_output())
}
