// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use ligature::{automation::Param, engine::ConnectTarget, prelude::*};
use std::sync::Arc;

fn registry() -> Arc<Registry> {
    Arc::new(Registry::with_builtins())
}

// One logical param, two different kinds of target: the oscillator's native
// frequency control, and a plain node reached through the synthesized signal
// source. Every automation call must land identically on both.
#[test]
fn one_param_drives_heterogeneous_targets_in_lockstep() {
    let registry = registry();
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        let freq = b.param("freq", 110.0)?;
        let carrier = b.build("sin", &UgenSpec::default().with("freq", &freq), &[])?;
        let shadow = b.ctx().create_node("filter");
        freq.connect(b.ctx(), shadow.into());
        Ok(carrier)
    })
    .unwrap();

    let freq = synth.param("freq").unwrap();
    let osc = synth.ugens()[0].outlet().unwrap();
    let control = ctx.param_of(osc, "frequency").unwrap();

    freq.set(&mut ctx, 220.0).unwrap();
    freq.lin_to(&mut ctx, 440.0, Seconds(1.0)).unwrap();
    ctx.process(0.5);

    let halfway = ctx.param_value(control);
    assert!(approx_eq!(f64, halfway, 330.0, epsilon = 1e-6));
    assert!(approx_eq!(f64, freq.value_of(&ctx), halfway, epsilon = 1e-9));

    ctx.process(1.0);
    assert!(approx_eq!(f64, ctx.param_value(control), 440.0));
}

#[test]
fn exponential_ramps_read_back_geometrically() {
    let registry = registry();
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        let freq = b.param("freq", 100.0)?;
        b.build("sin", &UgenSpec::default().with("freq", &freq), &[])
    })
    .unwrap();
    let freq = synth.param("freq").unwrap();

    freq.set(&mut ctx, 100.0).unwrap();
    freq.exp_to(&mut ctx, 400.0, Seconds(1.0)).unwrap();
    ctx.process(0.5);
    assert!(approx_eq!(
        f64,
        freq.value_of(&ctx),
        200.0,
        epsilon = 1e-6
    ));
}

#[test]
fn cancel_removes_pending_automation_everywhere() {
    let registry = registry();
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        let level = b.param("level", 1.0)?;
        b.build("sin", &UgenSpec::default().with("freq", &level), &[])
    })
    .unwrap();
    let level = synth.param("level").unwrap();

    level.set_at(&mut ctx, 0.2, Seconds(0.5)).unwrap();
    level.set_at(&mut ctx, 0.8, Seconds(2.0)).unwrap();
    level.cancel(&mut ctx, Seconds(1.0)).unwrap();
    ctx.process(3.0);

    assert!(approx_eq!(f64, level.value_of(&ctx), 0.2));
}

#[test]
fn curves_step_through_their_values() {
    let registry = registry();
    let mut ctx = RenderContext::new();
    let gain = ctx.create_gain();

    let env = Param::new("env", 0.0).unwrap();
    env.connect(&mut ctx, ConnectTarget::Param(gain.gain));
    env.curve_at(&mut ctx, &[0.0, 1.0, 0.5], Seconds(0.0), Seconds(3.0))
        .unwrap();

    ctx.process(1.5);
    assert!(approx_eq!(f64, env.value_of(&ctx), 1.0));
    ctx.process(2.0);
    assert!(approx_eq!(f64, env.value_of(&ctx), 0.5));
}

#[test]
fn scheduling_errors_do_not_disturb_lifecycle_state() {
    let registry = registry();
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        let freq = b.param("freq", 440.0)?;
        b.build("sin", &UgenSpec::default().with("freq", &freq), &[])
    })
    .unwrap();
    synth.start(&mut ctx, 0.0);
    ctx.process(0.1);
    assert_eq!(synth.state(), SynthState::Started);

    let freq = synth.param("freq").unwrap();
    assert!(matches!(
        freq.set(&mut ctx, f64::NAN),
        Err(Error::Value(_))
    ));
    assert_eq!(synth.state(), SynthState::Started);
    assert!(approx_eq!(f64, freq.value_of(&ctx), 440.0));
}
