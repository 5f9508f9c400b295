// Copyright (c) 2024 Mike Tsao

use ligature::{
    prelude::*,
    ugen::test_ugens::{register_tracking, CallTracker, TrackedCall},
};
use std::sync::{Arc, RwLock};

fn tracked_registry(tracker: &CallTracker) -> Arc<Registry> {
    let mut registry = Registry::with_builtins();
    register_tracking(&mut registry, "track", Arc::clone(tracker)).unwrap();
    Arc::new(registry)
}

fn event_tracker() -> (Arc<RwLock<Vec<f64>>>, ListenerFn) {
    let seen: Arc<RwLock<Vec<f64>>> = Default::default();
    let seen_clone = Arc::clone(&seen);
    let f: ListenerFn = Arc::new(move |v| seen_clone.write().unwrap().push(v));
    (seen, f)
}

// The two tracking ugens are created in opposite orders in the two synths;
// the class selector must single out the tagged one either way.
#[test]
fn class_selectors_match_independent_of_creation_order() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);

    for tagged_first in [true, false] {
        let mut ctx = RenderContext::new();
        let synth = Synth::new(&mut ctx, &registry, |b| {
            let spec = UgenSpec::default();
            let (tagged, plain) = if tagged_first {
                (b.build("track.amp", &spec, &[])?, b.build("track", &spec, &[])?)
            } else {
                let plain = b.build("track", &spec, &[])?;
                (b.build("track.amp", &spec, &[])?, plain)
            };
            tagged.add(b, &plain)
        })
        .unwrap();

        let (seen, listener) = event_tracker();
        synth.on(".amp:end", listener);
        assert!(synth.has_listeners(".amp:end"));
        assert!(!synth.has_listeners(".pan:end"));

        synth.start(&mut ctx, 0.0);
        synth.stop(&mut ctx, 0.5);
        ctx.process(1.0);

        // Both tracking ugens emit "end" at the stop time, but only the
        // .amp-tagged one has the listener.
        assert_eq!(*seen.read().unwrap(), vec![0.5]);
    }
}

#[test]
fn bare_patterns_listen_on_every_ugen() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        let a = b.build("track", &UgenSpec::default(), &[])?;
        let c = b.build("track", &UgenSpec::default(), &[])?;
        a.add(b, &c)
    })
    .unwrap();

    let (seen, listener) = event_tracker();
    let uid = synth.on("end", listener);
    assert_eq!(synth.listeners("end").len(), 3, "one per ugen, '+' included");

    synth.start(&mut ctx, 0.0);
    synth.stop(&mut ctx, 0.25);
    ctx.process(1.0);
    assert_eq!(*seen.read().unwrap(), vec![0.25, 0.25]);

    // off() removes the listener everywhere it was attached.
    synth.off("end", uid);
    assert!(!synth.has_listeners("end"));
}

// An "end" listener runs while the emitting ugen's stop hook is still on the
// stack. The listener must be able to look back into the synth and the ugen
// that emitted without blocking.
#[test]
fn listeners_can_inspect_the_synth_mid_dispatch() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        b.build("track", &UgenSpec::default(), &[])
    })
    .unwrap();

    let seen: Arc<RwLock<Vec<(String, bool)>>> = Default::default();
    let seen_clone = Arc::clone(&seen);
    let synth_clone = synth.clone();
    synth.on(
        "end",
        Arc::new(move |_| {
            let name = synth_clone.ugens()[0].name();
            let heard = synth_clone.has_listeners("end");
            seen_clone.write().unwrap().push((name, heard));
        }),
    );

    synth.start(&mut ctx, 0.0);
    synth.stop(&mut ctx, 0.25);
    ctx.process(1.0);

    assert_eq!(*seen.read().unwrap(), vec![("track".to_string(), true)]);
}

#[test]
fn once_listeners_detach_after_first_firing() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        b.build("track#solo", &UgenSpec::default(), &[])
    })
    .unwrap();

    let (seen, listener) = event_tracker();
    synth.once("#solo:end", listener);

    synth.ugens()[0].emit("end", 1.0);
    synth.ugens()[0].emit("end", 2.0);
    assert_eq!(*seen.read().unwrap(), vec![1.0]);
    assert!(!synth.has_listeners("#solo:end"));
}

#[test]
fn malformed_patterns_degrade_to_the_empty_match_set() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        b.build("track", &UgenSpec::default(), &[])
    })
    .unwrap();

    let (seen, listener) = event_tracker();
    synth.on("*", listener);
    assert!(!synth.has_listeners("*"));
    assert_eq!(synth.listeners("*"), vec![]);

    synth.ugens()[0].emit("end", 1.0);
    assert!(seen.read().unwrap().is_empty());
}

#[test]
fn apply_dispatches_unit_methods_by_selector() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        let a = b.build("track.amp", &UgenSpec::default(), &[])?;
        let c = b.build("track", &UgenSpec::default(), &[])?;
        a.add(b, &c)
    })
    .unwrap();

    synth.apply(&mut ctx, ".amp", "trigger", &[60.0]);
    assert_eq!(
        *tracker.read().unwrap(),
        vec![TrackedCall::Method("trigger".to_string(), vec![60.0])]
    );

    tracker.write().unwrap().clear();
    synth.call(&mut ctx, "trigger", &[61.0, 0.5]);
    assert_eq!(
        *tracker.read().unwrap(),
        vec![
            TrackedCall::Method("trigger".to_string(), vec![61.0, 0.5]),
            TrackedCall::Method("trigger".to_string(), vec![61.0, 0.5]),
        ],
        "call() reaches every unit that has the method"
    );
}

// synth1's output bus must end up in synth2's named input bus regardless of
// which side's bus springs into existence first.
#[test]
fn inter_synth_wiring_is_order_independent() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);

    // Connect before the receiver ever touches its input bus.
    {
        let mut ctx = RenderContext::new();
        let source = Synth::new(&mut ctx, &registry, |b| {
            b.build("track", &UgenSpec::default(), &[])
        })
        .unwrap();
        let sink = Synth::new(&mut ctx, &registry, |b| {
            b.build("track", &UgenSpec::default(), &[])
        })
        .unwrap();

        source.connect(&mut ctx, &sink, 0, 3);
        let out = source.output_bus_node(&mut ctx, 0);
        let inp = sink.input_bus_node(&mut ctx, 3);
        assert_eq!(ctx.inputs_of(inp.into()), vec![out]);
    }

    // Receiver reads its input bus during build, connect comes later.
    {
        let mut ctx = RenderContext::new();
        let sink = Synth::new(&mut ctx, &registry, |b| {
            let input = b.input(3)?;
            let gain = b.build("+", &UgenSpec::default(), &[(&input).into(), 0.0.into()])?;
            Ok(gain)
        })
        .unwrap();
        let source = Synth::new(&mut ctx, &registry, |b| {
            b.build("track", &UgenSpec::default(), &[])
        })
        .unwrap();

        source.connect(&mut ctx, &sink, 0, 3);
        let out = source.output_bus_node(&mut ctx, 0);
        let inp = sink.input_bus_node(&mut ctx, 3);
        assert_eq!(ctx.inputs_of(inp.into()), vec![out]);
    }
}

#[test]
fn out_ugen_routes_and_suppresses_default_wiring() {
    let tracker = CallTracker::default();
    let registry = tracked_registry(&tracker);
    let mut ctx = RenderContext::new();

    let synth = Synth::new(&mut ctx, &registry, |b| {
        let u = b.build("track", &UgenSpec::default(), &[])?;
        b.output(1, &u)
    })
    .unwrap();

    let bus1 = synth.output_bus_node(&mut ctx, 1);
    let track_outlet = synth.ugens()[0].outlet().unwrap();
    assert_eq!(ctx.inputs_of(bus1.into()), vec![track_outlet]);

    // Bus 0 was never created, so starting connects only bus 1 to the mix.
    synth.start(&mut ctx, 0.0);
    ctx.process(0.1);
    let mix = ctx.audio_bus(1);
    assert_eq!(ctx.inputs_of(mix.into()), vec![bus1]);
}
