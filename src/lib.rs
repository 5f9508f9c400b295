// Copyright (c) 2024 Mike Tsao

//! Ligature builds synthesizer instruments as declarative signal graphs.
//!
//! An instrument is a function: given a graph builder, it returns a tree of
//! named unit generators. Compiling that function wires a live rendering
//! graph, bridges scalar parameters into time-varying automation, and hands
//! back a [Synth] that a clock-driven scheduler walks through its
//! start/stop lifecycle.
//!
//! The layers, bottom up:
//!
//! * [engine] is the reference rendering engine: opaque nodes, automatable
//! control params, and the look-ahead scheduler. Real DSP lives behind this
//! surface, not in this crate.
//! * [graph] wraps engine nodes in [Component](graph::Component)s that
//! remember their own fan-out.
//! * [ugen] parses build keys, resolves factories from a [Registry], and
//! produces [Ugen](ugen::Ugen) handles; [automation] reconciles one
//! [Param](automation::Param) against many downstream targets.
//! * [events] routes listeners over the ugen set by name, class, or id.
//! * [synth] compiles an instrument definition and drives its lifecycle.

/// A collection of imports that are useful to users of this crate. `use
/// ligature::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        automation::prelude::*, engine::prelude::*, events::prelude::*, graph::prelude::*,
        synth::prelude::*, types::prelude::*, ugen::prelude::*, Interpolation, SampleBuffer,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    buffer::{Interpolation, PeriodicWaveCoefficients, SampleBuffer},
    engine::RenderContext,
    synth::Synth,
    ugen::Registry,
};

pub mod automation;
pub mod engine;
pub mod events;
pub mod graph;
pub mod synth;
pub mod types;
pub mod ugen;

mod buffer;
