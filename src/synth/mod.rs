// Copyright (c) 2024 Mike Tsao

//! The instrument layer: compiling a definition into a [Synth] and driving
//! it through its lifecycle.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Synth, SynthBuilder, SynthState};
}

pub use builder::SynthBuilder;
pub use synth::{Synth, SynthState};

mod builder;
#[allow(clippy::module_inception)]
mod synth;
