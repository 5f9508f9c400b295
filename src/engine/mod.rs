// Copyright (c) 2024 Mike Tsao

//! The reference rendering engine: opaque rendering nodes and control params
//! held in a [RenderContext], plus the clock-driven look-ahead scheduler that
//! turns declared timelines into fired actions.
//!
//! Nothing here produces samples. The engine exists so that the layers above
//! it, which build graphs and schedule automation, have something concrete and
//! inspectable to build against. A real backend would implement the same
//! surface over an audio device.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ConnectTarget, GainNode, RenderContext, SchedFn, SchedulerConfig, SchedulerConfigBuilder,
        AUDIO_BUS_CHANNELS,
    };
}

pub use context::{
    RenderContext, SchedFn, SchedulerConfig, SchedulerConfigBuilder, AUDIO_BUS_CHANNELS,
};
pub use node::{ConnectTarget, Connection, GainNode};

mod context;
mod node;
mod param;
