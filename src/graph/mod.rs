// Copyright (c) 2024 Mike Tsao

//! The thin adapters between engine nodes and the graph-building layers
//! above: the [Component] node wrapper and the shared fan-in helper.

/// The most commonly used imports.
pub mod prelude {
    pub use super::Component;
}

pub use component::Component;
pub(crate) use sum::fan_into;

mod component;
mod sum;
