// Copyright (c) 2024 Mike Tsao

//! The unit-generator layer: build-key parsing, the factory registry, and the
//! [Ugen] handles the graph builder produces.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Input, Key, Registry, SpecValue, Ugen, UgenFactory, UgenShell, UgenSpec, Unit,
    };
}

pub use key::Key;
pub use registry::{Registry, UgenFactory};
pub use spec::{SpecValue, UgenSpec};
pub use ugen::{Input, Ugen, UgenShell};
pub use unit::{Unit, UnitFn, UnitMethodFn};

pub mod builtin;
pub(crate) mod key;
pub mod test_ugens;

mod registry;
mod spec;
#[allow(clippy::module_inception)]
mod ugen;
mod unit;
