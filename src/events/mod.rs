// Copyright (c) 2024 Mike Tsao

//! Event emission and selector-based routing across a ugen set.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Emitter, ListenerFn, Selector, SelectorTarget};
}

pub use emitter::{Emitter, ListenerFn};
pub use selector::{Selector, SelectorTarget};

mod emitter;
mod selector;
