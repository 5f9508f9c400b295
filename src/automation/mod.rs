// Copyright (c) 2024 Mike Tsao

//! The parameter bridge: one logical scalar driving many downstream targets
//! through identical automation timelines.

/// The most commonly used imports.
pub mod prelude {
    pub use super::Param;
}

pub use param::Param;

mod param;
