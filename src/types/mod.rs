// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        finite, Error, ListenerUid, NodeUid, ParamUid, Result, SampleRate, Seconds, UidFactory,
    };
}

pub use {
    errors::{finite, Error, Result},
    time::{SampleRate, Seconds},
    uid::{IsUid, ListenerUid, NodeUid, ParamUid, UidFactory},
};

mod errors;
mod time;
mod uid;
