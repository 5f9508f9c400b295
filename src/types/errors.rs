// Copyright (c) 2024 Mike Tsao

//! The closed error taxonomy. Every failure here is a programmer error (a bad
//! instrument specification), surfaced synchronously at the point of misuse
//! rather than deferred or retried.

use thiserror::Error;

/// All the ways a caller can misuse the graph-building and scheduling
/// surfaces.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A build key or listener pattern violated the grammar.
    #[error("malformed key {0:?}")]
    Parse(String),

    /// A factory was registered under a name that fails the key-name grammar.
    #[error("invalid factory name {0:?}")]
    Registration(String),

    /// A build key named a factory that was never registered.
    #[error("unknown ugen {0:?}")]
    Lookup(String),

    /// A scheduling call received a non-finite numeric argument.
    #[error("non-finite value {0}")]
    Value(f64),

    /// A param was declared with an invalid name.
    #[error("invalid param name {0:?}")]
    ParamName(String),

    /// A sample-buffer operation received incompatible operands, e.g.
    /// concatenation across differing channel counts.
    #[error("buffer misuse: {0}")]
    Buffer(String),
}

/// Crate-wide [Result] alias for the [Error] taxonomy.
pub type Result<T> = core::result::Result<T, Error>;

/// Coerces a numeric argument, failing with [Error::Value] on non-finite
/// input. Scheduling calls pass every numeric argument through this.
pub fn finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Value(value))
    }
}
