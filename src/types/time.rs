// Copyright (c) 2024 Mike Tsao

//! Wall-clock time as the rendering engine reports it.

use derivative::Derivative;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// A point in time, or a duration, measured in seconds on the rendering
/// engine's clock. Scheduling calls compare these, so the type is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
#[allow(missing_docs)]
impl Seconds {
    pub const ZERO: Self = Self(0.0);
}
impl From<f64> for Seconds {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<Seconds> for f64 {
    fn from(value: Seconds) -> Self {
        value.0
    }
}
impl core::ops::Add<Seconds> for Seconds {
    type Output = Self;

    fn add(self, rhs: Seconds) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl core::ops::Sub<Seconds> for Seconds {
    type Output = Self;

    fn sub(self, rhs: Seconds) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Samples per second. Always a positive integer; cannot be zero.
#[derive(Synonym, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct SampleRate(#[derivative(Default(value = "44100"))] pub usize);
#[allow(missing_docs)]
impl SampleRate {
    pub const DEFAULT_SAMPLE_RATE: usize = 44100;
    pub const DEFAULT: SampleRate = SampleRate::new(Self::DEFAULT_SAMPLE_RATE);

    pub const fn new(value: usize) -> Self {
        if value != 0 {
            Self(value)
        } else {
            Self(Self::DEFAULT_SAMPLE_RATE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_ordering() {
        assert!(Seconds(1.0) < Seconds(1.25));
        assert_eq!(Seconds(0.5) + Seconds(0.5), Seconds(1.0));
        assert_eq!(Seconds(2.0) - Seconds(0.5), Seconds(1.5));
    }

    #[test]
    fn sample_rate_refuses_zero() {
        assert_eq!(SampleRate::new(0), SampleRate::DEFAULT);
        assert_eq!(SampleRate::default().0, 44100);
    }
}
