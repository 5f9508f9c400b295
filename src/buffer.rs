// Copyright (c) 2024 Mike Tsao

//! A multi-channel sample container and the handful of shaping operations the
//! instrument layer needs from it. Every operation returns a new buffer;
//! loading and decoding are somebody else's job.

use crate::types::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

/// Periodic-wave synthesis is fed from at most this many samples.
pub const PERIODIC_WAVE_MAX_SAMPLES: usize = 4096;

/// How [SampleBuffer::resample] picks values between source frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Take the nearest source frame.
    Nearest,
    /// Interpolate linearly between the two surrounding frames.
    #[default]
    Linear,
}

/// Frequency-domain coefficient pairs for periodic-wave synthesis, one
/// real/imaginary pair per harmonic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodicWaveCoefficients {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

/// A channel-count/length/sample-rate container of samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    channels: Vec<Vec<f64>>,
    sample_rate: SampleRate,
}
impl SampleBuffer {
    /// A silent buffer with the given shape.
    pub fn new(channel_count: usize, length: usize, sample_rate: SampleRate) -> Self {
        Self {
            channels: vec![vec![0.0; length]; channel_count],
            sample_rate,
        }
    }

    /// Wraps existing channel data. All channels must be the same length.
    pub fn from_channels(channels: Vec<Vec<f64>>, sample_rate: SampleRate) -> Result<Self> {
        if let Some(first) = channels.first() {
            if channels.iter().any(|c| c.len() != first.len()) {
                return Err(Error::Buffer("channels differ in length".to_string()));
            }
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    #[allow(missing_docs)]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// The buffer's length in seconds.
    pub fn duration(&self) -> Seconds {
        Seconds(self.len() as f64 / self.sample_rate.0 as f64)
    }

    /// One channel's samples.
    pub fn channel(&self, index: usize) -> Result<&[f64]> {
        self.channels
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Buffer(format!("no channel {index}")))
    }

    fn wrap_index(&self, index: isize) -> usize {
        let len = self.len() as isize;
        if len == 0 {
            return 0;
        }
        let index = if index < 0 { index + len } else { index };
        index.clamp(0, len) as usize
    }

    /// Copies the frames in `[start, end)`. Negative indices count back from
    /// the end. An inverted range yields an empty buffer.
    pub fn slice(&self, start: isize, end: isize) -> Self {
        let start = self.wrap_index(start);
        let end = self.wrap_index(end);
        let channels = self
            .channels
            .iter()
            .map(|c| {
                if start < end {
                    c[start..end].to_vec()
                } else {
                    Vec::default()
                }
            })
            .collect();
        Self {
            channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Appends another buffer's frames. The channel counts must match; the
    /// result keeps this buffer's sample rate.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        if self.channel_count() != other.channel_count() {
            return Err(Error::Buffer(format!(
                "cannot concat {} channels onto {}",
                other.channel_count(),
                self.channel_count()
            )));
        }
        let channels = self
            .channels
            .iter()
            .zip(other.channels.iter())
            .map(|(a, b)| {
                let mut c = a.clone();
                c.extend_from_slice(b);
                c
            })
            .collect();
        Ok(Self {
            channels,
            sample_rate: self.sample_rate,
        })
    }

    /// The frames in reverse order.
    pub fn reverse(&self) -> Self {
        let channels = self
            .channels
            .iter()
            .map(|c| c.iter().rev().copied().collect())
            .collect();
        Self {
            channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Splits into `n` near-equal consecutive pieces. The last piece absorbs
    /// the remainder.
    pub fn split(&self, n: usize) -> Vec<Self> {
        if n == 0 {
            return Vec::default();
        }
        let len = self.len() as isize;
        let step = (self.len() as f64 / n as f64).ceil() as isize;
        (0..n as isize)
            .map(|i| self.slice(i * step, ((i + 1) * step).min(len)))
            .collect()
    }

    /// Scales every channel so the loudest sample has amplitude 1. A silent
    /// buffer is returned unchanged.
    pub fn normalize(&self) -> Self {
        let peak = self
            .channels
            .iter()
            .flatten()
            .fold(0.0_f64, |peak, v| peak.max(v.abs()));
        if peak == 0.0 {
            return self.clone();
        }
        let channels = self
            .channels
            .iter()
            .map(|c| c.iter().map(|v| v / peak).collect())
            .collect();
        Self {
            channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Stretches or shrinks every channel to `size` frames.
    pub fn resample(&self, size: usize, interpolation: Interpolation) -> Self {
        let len = self.len();
        if len == 0 || size == 0 {
            return Self {
                channels: vec![Vec::default(); self.channel_count()],
                sample_rate: self.sample_rate,
            };
        }
        let step = if size > 1 {
            (len - 1) as f64 / (size - 1) as f64
        } else {
            0.0
        };
        let channels = self
            .channels
            .iter()
            .map(|c| {
                (0..size)
                    .map(|i| {
                        let position = i as f64 * step;
                        match interpolation {
                            Interpolation::Nearest => c[(position.round() as usize).min(len - 1)],
                            Interpolation::Linear => {
                                let low = position.floor() as usize;
                                let high = (low + 1).min(len - 1);
                                let fraction = position - low as f64;
                                c[low] + (c[high] - c[low]) * fraction
                            }
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Converts up to the first [PERIODIC_WAVE_MAX_SAMPLES] samples of one
    /// channel into frequency-domain coefficient pairs, scaled so that a
    /// single-cycle unit sine yields a first-harmonic imaginary coefficient
    /// of 1.
    pub fn to_periodic_wave(&self, channel: usize) -> Result<PeriodicWaveCoefficients> {
        let samples = self.channel(channel)?;
        if samples.is_empty() {
            return Err(Error::Buffer("empty channel".to_string()));
        }
        let n = samples.len().min(PERIODIC_WAVE_MAX_SAMPLES);

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        let mut spectrum: Vec<Complex<f64>> = samples[..n]
            .iter()
            .map(|v| Complex::new(*v, 0.0))
            .collect();
        fft.process(&mut spectrum);

        let scale = 2.0 / n as f64;
        let harmonics = n / 2;
        let mut coefficients = PeriodicWaveCoefficients {
            real: Vec::with_capacity(harmonics),
            imag: Vec::with_capacity(harmonics),
        };
        for (k, bin) in spectrum.iter().take(harmonics).enumerate() {
            if k == 0 {
                coefficients.real.push(bin.re / n as f64);
                coefficients.imag.push(0.0);
            } else {
                coefficients.real.push(bin.re * scale);
                coefficients.imag.push(-bin.im * scale);
            }
        }
        Ok(coefficients)
    }
}
