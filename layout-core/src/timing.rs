/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{num::NonZeroUsize, time::Instant};

use serde::{Deserialize, Serialize};

/// A unit of time representing nanoseconds.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NanoSeconds(u64);

impl NanoSeconds {
    /// Construct a new instance of self over a raw unit of nanoseconds.
    pub const fn new(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Return `self` as nanoseconds.
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Return `self` as nanoseconds but converted to `f64`.
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// Return `self` as milliseconds.
    pub fn as_millis_f64(self) -> f64 {
        self.as_f64() / 1e6
    }

    /// Return `self` as seconds.
    pub fn as_seconds(self) -> f64 {
        self.as_f64() / 1e9
    }
}

impl From<std::time::Duration> for NanoSeconds {
    fn from(value: std::time::Duration) -> Self {
        Self::new(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl std::fmt::Display for NanoSeconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ns", self.as_nanos())
    }
}

impl std::ops::Add for NanoSeconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

/// The elapsed time between two clock readings. Saturates at zero.
impl std::ops::Sub for NanoSeconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::iter::Sum for NanoSeconds {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, x| acc + x)
    }
}

///////////
// Clock //
///////////

/// A monotonic time source.
pub trait Clock {
    /// The time since an arbitrary, fixed origin. Successive readings never decrease.
    fn now(&self) -> NanoSeconds;
}

impl<T> Clock for &T
where
    T: Clock + ?Sized,
{
    fn now(&self) -> NanoSeconds {
        (**self).now()
    }
}

/// A [`Clock`] backed by [`std::time::Instant`], unaffected by wall-clock adjustments.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> NanoSeconds {
        self.origin.elapsed().into()
    }
}

/////////////
// Measure //
/////////////

/// The outcome of timing one kernel over several iterations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub iterations: NonZeroUsize,
    /// Time spent inside the kernel, summed over all iterations.
    pub total: NanoSeconds,
    /// `total / iterations` in nanoseconds.
    pub average: f64,
    /// The value returned by the final iteration.
    pub result: f32,
}

impl Measurement {
    /// The average time per iteration in milliseconds.
    pub fn average_millis(&self) -> f64 {
        self.average / 1e6
    }
}

/// Invoke `kernel` `iterations` times, reading `clock` immediately before and after each
/// invocation.
///
/// Only the time inside `kernel` is accumulated. Each result is passed through
/// [`std::hint::black_box`] so the call cannot be elided, and the last one is retained.
pub fn measure<C, F>(clock: &C, iterations: NonZeroUsize, mut kernel: F) -> Measurement
where
    C: Clock + ?Sized,
    F: FnMut() -> f32,
{
    let mut total = NanoSeconds::default();
    let mut result = 0.0f32;
    for _ in 0..iterations.get() {
        let start = clock.now();
        result = std::hint::black_box(kernel());
        let stop = clock.now();
        total = total + (stop - start);
    }

    Measurement {
        iterations,
        total,
        average: total.as_f64() / iterations.get() as f64,
        result,
    }
}

///////////
// Tests //
///////////
