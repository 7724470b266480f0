/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use serde::{Deserialize, Serialize};

use crate::kernels::Variant;

/// The useful bytes a reduction over `n` elements consumes: one `f32` per element.
///
/// Record padding and unused fields dragged in by the array-of-structures layout are not
/// counted.
pub const fn bytes_processed(n: usize) -> usize {
    n.saturating_mul(std::mem::size_of::<f32>())
}

/// Effective bandwidth in GB/s (10^9 bytes per second).
///
/// A zero average time yields `f64::INFINITY`.
pub fn bandwidth_gbps(bytes: usize, average_ns: f64) -> f64 {
    if average_ns <= 0.0 {
        return f64::INFINITY;
    }
    let seconds = average_ns / 1e9;
    (bytes as f64) / seconds / 1e9
}

/// How many times faster `candidate` is than `baseline`.
pub fn speedup(baseline_ns: f64, candidate_ns: f64) -> f64 {
    baseline_ns / candidate_ns
}

/// The four ratios reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speedups {
    /// SOA over AOS with scalar kernels.
    pub scalar_soa_over_aos: f64,
    /// SOA over AOS with SIMD kernels.
    pub simd_soa_over_aos: f64,
    /// SIMD over scalar on the AOS layout.
    pub aos_simd_over_scalar: f64,
    /// SIMD over scalar on the SOA layout.
    pub soa_simd_over_scalar: f64,
}

impl Speedups {
    /// Build from the average time of each variant.
    pub fn new<F>(average_ns: F) -> Self
    where
        F: Fn(Variant) -> f64,
    {
        Self {
            scalar_soa_over_aos: speedup(
                average_ns(Variant::AOS_SCALAR),
                average_ns(Variant::SOA_SCALAR),
            ),
            simd_soa_over_aos: speedup(
                average_ns(Variant::AOS_SIMD),
                average_ns(Variant::SOA_SIMD),
            ),
            aos_simd_over_scalar: speedup(
                average_ns(Variant::AOS_SCALAR),
                average_ns(Variant::AOS_SIMD),
            ),
            soa_simd_over_scalar: speedup(
                average_ns(Variant::SOA_SCALAR),
                average_ns(Variant::SOA_SIMD),
            ),
        }
    }
}

///////////
// Tests //
///////////
