/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Memory layout micro-benchmarks.
//!
//! The same particle data is stored twice: once as an array of structures ([`dataset::Aos`])
//! where every record is wider than a cache line, and once as a structure of arrays
//! ([`dataset::Soa`]) with one contiguous, cache-line aligned array per field. One field is
//! then reduced with a scalar loop and with an eight lane SIMD loop over each layout, and
//! [`bench::run`] reports the time, effective bandwidth and relative speedups of the four
//! combinations.

pub mod alloc;
pub mod bandwidth;
pub mod bench;
pub mod dataset;
pub mod kernels;
pub mod timing;

#[cfg(test)]
mod test_util;
