/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Eight lane `f32` vectors for the layout benchmarks.
//!
//! Each [`Architecture`] names one `f32x8` type. Kernels are generic over the architecture
//! and are either called with a token directly or routed through [`arch::dispatch1`] and
//! [`arch::dispatch2`], which pick the best level the running CPU supports.
//!
//! ## Safety
//!
//! Executing an instruction the CPU lacks is undefined behavior, so vectors can only be
//! built from an architecture token. Tokens come from:
//!
//! * [`arch::Scalar`], which is always valid,
//! * a checked constructor such as `V3::new_checked`, or dispatch,
//! * an `unsafe` constructor whose caller vouches for the CPU.
//!
//! [`arch::Scalar`] emulates every operation with array loops. Its horizontal sum uses the
//! same association order as the hardware back ends, so all levels agree bit for bit.

pub mod arch;
pub use arch::{Architecture, Level};

mod emulated;
pub use emulated::Emulated;

mod traits;
pub use traits::{SIMDSumTree, SIMDVector};
