/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use crate::arch;

/// A fixed number of lanes of one scalar type, tied to the [`Architecture`](crate::Architecture)
/// that may operate on it.
///
/// Every constructor takes the architecture token, so holding a vector proves the running
/// CPU supports the instructions behind it.
pub trait SIMDVector: Copy + std::fmt::Debug {
    type Arch: arch::Sealed;

    type Scalar: Copy + std::fmt::Debug;

    /// `[Self::Scalar; Self::LANES]`.
    type Array: Copy;

    const LANES: usize;

    /// Zero in every lane.
    fn default(arch: Self::Arch) -> Self;

    fn splat(arch: Self::Arch, value: Self::Scalar) -> Self;

    fn from_array(arch: Self::Arch, x: Self::Array) -> Self;

    fn to_array(self) -> Self::Array;

    /// Read `LANES` consecutive scalars starting at `ptr`. Only scalar alignment is
    /// required.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `LANES` consecutive values.
    unsafe fn load_simd(arch: Self::Arch, ptr: *const Self::Scalar) -> Self;

    /// Write every lane to `LANES` consecutive scalars starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `LANES` consecutive values and not aliased.
    unsafe fn store_simd(self, ptr: *mut Self::Scalar);
}

/// Horizontal sum with a fixed association order.
///
/// Lane `i` is added to lane `i + LANES / 2`, and the lower half is folded again until
/// one lane remains. For eight lanes:
/// ```ignore
/// let h4 = [x0 + x4, x1 + x5, x2 + x6, x3 + x7];
/// let h2 = [h4[0] + h4[2], h4[1] + h4[3]];
/// h2[0] + h2[1]
/// ```
/// Every architecture follows this order, so they agree bit for bit.
pub trait SIMDSumTree: SIMDVector {
    fn sum_tree(self) -> Self::Scalar;
}
