/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use crate::{
    arch::{self, Scalar},
    traits::{SIMDSumTree, SIMDVector},
};

/// A vector stored as a plain array, with every operation written as a loop over lanes.
///
/// Its alignment is that of `[T; N]`, which is usually weaker than the matching hardware
/// register type.
#[derive(Debug, Clone, Copy)]
pub struct Emulated<T, const N: usize, A = Scalar>(pub(crate) [T; N], A);

impl<T, const N: usize, A> Emulated<T, N, A> {
    /// Build lane `i` from `f(i)`.
    pub fn from_arch_fn<F>(arch: A, f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        Self(core::array::from_fn(f), arch)
    }
}

impl<T, const N: usize, A> SIMDVector for Emulated<T, N, A>
where
    T: Copy + std::fmt::Debug + Default,
    A: arch::Sealed,
{
    type Arch = A;
    type Scalar = T;
    type Array = [T; N];
    const LANES: usize = N;

    fn default(arch: A) -> Self {
        Self::splat(arch, T::default())
    }

    fn splat(arch: A, value: T) -> Self {
        Self([value; N], arch)
    }

    fn from_array(arch: A, x: [T; N]) -> Self {
        Self(x, arch)
    }

    fn to_array(self) -> [T; N] {
        self.0
    }

    #[inline(always)]
    unsafe fn load_simd(arch: A, ptr: *const T) -> Self {
        // SAFETY: `ptr` is readable for `N` values per the caller.
        let lanes = unsafe { ptr.cast::<[T; N]>().read_unaligned() };
        Self(lanes, arch)
    }

    #[inline(always)]
    unsafe fn store_simd(self, ptr: *mut T) {
        // SAFETY: `ptr` is writable for `N` values per the caller.
        unsafe { ptr.cast::<[T; N]>().write_unaligned(self.0) }
    }
}

impl<T, const N: usize, A> std::ops::Add for Emulated<T, N, A>
where
    T: Copy + std::ops::Add<Output = T>,
    A: Copy,
{
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::from_arch_fn(self.1, |i| self.0[i] + rhs.0[i])
    }
}

impl<const N: usize, A> SIMDSumTree for Emulated<f32, N, A>
where
    A: arch::Sealed,
{
    /// Fold the upper half of the live lanes onto the lower half until one lane remains.
    ///
    /// This is the same association order the hardware reductions use, so the emulated
    /// result matches them bit for bit.
    #[inline(always)]
    fn sum_tree(self) -> f32 {
        const { assert!(N.is_power_of_two(), "tree reduction needs a power of two") };

        let mut x = self.0;
        let mut live = N;
        while live > 1 {
            live /= 2;
            for i in 0..live {
                x[i] += x[i + live];
            }
        }
        x[0]
    }
}

///////////
// Tests //
///////////
