/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use super::{Scalar, Target1, Target2};
use crate::{
    Architecture,
    arch::{self, Hidden},
};

pub mod f32x8_;
pub use f32x8_::f32x8;

////////
// V3 //
////////

/// The x86-64-v3 microarchitecture level: AVX, AVX2, FMA, BMI1/2, F16C, LZCNT and MOVBE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct V3(Hidden);

impl arch::sealed::Sealed for V3 {}

// Every function compiled for V3 carries the same feature list that `v3_supported` checks.
macro_rules! v3_features {
    ($($item:tt)*) => {
        #[target_feature(enable = "avx2,avx,bmi1,bmi2,f16c,fma,lzcnt,movbe,xsave")]
        $($item)*
    }
}

impl V3 {
    /// # Safety
    ///
    /// The running CPU must support every feature in the x86-64-v3 level.
    pub const unsafe fn new() -> Self {
        Self(Hidden)
    }

    /// Return `Some` when the running CPU supports x86-64-v3. The answer is cached.
    pub fn new_checked() -> Option<Self> {
        // SAFETY: `detected` only reports `V3_LEVEL` after probing the CPU.
        unsafe { Self::from_level(super::detected()) }
    }

    /// The portable architecture, for comparing against emulated results.
    pub fn retarget(self) -> Scalar {
        Scalar::new()
    }

    /// Like `new_checked`, but probes the CPU on every call so tests do not depend on the
    /// shared cache.
    #[cfg(test)]
    pub(crate) fn new_checked_uncached() -> Option<Self> {
        // SAFETY: `probe` queries the CPU directly.
        unsafe { Self::from_level(super::probe()) }
    }

    /// # Safety
    ///
    /// `level` must come from a CPU query.
    unsafe fn from_level(level: u8) -> Option<Self> {
        // SAFETY: Guaranteed by the caller.
        (level == super::V3_LEVEL).then(|| unsafe { Self::new() })
    }

    v3_features! {
        // # Safety
        //
        // The running CPU must support x86-64-v3.
        pub(super) unsafe fn run_with_1<F, T0, R>(self, f: F, x0: T0) -> R
        where
            F: Target1<Self, R, T0>,
        {
            f.run(self, x0)
        }
    }

    v3_features! {
        // # Safety
        //
        // The running CPU must support x86-64-v3.
        pub(super) unsafe fn run_with_2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
        where
            F: Target2<Self, R, T0, T1>,
        {
            f.run(self, x0, x1)
        }
    }
}

impl Architecture for V3 {
    type f32x8 = f32x8;

    fn level() -> arch::Level {
        arch::Level::v3()
    }

    #[inline(always)]
    fn run1<F, T0, R>(self, f: F, x0: T0) -> R
    where
        F: Target1<Self, R, T0>,
    {
        // SAFETY: A `V3` value only exists on a V3 capable CPU.
        unsafe { self.run_with_1(f, x0) }
    }

    #[inline(always)]
    fn run2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
    where
        F: Target2<Self, R, T0, T1>,
    {
        // SAFETY: A `V3` value only exists on a V3 capable CPU.
        unsafe { self.run_with_2(f, x0, x1) }
    }
}
