/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::arch::x86_64::*;

use crate::{
    Emulated,
    arch::x86_64::V3,
    traits::{SIMDSumTree, SIMDVector},
};

/// Eight `f32` lanes in one AVX register.
#[derive(Debug, Clone, Copy)]
#[allow(non_camel_case_types)]
#[repr(transparent)]
pub struct f32x8(pub __m256);

impl f32x8 {
    /// The same lanes as a portable vector.
    #[inline(always)]
    pub fn emulated(self) -> Emulated<f32, 8> {
        Emulated::from_array(crate::arch::Scalar, self.to_array())
    }
}

// The `V3` argument of each constructor guarantees AVX is available, which covers every
// intrinsic used in this file.
impl SIMDVector for f32x8 {
    type Arch = V3;
    type Scalar = f32;
    type Array = [f32; 8];
    const LANES: usize = 8;

    #[inline(always)]
    fn default(_: V3) -> Self {
        // SAFETY: AVX is available.
        Self(unsafe { _mm256_setzero_ps() })
    }

    #[inline(always)]
    fn splat(_: V3, value: f32) -> Self {
        // SAFETY: AVX is available.
        Self(unsafe { _mm256_set1_ps(value) })
    }

    #[inline(always)]
    fn from_array(_: V3, x: [f32; 8]) -> Self {
        // SAFETY: Both types are 32 bytes and every bit pattern is valid for each.
        unsafe { std::mem::transmute::<[f32; 8], Self>(x) }
    }

    #[inline(always)]
    fn to_array(self) -> [f32; 8] {
        // SAFETY: Both types are 32 bytes and every bit pattern is valid for each.
        unsafe { std::mem::transmute::<Self, [f32; 8]>(self) }
    }

    #[inline(always)]
    unsafe fn load_simd(_: V3, ptr: *const f32) -> Self {
        // SAFETY: AVX is available and `ptr` is readable for 8 values per the caller.
        Self(unsafe { _mm256_loadu_ps(ptr) })
    }

    #[inline(always)]
    unsafe fn store_simd(self, ptr: *mut f32) {
        // SAFETY: AVX is available and `ptr` is writable for 8 values per the caller.
        unsafe { _mm256_storeu_ps(ptr, self.0) }
    }
}

impl std::ops::Add for f32x8 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        // SAFETY: AVX is available.
        Self(unsafe { _mm256_add_ps(self.0, rhs.0) })
    }
}

impl SIMDSumTree for f32x8 {
    #[inline(always)]
    fn sum_tree(self) -> f32 {
        // SAFETY: AVX and the SSE subset it implies are available.
        unsafe {
            // [x0 + x4, x1 + x5, x2 + x6, x3 + x7]
            let h4 = _mm_add_ps(_mm256_castps256_ps128(self.0), _mm256_extractf128_ps(self.0, 1));
            // [h4[0] + h4[2], h4[1] + h4[3], ..]
            let h2 = _mm_add_ps(h4, _mm_movehl_ps(h4, h4));
            // h2[0] + h2[1]
            let h1 = _mm_add_ss(h2, _mm_shuffle_ps(h2, h2, 0x1));
            _mm_cvtss_f32(h1)
        }
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use rand::{
        Rng, SeedableRng,
        distr::{Distribution, Uniform},
        rngs::StdRng,
    };

    use super::*;
    use crate::Architecture;

    #[test]
    fn array_conversion() {
        let Some(arch) = V3::new_checked_uncached() else {
            return;
        };

        let x = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let v = f32x8::from_array(arch, x);
        assert_eq!(v.to_array(), x);
        assert_eq!(v.emulated().to_array(), x);
        assert_eq!(f32x8::default(arch).to_array(), [0.0; 8]);
        assert_eq!(f32x8::splat(arch, 1.5).to_array(), [1.5; 8]);
    }

    #[test]
    fn load_store() {
        let Some(arch) = V3::new_checked_uncached() else {
            return;
        };

        let src: Vec<f32> = (0..10).map(|i| i as f32).collect();
        // SAFETY: `src[2..]` has 8 readable elements.
        let v = unsafe { f32x8::load_simd(arch, src[2..].as_ptr()) };
        assert_eq!(v.to_array(), [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        let mut dst = [0.0f32; 8];
        // SAFETY: `dst` has 8 writable elements.
        unsafe { v.store_simd(dst.as_mut_ptr()) };
        assert_eq!(dst, v.to_array());
    }

    // The hardware reduction must agree bit-for-bit with the emulated tree.
    #[test]
    fn matches_emulated() {
        let Some(arch) = V3::new_checked_uncached() else {
            return;
        };

        let mut rng = StdRng::seed_from_u64(0x5eed_f32a);
        let dist = Uniform::new(-1.0e6f32, 1.0e6f32).unwrap();
        for _ in 0..1000 {
            let a: [f32; 8] = std::array::from_fn(|_| dist.sample(&mut rng));
            let b: [f32; 8] = std::array::from_fn(|_| rng.random_range(-4.0f32..4.0));

            let v = f32x8::from_array(arch, a) + f32x8::from_array(arch, b);
            let e = Emulated::<f32, 8>::from_array(arch.retarget(), a)
                + Emulated::<f32, 8>::from_array(arch.retarget(), b);

            assert_eq!(v.to_array(), e.to_array());
            assert_eq!(v.sum_tree().to_bits(), e.sum_tree().to_bits());
        }
    }

    #[test]
    fn level() {
        assert_eq!(<V3 as Architecture>::level().as_str(), "x86-64-v3");
    }
}
