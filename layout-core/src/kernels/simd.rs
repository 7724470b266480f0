/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Eight lane reductions.
//!
//! Each kernel keeps one vector accumulator for the first `simd_end` elements (the largest
//! multiple of [`LANES`] not exceeding the length), reduces it horizontally and then adds
//! the remaining `[simd_end, len)` elements one at a time.

use layout_wide::{
    Architecture, SIMDSumTree, SIMDVector,
    arch::{self, Target1, Target2},
};

use super::gather::StridedField;
use crate::{
    alloc::AllocatorCore,
    dataset::{Aos, Field, Particle, Soa},
};

/// The number of `f32` lanes processed per step.
pub const LANES: usize = 8;

/// Split `len` into `(simd_end, tail)` where `simd_end` is the largest multiple of
/// [`LANES`] that is at most `len` and `tail = len - simd_end`.
#[inline(always)]
pub const fn split(len: usize) -> (usize, usize) {
    let simd_end = len - len % LANES;
    (simd_end, len - simd_end)
}

/// Sum `field` over every record of `aos` using `arch`.
pub fn sum_aos<A, B>(arch: A, aos: &Aos<B>, field: Field) -> f32
where
    A: Architecture,
    B: AllocatorCore,
{
    arch.run2(SumStrided, aos.as_slice(), field)
}

/// Sum the `field` array of `soa` using `arch`.
pub fn sum_soa<A, B>(arch: A, soa: &Soa<B>, field: Field) -> f32
where
    A: Architecture,
    B: AllocatorCore,
{
    arch.run1(SumContiguous, soa.field(field))
}

/// Sum `field` over every record of `aos` on the best architecture of the running CPU.
pub fn sum_aos_dispatched<B>(aos: &Aos<B>, field: Field) -> f32
where
    B: AllocatorCore,
{
    arch::dispatch2(SumStrided, aos.as_slice(), field)
}

/// Sum the `field` array of `soa` on the best architecture of the running CPU.
pub fn sum_soa_dispatched<B>(soa: &Soa<B>, field: Field) -> f32
where
    B: AllocatorCore,
{
    arch::dispatch1(SumContiguous, soa.field(field))
}

/////////////
// Kernels //
/////////////

/// Strided gather over array-of-structures records.
#[derive(Debug, Clone, Copy)]
struct SumStrided;

impl<A> Target2<A, f32, &[Particle], Field> for SumStrided
where
    A: Architecture,
{
    #[inline(always)]
    fn run(self, arch: A, records: &[Particle], field: Field) -> f32 {
        let column = StridedField::new(records, field);
        let (simd_end, _) = split(column.len());

        let mut acc = A::f32x8::default(arch);
        let mut i = 0;
        while i < simd_end {
            acc = acc + column.gather(arch, i);
            i += LANES;
        }

        let mut sum = acc.sum_tree();
        for i in simd_end..column.len() {
            sum += column.value(i);
        }
        sum
    }
}

/// Contiguous loads over one structure-of-arrays field.
#[derive(Debug, Clone, Copy)]
struct SumContiguous;

impl<A> Target1<A, f32, &[f32]> for SumContiguous
where
    A: Architecture,
{
    #[inline(always)]
    fn run(self, arch: A, x: &[f32]) -> f32 {
        let (simd_end, _) = split(x.len());
        let ptr = x.as_ptr();

        let mut acc = A::f32x8::default(arch);
        let mut i = 0;
        while i < simd_end {
            // SAFETY: `i + LANES <= simd_end <= x.len()`, so all eight reads are in bounds.
            acc = acc + unsafe { A::f32x8::load_simd(arch, ptr.add(i)) };
            i += LANES;
        }

        let mut sum = acc.sum_tree();
        for v in &x[simd_end..] {
            sum += *v;
        }
        sum
    }
}

///////////
// Tests //
///////////
