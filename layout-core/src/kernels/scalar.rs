/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Reference reductions with a single `f32` accumulator visiting elements in ascending
//! order.

use crate::{
    alloc::AllocatorCore,
    dataset::{Aos, Field, Particle, Soa},
};

/// Sum `field` over every record of `aos`.
pub fn sum_aos<A>(aos: &Aos<A>, field: Field) -> f32
where
    A: AllocatorCore,
{
    let records = aos.as_slice();

    // Resolve the field once so the loop body is a fixed-offset load.
    match field {
        Field::X => fold(records, |p| p.x),
        Field::Y => fold(records, |p| p.y),
        Field::Z => fold(records, |p| p.z),
        Field::W => fold(records, |p| p.w),
    }
}

/// Sum the contiguous `field` array of `soa`.
pub fn sum_soa<A>(soa: &Soa<A>, field: Field) -> f32
where
    A: AllocatorCore,
{
    sum_slice(soa.field(field))
}

/// Sum `x` front to back.
#[inline]
pub fn sum_slice(x: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for v in x {
        sum += *v;
    }
    sum
}

#[inline(always)]
fn fold<F>(records: &[Particle], get: F) -> f32
where
    F: Fn(&Particle) -> f32,
{
    let mut sum = 0.0f32;
    for p in records {
        sum += get(p);
    }
    sum
}

///////////
// Tests //
///////////
