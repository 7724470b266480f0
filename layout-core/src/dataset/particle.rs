/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use super::Field;
use crate::alloc::CACHE_LINE;

/// A single array-of-structures record.
///
/// Only `x`, `y`, `z` and `w` carry data. The inert floats and the trailing padding widen
/// the record past a cache line so that reading one field per record drags the rest of the
/// record through the memory hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub inert: [f32; 4],
    pub padding: [u8; 48],
}

const _ASSERT_STRIDE: () = assert!(
    std::mem::size_of::<Particle>() == 80,
    "a particle record must be exactly 80 bytes"
);

const _ASSERT_WIDER_THAN_LINE: () = assert!(
    std::mem::size_of::<Particle>() > CACHE_LINE,
    "a particle record must span more than one cache line"
);

impl Particle {
    /// A record with every byte zero.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 0.0,
        inert: [0.0; 4],
        padding: [0; 48],
    };

    /// The initialized record at position `index`.
    pub fn at(index: usize) -> Self {
        Self {
            x: Field::X.initial_value(index),
            y: Field::Y.initial_value(index),
            z: Field::Z.initial_value(index),
            w: Field::W.initial_value(index),
            ..Self::ZERO
        }
    }

    #[inline(always)]
    pub fn get(&self, field: Field) -> f32 {
        match field {
            Field::X => self.x,
            Field::Y => self.y,
            Field::Z => self.z,
            Field::W => self.w,
        }
    }
}

///////////
// Tests //
///////////
