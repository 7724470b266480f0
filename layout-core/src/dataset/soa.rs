/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::num::NonZeroUsize;

use super::{Dataset, DatasetError, Field, LayoutKind};
use crate::alloc::{AlignedBuffer, AllocatorCore, GlobalAllocator};

/// Particles stored as a structure of arrays, one cache-line aligned array per field.
#[derive(Debug)]
pub struct Soa<A = GlobalAllocator>
where
    A: AllocatorCore,
{
    x: AlignedBuffer<f32, A>,
    y: AlignedBuffer<f32, A>,
    z: AlignedBuffer<f32, A>,
    w: AlignedBuffer<f32, A>,
    len: NonZeroUsize,
}

impl<A> Soa<A>
where
    A: AllocatorCore + Clone,
{
    /// Allocate four zeroed arrays of `len` floats from `allocator`, in the order x, y, z,
    /// w.
    ///
    /// If any array cannot be obtained, the arrays acquired before it are released before
    /// the error is returned.
    pub fn new(len: NonZeroUsize, allocator: A) -> Result<Self, DatasetError> {
        let bytes = len.get().saturating_mul(std::mem::size_of::<f32>());
        tracing::debug!(len = len.get(), bytes, "allocating SOA field arrays");

        let array = |field: Field| {
            AlignedBuffer::new(len, 0.0f32, allocator.clone()).map_err(|source| {
                DatasetError::Allocation {
                    layout: LayoutKind::Soa,
                    buffer: field.as_str(),
                    bytes,
                    source,
                }
            })
        };

        // Early returns drop the arrays that were already acquired.
        let x = array(Field::X)?;
        let y = array(Field::Y)?;
        let z = array(Field::Z)?;
        let w = array(Field::W)?;
        Ok(Self { x, y, z, w, len })
    }
}

impl<A> Soa<A>
where
    A: AllocatorCore,
{
    /// The contiguous array holding `field`.
    pub fn field(&self, field: Field) -> &[f32] {
        match field {
            Field::X => &self.x,
            Field::Y => &self.y,
            Field::Z => &self.z,
            Field::W => &self.w,
        }
    }
}

impl<A> Dataset for Soa<A>
where
    A: AllocatorCore,
{
    fn kind(&self) -> LayoutKind {
        LayoutKind::Soa
    }

    fn len(&self) -> NonZeroUsize {
        self.len
    }

    fn footprint(&self) -> usize {
        [&self.x, &self.y, &self.z, &self.w]
            .iter()
            .map(|array| array.layout().size())
            .sum()
    }

    fn initialize(&mut self) {
        for (field, array) in [
            (Field::X, &mut self.x),
            (Field::Y, &mut self.y),
            (Field::Z, &mut self.z),
            (Field::W, &mut self.w),
        ] {
            array
                .iter_mut()
                .enumerate()
                .for_each(|(i, v)| *v = field.initial_value(i));
        }
    }
}

///////////
// Tests //
///////////
