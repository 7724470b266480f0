/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::num::NonZeroUsize;

use super::{Dataset, DatasetError, Field, LayoutKind, Particle};
use crate::{
    alloc::{AlignedBuffer, AllocatorCore, GlobalAllocator},
    kernels::gather::StridedField,
};

/// Particles stored as an array of structures.
#[derive(Debug)]
pub struct Aos<A = GlobalAllocator>
where
    A: AllocatorCore,
{
    records: AlignedBuffer<Particle, A>,
    len: NonZeroUsize,
}

impl<A> Aos<A>
where
    A: AllocatorCore,
{
    /// Allocate `len` zeroed records from `allocator`.
    pub fn new(len: NonZeroUsize, allocator: A) -> Result<Self, DatasetError> {
        let bytes = len.get().saturating_mul(std::mem::size_of::<Particle>());
        tracing::debug!(len = len.get(), bytes, "allocating AOS records");

        let records = AlignedBuffer::new(len, Particle::ZERO, allocator).map_err(|source| {
            DatasetError::Allocation {
                layout: LayoutKind::Aos,
                buffer: "records",
                bytes,
                source,
            }
        })?;
        Ok(Self { records, len })
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.records
    }

    /// A strided view of one field across all records.
    pub fn field(&self, field: Field) -> StridedField<'_> {
        StridedField::new(&self.records, field)
    }
}

impl<A> Dataset for Aos<A>
where
    A: AllocatorCore,
{
    fn kind(&self) -> LayoutKind {
        LayoutKind::Aos
    }

    fn len(&self) -> NonZeroUsize {
        self.len
    }

    fn footprint(&self) -> usize {
        self.records.layout().size()
    }

    fn initialize(&mut self) {
        self.records
            .iter_mut()
            .enumerate()
            .for_each(|(i, record)| *record = Particle::at(i));
    }
}

///////////
// Tests //
///////////
