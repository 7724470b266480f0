/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{alloc::Layout, num::NonZeroUsize, ptr::NonNull};

use super::{AllocatorCore, AllocatorError, CACHE_LINE, GlobalAllocator};

/// An owning, fixed-length slice whose base address is aligned to [`CACHE_LINE`].
///
/// The memory is obtained from `A` on construction and returned to `A` exactly once when
/// the buffer is dropped.
#[derive(Debug)]
pub struct AlignedBuffer<T, A = GlobalAllocator>
where
    A: AllocatorCore,
{
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
    allocator: A,
}

// SAFETY: `AlignedBuffer` uniquely owns its elements, so it may cross threads whenever
// the elements and the allocator can.
unsafe impl<T, A> Send for AlignedBuffer<T, A>
where
    T: Send,
    A: AllocatorCore + Send,
{
}

// SAFETY: Shared access only hands out `&[T]`.
unsafe impl<T, A> Sync for AlignedBuffer<T, A>
where
    T: Sync,
    A: AllocatorCore + Sync,
{
}

impl<T, A> AlignedBuffer<T, A>
where
    T: Copy,
    A: AllocatorCore,
{
    /// Allocate room for `len` values of `T` from `allocator` and set every entry to
    /// `fill`.
    ///
    /// Returns an error if the size of the request overflows a [`Layout`] or the allocator
    /// cannot satisfy it.
    pub fn new(len: NonZeroUsize, fill: T, allocator: A) -> Result<Self, AllocatorError> {
        let layout = Layout::array::<T>(len.get())
            .and_then(|layout| layout.align_to(CACHE_LINE))
            .map_err(|_| AllocatorError)?;

        let ptr = allocator.allocate(layout)?.cast::<T>();
        for i in 0..len.get() {
            // SAFETY: `allocate` returned at least `layout.size()` bytes, which has room
            // for `len` values of `T` at a suitable alignment.
            unsafe { ptr.as_ptr().add(i).write(fill) };
        }

        Ok(Self {
            ptr,
            len: len.get(),
            layout,
            allocator,
        })
    }
}

impl<T, A> AlignedBuffer<T, A>
where
    A: AllocatorCore,
{
    /// The layout requested from the allocator.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl<T, A> std::ops::Deref for AlignedBuffer<T, A>
where
    A: AllocatorCore,
{
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: All `len` elements were initialized in `new` and the memory lives as
        // long as `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, A> std::ops::DerefMut for AlignedBuffer<T, A>
where
    A: AllocatorCore,
{
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: All `len` elements were initialized in `new` and `&mut self` guarantees
        // exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, A> Drop for AlignedBuffer<T, A>
where
    A: AllocatorCore,
{
    fn drop(&mut self) {
        let ptr = std::ptr::slice_from_raw_parts_mut(
            self.ptr.as_ptr().cast::<u8>(),
            self.layout.size(),
        );

        // SAFETY: `self.ptr` is non-null, so the slice pointer is too. The pointer and
        // layout are exactly those used for the allocation in `new`. `T: Copy` at
        // construction means there is nothing to drop in place.
        unsafe {
            self.allocator
                .deallocate(NonNull::new_unchecked(ptr), self.layout)
        }
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TrackingAllocator;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn filled_and_aligned() {
        for len in [1, 3, 16, 17, 1000] {
            let buffer = AlignedBuffer::new(nz(len), 2.5f32, GlobalAllocator).unwrap();
            assert_eq!(buffer.len(), len);
            assert!(buffer.iter().all(|v| *v == 2.5));
            assert_eq!((buffer.as_ptr() as usize) % CACHE_LINE, 0);
            assert_eq!(buffer.layout().align(), CACHE_LINE);
            assert_eq!(buffer.layout().size(), len * std::mem::size_of::<f32>());
        }
    }

    #[test]
    fn writes_are_visible() {
        let mut buffer = AlignedBuffer::new(nz(8), 0u32, GlobalAllocator).unwrap();
        buffer
            .iter_mut()
            .enumerate()
            .for_each(|(i, v)| *v = i as u32);
        assert_eq!(&*buffer, &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn released_exactly_once() {
        let allocator = TrackingAllocator::new();
        {
            let _a = AlignedBuffer::new(nz(10), 0.0f32, &allocator).unwrap();
            let _b = AlignedBuffer::new(nz(20), 0.0f32, &allocator).unwrap();
            assert_eq!(allocator.live(), 2);
        }
        assert_eq!(allocator.live(), 0);
        assert_eq!(allocator.allocations(), 2);
        assert_eq!(allocator.deallocations(), 2);
    }

    #[test]
    fn oversized_request_fails() {
        let r = AlignedBuffer::new(nz(usize::MAX / 2), 0.0f32, GlobalAllocator);
        assert_eq!(r.unwrap_err(), AllocatorError);
    }

    #[test]
    fn allocator_failure_propagates() {
        let allocator = TrackingAllocator::failing_on(0);
        let r = AlignedBuffer::new(nz(4), 0.0f32, &allocator);
        assert!(r.is_err());
        assert_eq!(allocator.live(), 0);
    }
}
