/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::ptr::NonNull;

use thiserror::Error;

/// An allocator could not satisfy a request.
///
/// Carries no payload so reporting it never needs memory of its own. Callers attach the
/// size and purpose of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown allocation error")]
pub struct AllocatorError;

/// The source of memory for [`crate::alloc::AlignedBuffer`].
///
/// # Safety
///
/// A successful `allocate` returns at least `layout.size()` bytes aligned to at least
/// `layout.align()`. Requests that cannot be met return `Err`.
pub unsafe trait AllocatorCore {
    /// Acquire a block satisfying `layout`.
    fn allocate(&self, layout: std::alloc::Layout) -> Result<NonNull<[u8]>, AllocatorError>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`Self::allocate`] on this allocator with the same
    /// `layout`, and not released since.
    unsafe fn deallocate(&self, ptr: NonNull<[u8]>, layout: std::alloc::Layout);
}

// SAFETY: Forwards to the referenced allocator, which upholds the contract.
unsafe impl<T> AllocatorCore for &T
where
    T: AllocatorCore + ?Sized,
{
    #[inline]
    fn allocate(&self, layout: std::alloc::Layout) -> Result<NonNull<[u8]>, AllocatorError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<[u8]>, layout: std::alloc::Layout) {
        // SAFETY: Inherited from the caller.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
