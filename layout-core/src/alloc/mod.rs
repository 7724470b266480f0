/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{alloc::Layout, ptr::NonNull};

mod buffer;
mod traits;

pub use buffer::AlignedBuffer;
pub use traits::{AllocatorCore, AllocatorError};

/// The alignment applied to every dataset buffer.
pub const CACHE_LINE: usize = 64;

/// Rust's global allocator. Zero sized requests fail.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GlobalAllocator;

// SAFETY: `std::alloc::alloc` returns exactly `layout` or null, and null becomes `Err`.
unsafe impl AllocatorCore for GlobalAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocatorError> {
        if layout.size() == 0 {
            return Err(AllocatorError);
        }

        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        let ptr = std::ptr::slice_from_raw_parts_mut(ptr, layout.size());
        NonNull::new(ptr).ok_or(AllocatorError)
    }

    unsafe fn deallocate(&self, ptr: NonNull<[u8]>, layout: Layout) {
        // SAFETY: `ptr` and `layout` match a live allocation per the caller.
        unsafe { std::alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) }
    }
}

///////////
// Tests //
///////////
