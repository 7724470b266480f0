/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{alloc::Layout, cell::Cell, ptr::NonNull};

use crate::alloc::{AllocatorCore, AllocatorError, GlobalAllocator};

/// An allocator that counts acquisitions and releases, optionally failing one request.
#[derive(Debug, Default)]
pub(crate) struct TrackingAllocator {
    fail_on: Option<usize>,
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    requests: Cell<usize>,
}

impl TrackingAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the request with the zero-based index `n`; every other request succeeds.
    pub(crate) fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::default()
        }
    }

    pub(crate) fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub(crate) fn deallocations(&self) -> usize {
        self.deallocations.get()
    }

    pub(crate) fn live(&self) -> usize {
        self.allocations() - self.deallocations()
    }
}

// SAFETY: Successful requests are forwarded to `GlobalAllocator`.
unsafe impl AllocatorCore for TrackingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocatorError> {
        let request = self.requests.get();
        self.requests.set(request + 1);
        if self.fail_on == Some(request) {
            return Err(AllocatorError);
        }

        let ptr = GlobalAllocator.allocate(layout)?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<[u8]>, layout: Layout) {
        self.deallocations.set(self.deallocations.get() + 1);
        // SAFETY: Inherited from the caller.
        unsafe { GlobalAllocator.deallocate(ptr, layout) }
    }
}
