/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

#![allow(non_camel_case_types)]

use super::{Target1, Target2};
use crate::{Architecture, Emulated, arch};

pub type f32x8 = Emulated<f32, 8>;

/// The portable architecture: every vector is an array and every operation a loop.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Scalar;

impl Scalar {
    pub const fn new() -> Self {
        Self
    }
}

impl arch::sealed::Sealed for Scalar {}

impl Architecture for Scalar {
    type f32x8 = f32x8;

    fn level() -> arch::Level {
        arch::Level::scalar()
    }

    #[inline(always)]
    fn run1<F, T0, R>(self, f: F, x0: T0) -> R
    where
        F: Target1<Self, R, T0>,
    {
        f.run(self, x0)
    }

    #[inline(always)]
    fn run2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
    where
        F: Target2<Self, R, T0, T1>,
    {
        f.run(self, x0, x1)
    }
}
