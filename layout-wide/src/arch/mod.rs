/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Architecture tokens and run time dispatch.
//!
//! A kernel is written once, generic over `A: Architecture`, as a zero-sized functor
//! implementing [`Target1`] or [`Target2`]. Calling it through [`Architecture::run1`]
//! compiles the body with that architecture's target features. Calling it through
//! [`dispatch1`] additionally picks the architecture from the running CPU.
//!
//! ```rust
//! use layout_wide::{Architecture, SIMDSumTree, SIMDVector, arch::{Target1, dispatch1}};
//!
//! struct Lanes;
//!
//! impl<A: Architecture> Target1<A, f32, &[f32; 8]> for Lanes {
//!     #[inline(always)]
//!     fn run(self, arch: A, x: &[f32; 8]) -> f32 {
//!         A::f32x8::from_array(arch, *x).sum_tree()
//!     }
//! }
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
//! assert_eq!(dispatch1(Lanes, &x), 36.0);
//! ```
//!
//! CPU detection runs on the first dispatch. Later calls cost one relaxed atomic load.
//!
//! Two levels exist, ordered `Scalar < V3`:
//!
//! * [`Scalar`]: array loops, available everywhere.
//! * [`x86_64::V3`]: AVX2 and FMA, x86_64 only.

use crate::{SIMDSumTree, SIMDVector};

pub(crate) mod emulated;

pub use emulated::Scalar;

/// How capable an [`Architecture`] is. Greater compares as more capable and [`Scalar`]
/// is the minimum.
///
/// ```
/// use layout_wide::{Architecture, arch};
///
/// assert_eq!(arch::Scalar::level().to_string(), "scalar");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(LevelInner);

impl Level {
    const fn scalar() -> Self {
        Self(LevelInner::Scalar)
    }

    pub const fn as_str(self) -> &'static str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub mod x86_64;

        use x86_64::LevelInner;

        pub use x86_64::dispatch1;
        pub use x86_64::dispatch2;
        pub use x86_64::dispatched_level;

        impl Level {
            const fn v3() -> Self {
                Self(LevelInner::V3)
            }
        }
    } else {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        enum LevelInner {
            Scalar,
        }

        impl LevelInner {
            const fn as_str(self) -> &'static str {
                match self {
                    Self::Scalar => "scalar",
                }
            }
        }

        /// Run `f` with [`Scalar`], the only architecture on this target.
        pub fn dispatch1<T, T0, R>(f: T, x0: T0) -> R
        where T: Target1<Scalar, R, T0> {
            f.run(Scalar::new(), x0)
        }

        /// Run `f` with [`Scalar`], the only architecture on this target.
        pub fn dispatch2<T, T0, T1, R>(f: T, x0: T0, x1: T1) -> R
        where T: Target2<Scalar, R, T0, T1> {
            f.run(Scalar::new(), x0, x1)
        }

        /// The level [`dispatch1`] and [`dispatch2`] run at.
        pub fn dispatched_level() -> Level {
            Level::scalar()
        }
    }
}

mod sealed {
    pub trait Sealed: std::fmt::Debug + Copy + PartialEq + Send + Sync + 'static {}
}

pub(crate) use sealed::Sealed;

/// A token proving that a family of instructions may be executed.
///
/// Only this crate implements it. Tokens for optional instruction sets come from a
/// checked constructor or from dispatch.
#[allow(non_camel_case_types)]
pub trait Architecture: sealed::Sealed {
    /// Eight single-precision lanes.
    type f32x8: SIMDVector<Arch = Self, Scalar = f32, Array = [f32; 8]>
        + std::ops::Add<Output = Self::f32x8>
        + SIMDSumTree;

    /// The capability of this architecture, available without an instance.
    ///
    /// ```
    /// use layout_wide::{Architecture, arch};
    ///
    /// assert_eq!(arch::Scalar::level(), arch::Scalar::level());
    /// #[cfg(target_arch = "x86_64")]
    /// assert!(arch::Scalar::level() < arch::x86_64::V3::level());
    /// ```
    fn level() -> Level;

    /// Invoke `f` with `x0`, compiled for this architecture.
    fn run1<F, T0, R>(self, f: F, x0: T0) -> R
    where
        F: Target1<Self, R, T0>;

    /// Invoke `f` with `x0` and `x1`, compiled for this architecture.
    fn run2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
    where
        F: Target2<Self, R, T0, T1>;
}

/// A kernel taking one argument besides the architecture.
pub trait Target1<A, R, T0>
where
    A: Architecture,
{
    fn run(self, arch: A, x0: T0) -> R;
}

/// A kernel taking two arguments besides the architecture.
pub trait Target2<A, R, T0, T1>
where
    A: Architecture,
{
    fn run(self, arch: A, x0: T0, x1: T1) -> R;
}

/// Closures ignore the token. They only pick up the target features if inlined.
impl<A, R, T0, F> Target1<A, R, T0> for F
where
    A: Architecture,
    F: FnOnce(T0) -> R,
{
    #[inline]
    fn run(self, _: A, x0: T0) -> R {
        (self)(x0)
    }
}

impl<A, R, T0, T1, F> Target2<A, R, T0, T1> for F
where
    A: Architecture,
    F: FnOnce(T0, T1) -> R,
{
    #[inline]
    fn run(self, _: A, x0: T0, x1: T1) -> R {
        (self)(x0, x1)
    }
}

// Private field of every token, so tokens cannot be built outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct Hidden;

const _: () = assert!(std::mem::size_of::<Hidden>() == 0);

///////////
// Tests //
///////////
