/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::sync::atomic::{AtomicU8, Ordering};

use super::{Level, Scalar, Target1, Target2};

pub mod v3;

pub use v3::V3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) enum LevelInner {
    Scalar,
    V3,
}

impl LevelInner {
    pub(super) const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::V3 => "x86-64-v3",
        }
    }
}

///////////////
// Detection //
///////////////

const UNKNOWN: u8 = 0;
const SCALAR: u8 = 1;
const V3_LEVEL: u8 = 2;

// Written once by `detect`. `V3_LEVEL` is only ever stored after `probe` confirmed every
// V3 feature, which is what makes the unchecked `V3::new` calls below sound.
static DETECTED: AtomicU8 = AtomicU8::new(UNKNOWN);

fn v3_supported() -> bool {
    is_x86_feature_detected!("avx")
        && is_x86_feature_detected!("avx2")
        && is_x86_feature_detected!("bmi1")
        && is_x86_feature_detected!("bmi2")
        && is_x86_feature_detected!("f16c")
        && is_x86_feature_detected!("fma")
        && is_x86_feature_detected!("lzcnt")
        && is_x86_feature_detected!("movbe")
        && is_x86_feature_detected!("xsave")
}

/// Query the CPU without touching the cache.
fn probe() -> u8 {
    if v3_supported() {
        V3_LEVEL
    } else {
        SCALAR
    }
}

#[cold]
#[inline(never)]
fn detect() -> u8 {
    let level = probe();
    DETECTED.store(level, Ordering::Relaxed);
    level
}

/// The cached detection result, probing the CPU on first use.
#[inline]
fn detected() -> u8 {
    match DETECTED.load(Ordering::Relaxed) {
        UNKNOWN => detect(),
        level => level,
    }
}

/// The level [`dispatch1`] and [`dispatch2`] run at on this machine.
pub fn dispatched_level() -> Level {
    if detected() == V3_LEVEL {
        Level::v3()
    } else {
        Level::scalar()
    }
}

//////////////
// Dispatch //
//////////////

/// Run `f` with the most capable architecture of the running CPU.
///
/// The V3 instantiation of `f.run` is compiled with the V3 target features.
#[inline]
pub fn dispatch1<F, T0, R>(f: F, x0: T0) -> R
where
    F: Target1<V3, R, T0> + Target1<Scalar, R, T0>,
{
    match DETECTED.load(Ordering::Relaxed) {
        V3_LEVEL => {
            // SAFETY: `DETECTED` holds `V3_LEVEL` only on V3 capable machines.
            let arch = unsafe { V3::new() };
            // SAFETY: Same as above, every feature `run_with_1` enables is present.
            unsafe { arch.run_with_1(f, x0) }
        }
        SCALAR => <F as Target1<Scalar, R, T0>>::run(f, Scalar::new(), x0),
        _ => redispatch1(f, x0),
    }
}

// Kept out of line so the common path stays a load and a branch.
#[inline(never)]
fn redispatch1<F, T0, R>(f: F, x0: T0) -> R
where
    F: Target1<V3, R, T0> + Target1<Scalar, R, T0>,
{
    detect();
    dispatch1(f, x0)
}

/// Two argument form of [`dispatch1`].
#[inline]
pub fn dispatch2<F, T0, T1, R>(f: F, x0: T0, x1: T1) -> R
where
    F: Target2<V3, R, T0, T1> + Target2<Scalar, R, T0, T1>,
{
    match DETECTED.load(Ordering::Relaxed) {
        V3_LEVEL => {
            // SAFETY: `DETECTED` holds `V3_LEVEL` only on V3 capable machines.
            let arch = unsafe { V3::new() };
            // SAFETY: Same as above, every feature `run_with_2` enables is present.
            unsafe { arch.run_with_2(f, x0, x1) }
        }
        SCALAR => <F as Target2<Scalar, R, T0, T1>>::run(f, Scalar::new(), x0, x1),
        _ => redispatch2(f, x0, x1),
    }
}

#[inline(never)]
fn redispatch2<F, T0, T1, R>(f: F, x0: T0, x1: T1) -> R
where
    F: Target2<V3, R, T0, T1> + Target2<Scalar, R, T0, T1>,
{
    detect();
    dispatch2(f, x0, x1)
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Architecture;

    // Reports which architecture it ran on.
    struct Which;

    impl Target1<Scalar, &'static str, u32> for Which {
        fn run(self, _: Scalar, _: u32) -> &'static str {
            "scalar"
        }
    }

    impl Target1<V3, &'static str, u32> for Which {
        fn run(self, _: V3, _: u32) -> &'static str {
            "v3"
        }
    }

    impl Target2<Scalar, String, u32, u32> for Which {
        fn run(self, _: Scalar, x0: u32, x1: u32) -> String {
            format!("scalar {}", x0 + x1)
        }
    }

    impl Target2<V3, String, u32, u32> for Which {
        // Out of line so nothing with V3 features leaks into the caller.
        #[inline(never)]
        fn run(self, _: V3, x0: u32, x1: u32) -> String {
            format!("v3 {}", x0 + x1)
        }
    }

    // The only test allowed to overwrite the cache. `V3_LEVEL` is forced only on machines
    // that have the features, since dispatch then runs `#[target_feature]` code.
    #[test]
    fn forced_levels() {
        DETECTED.store(SCALAR, Ordering::Relaxed);
        assert!(V3::new_checked().is_none());
        assert_eq!(dispatched_level(), Scalar::level());
        assert_eq!(dispatch1(Which, 1), "scalar");
        assert_eq!(dispatch2(Which, 1, 2), "scalar 3");

        if probe() == V3_LEVEL {
            DETECTED.store(V3_LEVEL, Ordering::Relaxed);
            assert!(V3::new_checked().is_some());
            assert_eq!(dispatched_level(), V3::level());
            assert_eq!(dispatch1(Which, 1), "v3");
            assert_eq!(dispatch2(Which, 1, 2), "v3 3");
        }

        // An empty cache is filled from the hardware on the next dispatch.
        DETECTED.store(UNKNOWN, Ordering::Relaxed);
        let expected = if probe() == V3_LEVEL { "v3" } else { "scalar" };
        assert_eq!(dispatch1(Which, 1), expected);
        assert_eq!(DETECTED.load(Ordering::Relaxed), probe());
    }

    #[test]
    fn level_names() {
        assert_eq!(V3::level().to_string(), "x86-64-v3");
        assert_eq!(Scalar::level().to_string(), "scalar");
        assert!(Scalar::level() < V3::level());
    }
}
