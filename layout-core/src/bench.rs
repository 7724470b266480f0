/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::num::NonZeroUsize;

use layout_wide::{Architecture, arch::Scalar};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    alloc::AllocatorCore,
    bandwidth::{Speedups, bandwidth_gbps, bytes_processed},
    dataset::{Aos, Dataset, DatasetError, Field, LayoutKind, Soa},
    kernels::{Method, Variant, scalar, simd},
    timing::{Clock, Measurement, measure},
};

/// Sixteen mebi-elements: 1.25 GiB of AOS records and 64 MiB per SOA array.
pub const DEFAULT_ELEMENT_COUNT: NonZeroUsize = match NonZeroUsize::new(16 * 1024 * 1024) {
    Some(n) => n,
    None => panic!("element count must be non-zero"),
};

pub const DEFAULT_ITERATION_COUNT: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// The default relative tolerance for checking results against the closed form.
///
/// Measured at the default 2^24 elements, the sequential `f32` sum is off by 4.17% and the
/// eight lane sum by 0.028%, so `1e-3` would reject a correct scalar kernel.
pub const DEFAULT_TOLERANCE: f64 = 5e-2;

/// Which SIMD architecture the vector kernels should use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchChoice {
    /// The most capable architecture supported by the running CPU.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "scalar")]
    Scalar,
    #[serde(rename = "x86-64-v3")]
    #[allow(non_camel_case_types)]
    X86_64_V3,
}

impl ArchChoice {
    pub const ALL: [ArchChoice; 3] = [Self::Auto, Self::Scalar, Self::X86_64_V3];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Scalar => "scalar",
            Self::X86_64_V3 => "x86-64-v3",
        }
    }
}

impl std::fmt::Display for ArchChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown architecture \"{0}\", expected one of auto, scalar, x86-64-v3")]
pub struct UnknownArch(String);

impl std::str::FromStr for ArchChoice {
    type Err = UnknownArch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str() == s)
            .ok_or_else(|| UnknownArch(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, Error)]
#[error("architecture {0} is not supported by this CPU")]
pub struct ArchNotSupported(pub ArchChoice);

#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    ArchNotSupported(#[from] ArchNotSupported),
    #[error("could not create the datasets")]
    Dataset(#[from] DatasetError),
    #[error("tolerance must be a finite, non-negative number, got {0}")]
    InvalidTolerance(f64),
}

/// Everything that parameterizes one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub element_count: NonZeroUsize,
    pub iteration_count: NonZeroUsize,
    pub field: Field,
    pub arch: ArchChoice,
    /// The relative tolerance for checking results against the closed form.
    pub tolerance: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            element_count: DEFAULT_ELEMENT_COUNT,
            iteration_count: DEFAULT_ITERATION_COUNT,
            field: Field::default(),
            arch: ArchChoice::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.tolerance.is_finite() && self.tolerance >= 0.0 {
            Ok(())
        } else {
            Err(BenchError::InvalidTolerance(self.tolerance))
        }
    }
}

/// The measurement of one variant and how it compares to the closed form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantResult {
    pub variant: Variant,
    pub measurement: Measurement,
    pub bandwidth_gbps: f64,
    /// The exact sum of the field.
    pub expected: f64,
    /// `|result - expected| / expected`, or `|result|` when the expected sum is zero.
    pub relative_error: f64,
    /// Whether `relative_error` is within the configured tolerance.
    pub verified: bool,
}

impl VariantResult {
    fn new(
        variant: Variant,
        measurement: Measurement,
        bytes: usize,
        expected: f64,
        tolerance: f64,
    ) -> Self {
        let actual = f64::from(measurement.result);
        let relative_error = if expected == 0.0 {
            actual.abs()
        } else {
            ((actual - expected) / expected).abs()
        };

        Self {
            variant,
            measurement,
            bandwidth_gbps: bandwidth_gbps(bytes, measurement.average),
            expected,
            relative_error,
            verified: relative_error <= tolerance,
        }
    }
}

/// The outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub config: RunConfig,
    /// The architecture the SIMD kernels ran on. Never [`ArchChoice::Auto`].
    pub arch: ArchChoice,
    /// Useful bytes read by each reduction.
    pub bytes_processed: usize,
    /// One entry per variant in [`Variant::ALL`] order.
    pub results: [VariantResult; 4],
    pub speedups: Speedups,
}

impl Report {
    /// Return the result for `variant`.
    pub fn get(&self, variant: Variant) -> Option<&VariantResult> {
        self.results.iter().find(|r| r.variant == variant)
    }

    /// Whether every variant matched the closed form within tolerance.
    pub fn all_verified(&self) -> bool {
        self.results.iter().all(|r| r.verified)
    }
}

/////////////
// Backend //
/////////////

#[derive(Debug, Clone, Copy)]
enum Backend {
    Scalar(Scalar),
    #[cfg(target_arch = "x86_64")]
    V3(layout_wide::arch::x86_64::V3),
}

impl Backend {
    fn resolve(choice: ArchChoice) -> Result<Self, ArchNotSupported> {
        match choice {
            ArchChoice::Scalar => Ok(Self::Scalar(Scalar::new())),
            ArchChoice::Auto => Ok(Self::v3().unwrap_or(Self::Scalar(Scalar::new()))),
            ArchChoice::X86_64_V3 => Self::v3().ok_or(ArchNotSupported(choice)),
        }
    }

    #[cfg(target_arch = "x86_64")]
    fn v3() -> Option<Self> {
        layout_wide::arch::x86_64::V3::new_checked().map(Self::V3)
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn v3() -> Option<Self> {
        None
    }

    fn choice(self) -> ArchChoice {
        match self {
            Self::Scalar(_) => ArchChoice::Scalar,
            #[cfg(target_arch = "x86_64")]
            Self::V3(_) => ArchChoice::X86_64_V3,
        }
    }

    fn level(self) -> layout_wide::Level {
        match self {
            Self::Scalar(_) => Scalar::level(),
            #[cfg(target_arch = "x86_64")]
            Self::V3(_) => layout_wide::arch::x86_64::V3::level(),
        }
    }

    #[inline]
    fn sum_aos<A>(self, aos: &Aos<A>, field: Field) -> f32
    where
        A: AllocatorCore,
    {
        match self {
            Self::Scalar(arch) => simd::sum_aos(arch, aos, field),
            #[cfg(target_arch = "x86_64")]
            Self::V3(arch) => simd::sum_aos(arch, aos, field),
        }
    }

    #[inline]
    fn sum_soa<A>(self, soa: &Soa<A>, field: Field) -> f32
    where
        A: AllocatorCore,
    {
        match self {
            Self::Scalar(arch) => simd::sum_soa(arch, soa, field),
            #[cfg(target_arch = "x86_64")]
            Self::V3(arch) => simd::sum_soa(arch, soa, field),
        }
    }
}

////////////////
// Public API //
////////////////

/// Run the four layout and method combinations described by `config`.
///
/// The architecture is resolved first, then both datasets are allocated from `allocator`
/// and initialized. Nothing is measured if either step fails. Variants are measured in
/// [`Variant::ALL`] order, each timed with `clock`.
pub fn run<A, C>(config: &RunConfig, allocator: A, clock: &C) -> Result<Report, BenchError>
where
    A: AllocatorCore + Clone,
    C: Clock + ?Sized,
{
    config.validate()?;
    let backend = Backend::resolve(config.arch)?;

    let n = config.element_count;
    let field = config.field;
    tracing::info!(
        elements = n.get(),
        iterations = config.iteration_count.get(),
        %field,
        arch = %backend.level(),
        "starting layout benchmark"
    );

    let mut aos = Aos::new(n, allocator.clone())?;
    let mut soa = Soa::new(n, allocator)?;
    initialize(&mut aos);
    initialize(&mut soa);

    let bytes = bytes_processed(n.get());
    let expected = field.expected_sum(n.get());
    let iterations = config.iteration_count;

    let results = Variant::ALL.map(|variant| {
        tracing::info!(%variant, "measuring");
        let measurement = match (variant.layout, variant.method) {
            (LayoutKind::Aos, Method::Scalar) => {
                measure(clock, iterations, || scalar::sum_aos(&aos, field))
            }
            (LayoutKind::Aos, Method::Simd) => {
                measure(clock, iterations, || backend.sum_aos(&aos, field))
            }
            (LayoutKind::Soa, Method::Scalar) => {
                measure(clock, iterations, || scalar::sum_soa(&soa, field))
            }
            (LayoutKind::Soa, Method::Simd) => {
                measure(clock, iterations, || backend.sum_soa(&soa, field))
            }
        };

        let result = VariantResult::new(variant, measurement, bytes, expected, config.tolerance);
        tracing::debug!(
            %variant,
            total = %measurement.total,
            average_ns = measurement.average,
            gbps = result.bandwidth_gbps,
            result = measurement.result,
            "measured"
        );
        if !result.verified {
            tracing::warn!(
                %variant,
                result = measurement.result,
                expected,
                relative_error = result.relative_error,
                tolerance = config.tolerance,
                "result is outside the tolerance of the closed form"
            );
        }
        result
    });

    let speedups = Speedups::new(|variant| {
        results
            .iter()
            .find(|r| r.variant == variant)
            .map_or(f64::NAN, |r| r.measurement.average)
    });

    Ok(Report {
        config: *config,
        arch: backend.choice(),
        bytes_processed: bytes,
        results,
        speedups,
    })
}

fn initialize<D>(dataset: &mut D)
where
    D: Dataset,
{
    tracing::info!(
        layout = %dataset.kind(),
        elements = dataset.len().get(),
        bytes = dataset.footprint(),
        "initializing dataset"
    );
    dataset.initialize();
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        alloc::GlobalAllocator,
        test_util::TrackingAllocator,
        timing::{MonotonicClock, NanoSeconds},
    };

    struct Stepping(Cell<u64>);

    impl Clock for Stepping {
        fn now(&self) -> NanoSeconds {
            let now = self.0.get();
            self.0.set(now + 8);
            NanoSeconds::new(now)
        }
    }

    fn config(n: usize, arch: ArchChoice) -> RunConfig {
        RunConfig {
            element_count: NonZeroUsize::new(n).unwrap(),
            iteration_count: NonZeroUsize::new(3).unwrap(),
            field: Field::X,
            arch,
            tolerance: 1e-3,
        }
    }

    #[test]
    fn defaults() {
        let config = RunConfig::default();
        assert_eq!(config.element_count.get(), 16_777_216);
        assert_eq!(config.iteration_count.get(), 10);
        assert_eq!(config.field, Field::X);
        assert_eq!(config.arch, ArchChoice::Auto);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);

        // The sequential sum at the default size is 4.17% off the closed form.
        assert!(config.validate().is_ok());
        assert!(config.tolerance > 0.0417);
    }

    #[test]
    fn sixteen_elements() {
        let clock = Stepping(Cell::new(0));
        let report = run(&config(16, ArchChoice::Scalar), GlobalAllocator, &clock).unwrap();

        assert_eq!(report.arch, ArchChoice::Scalar);
        assert_eq!(report.bytes_processed, 64);
        for (result, variant) in std::iter::zip(report.results.iter(), Variant::ALL) {
            assert_eq!(result.variant, variant);
            assert_eq!(result.measurement.result, 120.0);
            assert_eq!(result.measurement.iterations.get(), 3);
            assert_eq!(result.measurement.average, 8.0);
            assert!((result.bandwidth_gbps - 8.0).abs() < 1e-9);
            assert_eq!(result.expected, 120.0);
            assert_eq!(result.relative_error, 0.0);
            assert!(result.verified);
        }
        assert!(report.all_verified());

        let s = report.speedups;
        assert_eq!(
            [
                s.scalar_soa_over_aos,
                s.simd_soa_over_aos,
                s.aos_simd_over_scalar,
                s.soa_simd_over_scalar
            ],
            [1.0; 4]
        );
    }

    #[test]
    fn single_element() {
        let report = run(
            &config(1, ArchChoice::Auto),
            GlobalAllocator,
            &MonotonicClock::new(),
        )
        .unwrap();
        assert_ne!(report.arch, ArchChoice::Auto);
        for result in report.results.iter() {
            assert_eq!(result.measurement.result, 0.0);
            assert!(result.verified);
        }
    }

    #[test]
    fn seventeen_elements_use_the_tail() {
        let report = run(
            &config(17, ArchChoice::Auto),
            GlobalAllocator,
            &MonotonicClock::new(),
        )
        .unwrap();
        let simd = report.get(Variant::AOS_SIMD).unwrap();
        assert_eq!(simd.measurement.result, 136.0);
        assert!(report.all_verified());
    }

    #[test]
    fn unsupported_arch() {
        let r = run(
            &config(16, ArchChoice::X86_64_V3),
            GlobalAllocator,
            &MonotonicClock::new(),
        );

        #[cfg(target_arch = "x86_64")]
        let supported = layout_wide::arch::x86_64::V3::new_checked().is_some();
        #[cfg(not(target_arch = "x86_64"))]
        let supported = false;

        if supported {
            assert_eq!(r.unwrap().arch, ArchChoice::X86_64_V3);
        } else {
            let err = r.unwrap_err();
            assert!(matches!(err, BenchError::ArchNotSupported(_)));
            assert_eq!(
                err.to_string(),
                "architecture x86-64-v3 is not supported by this CPU"
            );
        }
    }

    // The arrays acquired before the failing one are released and nothing is measured.
    #[test]
    fn allocation_failure() {
        let allocator = TrackingAllocator::failing_on(2);
        let clock = Stepping(Cell::new(0));
        let err = run(&config(32, ArchChoice::Scalar), &allocator, &clock).unwrap_err();

        match err {
            BenchError::Dataset(DatasetError::Allocation { layout, buffer, .. }) => {
                assert_eq!(layout, LayoutKind::Soa);
                assert_eq!(buffer, "y");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(allocator.live(), 0);
        assert_eq!(clock.0.get(), 0);
    }

    #[test]
    fn invalid_tolerance() {
        for tolerance in [-1.0, f64::NAN, f64::INFINITY] {
            let mut config = config(8, ArchChoice::Scalar);
            config.tolerance = tolerance;
            let err = run(&config, GlobalAllocator, &MonotonicClock::new()).unwrap_err();
            assert!(matches!(err, BenchError::InvalidTolerance(_)));
        }
    }

    #[test]
    fn outside_tolerance_is_flagged() {
        let mut config = config(1 << 20, ArchChoice::Scalar);
        config.tolerance = 0.0;
        config.iteration_count = NonZeroUsize::MIN;

        let report = run(&config, GlobalAllocator, &MonotonicClock::new()).unwrap();
        let scalar = report.get(Variant::SOA_SCALAR).unwrap();
        assert!(scalar.relative_error > 0.0);
        assert!(!scalar.verified);
        assert!(!report.all_verified());
    }

    #[test]
    fn config_serde() {
        let config: RunConfig = serde_json::from_str(r#"{"element_count": 100}"#).unwrap();
        assert_eq!(config.element_count.get(), 100);
        assert_eq!(config.iteration_count, DEFAULT_ITERATION_COUNT);

        let config: RunConfig =
            serde_json::from_str(r#"{"field": "w", "arch": "x86-64-v3", "tolerance": 0.5}"#)
                .unwrap();
        assert_eq!(config.field, Field::W);
        assert_eq!(config.arch, ArchChoice::X86_64_V3);
        assert_eq!(config.tolerance, 0.5);

        assert!(serde_json::from_str::<RunConfig>(r#"{"element_count": 0}"#).is_err());
        assert!(serde_json::from_str::<RunConfig>(r#"{"iteration_count": 0}"#).is_err());
        assert!(serde_json::from_str::<RunConfig>(r#"{"elements": 10}"#).is_err());
        assert!(serde_json::from_str::<RunConfig>(r#"{"arch": "avx512"}"#).is_err());
    }

    #[test]
    fn arch_names() {
        for arch in ArchChoice::ALL {
            assert_eq!(arch.to_string().parse::<ArchChoice>().unwrap(), arch);
        }
        assert!("v4".parse::<ArchChoice>().is_err());
    }
}
