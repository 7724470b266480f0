/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alloc::AllocatorError;

mod aos;
mod particle;
mod soa;

pub use aos::Aos;
pub use particle::Particle;
pub use soa::Soa;

/// One of the four summable particle fields.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[default]
    X,
    Y,
    Z,
    W,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::X, Field::Y, Field::Z, Field::W];

    /// The factor applied to the record index when initializing this field.
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::X => 1,
            Self::Y => 2,
            Self::Z => 3,
            Self::W => 4,
        }
    }

    /// The value this field holds in record `index` after initialization.
    ///
    /// The product is formed in `f64` so the stored value is the single-rounded `f32` of
    /// `multiplier · index`.
    #[inline]
    pub fn initial_value(self, index: usize) -> f32 {
        (index as f64 * f64::from(self.multiplier())) as f32
    }

    /// The exact sum of this field over `n` freshly initialized records:
    /// `multiplier · n(n−1)/2`.
    pub fn expected_sum(self, n: usize) -> f64 {
        let n = n as f64;
        f64::from(self.multiplier()) * n * (n - 1.0) / 2.0
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::W => "w",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown field \"{0}\", expected one of x, y, z, w")]
pub struct UnknownField(String);

impl std::str::FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownField(s.to_owned()))
    }
}

/// The arrangement of a dataset in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Array of structures: one [`Particle`] record per element.
    Aos,
    /// Structure of arrays: one contiguous `f32` array per field.
    Soa,
}

impl LayoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aos => "aos",
            Self::Soa => "soa",
        }
    }
}

impl std::fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
pub enum DatasetError {
    #[error("failed to allocate {bytes} bytes for the {buffer} buffer of the {layout} dataset")]
    Allocation {
        layout: LayoutKind,
        buffer: &'static str,
        bytes: usize,
        #[source]
        source: AllocatorError,
    },
}

/// Behavior shared by both memory layouts.
pub trait Dataset {
    /// The memory layout of this dataset.
    fn kind(&self) -> LayoutKind;

    /// The number of elements.
    fn len(&self) -> NonZeroUsize;

    /// The number of bytes held by the dataset's buffers, including padding.
    fn footprint(&self) -> usize;

    /// Set element `i` to `x = i, y = 2i, z = 3i, w = 4i`. Inert record fields and padding
    /// are zeroed.
    fn initialize(&mut self);
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Field::X, 16, 120.0)]
    #[case(Field::Y, 16, 240.0)]
    #[case(Field::Z, 17, 408.0)]
    #[case(Field::W, 1, 0.0)]
    #[case(Field::X, 1 << 24, 140_737_479_966_720.0)]
    fn expected_sum(#[case] field: Field, #[case] n: usize, #[case] expected: f64) {
        assert_eq!(field.expected_sum(n), expected);
    }

    #[test]
    fn initial_values() {
        assert_eq!(Field::X.initial_value(7), 7.0);
        assert_eq!(Field::Y.initial_value(7), 14.0);
        assert_eq!(Field::Z.initial_value(7), 21.0);
        assert_eq!(Field::W.initial_value(7), 28.0);
    }

    #[test]
    fn field_names() {
        for field in Field::ALL {
            assert_eq!(field.to_string().parse::<Field>().unwrap(), field);
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{field}\""));
        }
        assert_eq!("Z".parse::<Field>().unwrap(), Field::Z);

        let err = "v".parse::<Field>().unwrap_err();
        assert_eq!(err.to_string(), "unknown field \"v\", expected one of x, y, z, w");
    }

    #[test]
    fn allocation_error_message() {
        let err = DatasetError::Allocation {
            layout: LayoutKind::Soa,
            buffer: "z",
            bytes: 64,
            source: AllocatorError,
        };
        assert_eq!(
            err.to_string(),
            "failed to allocate 64 bytes for the z buffer of the soa dataset"
        );
    }
}
