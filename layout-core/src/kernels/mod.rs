/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::dataset::LayoutKind;

pub mod gather;
pub mod scalar;
pub mod simd;

/// How a reduction walks its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// One element per step into a single `f32` accumulator.
    Scalar,
    /// [`simd::LANES`] elements per step into a vector accumulator.
    Simd,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Simd => "simd",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four measured combinations of layout and method.
///
/// Serializes as its name, for example `"aos-scalar"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Variant {
    pub layout: LayoutKind,
    pub method: Method,
}

impl Variant {
    pub const AOS_SCALAR: Self = Self::new(LayoutKind::Aos, Method::Scalar);
    pub const AOS_SIMD: Self = Self::new(LayoutKind::Aos, Method::Simd);
    pub const SOA_SCALAR: Self = Self::new(LayoutKind::Soa, Method::Scalar);
    pub const SOA_SIMD: Self = Self::new(LayoutKind::Soa, Method::Simd);

    /// Every variant in measurement order.
    pub const ALL: [Self; 4] = [
        Self::AOS_SCALAR,
        Self::AOS_SIMD,
        Self::SOA_SCALAR,
        Self::SOA_SIMD,
    ];

    pub const fn new(layout: LayoutKind, method: Method) -> Self {
        Self { layout, method }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.layout, self.method)
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown variant \"{0}\"")]
pub struct UnknownVariant(String);

impl std::str::FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.to_string() == s)
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

impl From<Variant> for String {
    fn from(variant: Variant) -> Self {
        variant.to_string()
    }
}

impl TryFrom<String> for Variant {
    type Error = UnknownVariant;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

///////////
// Tests //
///////////
