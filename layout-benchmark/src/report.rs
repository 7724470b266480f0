/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::fmt::{Display, Formatter};

use layout_core::bench::Report;

use crate::utils::fmt::{Banner, Table};

/// Human readable rendering of a [`Report`].
pub struct Summary<'a>(&'a Report);

impl<'a> Summary<'a> {
    pub fn new(report: &'a Report) -> Self {
        Self(report)
    }
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let report = self.0;
        let config = &report.config;

        write!(f, "{}", Banner::new("Field Sum: AOS vs SOA"))?;
        writeln!(
            f,
            "elements: {}, iterations: {}, field: {}, arch: {}",
            config.element_count, config.iteration_count, config.field, report.arch,
        )?;
        writeln!(
            f,
            "bytes per reduction: {}, tolerance: {:e}",
            report.bytes_processed, config.tolerance,
        )?;
        writeln!(f)?;

        let header = [
            "Variant",
            "Time (ms)",
            "Bandwidth (GB/s)",
            "Result",
            "Expected",
            "Rel. Error",
            "Verified",
        ];
        let mut table = Table::new(header);
        for r in report.results.iter() {
            table.push_row([
                r.variant.to_string(),
                format!("{:.3}", r.measurement.average_millis()),
                format!("{:.2}", r.bandwidth_gbps),
                format!("{:.6e}", r.measurement.result),
                format!("{:.6e}", r.expected),
                format!("{:.2e}", r.relative_error),
                String::from(if r.verified { "yes" } else { "NO" }),
            ]);
        }
        writeln!(f, "{}", table)?;

        let s = &report.speedups;
        writeln!(f, "Speedups:")?;
        writeln!(f, "  SOA over AOS (scalar): {:.2}x", s.scalar_soa_over_aos)?;
        writeln!(f, "  SOA over AOS (simd):   {:.2}x", s.simd_soa_over_aos)?;
        writeln!(f, "  SIMD over scalar (AOS): {:.2}x", s.aos_simd_over_scalar)?;
        writeln!(f, "  SIMD over scalar (SOA): {:.2}x", s.soa_simd_over_scalar)?;
        Ok(())
    }
}

///////////
// Tests //
///////////
