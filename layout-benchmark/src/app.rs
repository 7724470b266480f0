/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{io::Write, num::NonZeroUsize, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use layout_core::{
    alloc::GlobalAllocator,
    bench::{self, ArchChoice, RunConfig},
    dataset::Field,
    timing::MonotonicClock,
};

use crate::{
    jobs::{self, Overrides},
    output::Output,
    report::Summary,
    result::atomic_save,
};

/// Parsed command line options.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provide a skeleton JSON job file with every setting at its default.
    Skeleton,
    /// Measure the four layout and method combinations.
    Run {
        /// A JSON job file. Flags given on the command line take precedence over it.
        #[arg(long = "input-file")]
        input_file: Option<PathBuf>,

        /// The number of elements in each dataset.
        #[arg(long)]
        elements: Option<NonZeroUsize>,

        /// The number of timed passes per variant.
        #[arg(long)]
        iterations: Option<NonZeroUsize>,

        /// The field to reduce: x, y, z or w.
        #[arg(long)]
        field: Option<Field>,

        /// The architecture for the SIMD kernels: auto, scalar or x86-64-v3.
        #[arg(long)]
        arch: Option<ArchChoice>,

        /// The relative tolerance for checking each sum against its closed form.
        #[arg(long)]
        tolerance: Option<f64>,

        /// Where to write the JSON report.
        #[arg(long = "output-file")]
        output_file: Option<PathBuf>,
    },
}

/// The CLI used to drive the layout benchmark.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct App {
    #[command(subcommand)]
    command: Commands,
}

impl App {
    /// Construct [`Self`] by parsing commandline arguments from [`std::env::args]`.
    ///
    /// This simply redirects to [`clap::Parser::parse`] and is provided to allow parsing
    /// without the [`clap::Parser`] trait in scope.
    pub fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Construct [`Self`] by parsing command line arguments from the iterator.
    pub fn try_parse_from<I, T>(itr: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(<Self as clap::Parser>::try_parse_from(itr)?)
    }

    /// Construct [`Self`] directly from a [`Commands`] enum.
    pub fn from_commands(command: Commands) -> Self {
        Self { command }
    }

    /// Run the application, printing human readable results to `output`.
    pub fn run(&self, mut output: &mut dyn Output) -> anyhow::Result<()> {
        match &self.command {
            Commands::Skeleton => {
                writeln!(output, "Skeleton input file:")?;
                writeln!(output, "{}", jobs::skeleton()?)?;
            }
            Commands::Run {
                input_file,
                elements,
                iterations,
                field,
                arch,
                tolerance,
                output_file,
            } => {
                let base = match input_file {
                    Some(path) => jobs::load(path)?,
                    None => RunConfig::default(),
                };
                let overrides = Overrides {
                    element_count: *elements,
                    iteration_count: *iterations,
                    field: *field,
                    arch: *arch,
                    tolerance: *tolerance,
                };
                let config = overrides.apply(base);

                let report = bench::run(&config, GlobalAllocator, &MonotonicClock::new())
                    .context("benchmark run failed")?;

                write!(output, "{}", Summary::new(&report))?;
                if !report.all_verified() {
                    writeln!(
                        output,
                        "\nWarning: at least one sum is outside the tolerance of the closed form."
                    )?;
                }

                if let Some(path) = output_file {
                    atomic_save(path, &report)
                        .with_context(|| format!("while saving results to {}", path.display()))?;
                    writeln!(output, "\nResults written to {}", path.display())?;
                }
            }
        };
        Ok(())
    }
}

///////////
// Tests //
///////////
