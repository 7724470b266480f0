/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Command line front end for [`layout_core::bench`]: job parsing, report formatting and
//! result files.

pub mod app;
pub mod jobs;
pub mod output;
pub mod report;
pub mod result;
pub mod utils;

pub use app::App;
pub use output::Output;
