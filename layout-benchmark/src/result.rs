/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{io::Write, path::Path};

use serde::Serialize;

/// Serialize `object` as pretty JSON to a temporary file next to `path`, then move it over
/// `path`, so an interrupted run never leaves a truncated results file behind.
///
/// Fails without touching `path` when `<path>.temp` already exists, which usually means
/// another run is writing the same file.
pub fn atomic_save<T>(path: &Path, object: &T) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    let temp = format!("{}.temp", path.display());
    if Path::new(&temp).exists() {
        anyhow::bail!("temporary file {} already exists", temp);
    }

    let mut writer = std::io::BufWriter::new(std::fs::File::create(&temp)?);
    serde_json::to_writer_pretty(&mut writer, object)?;
    writer.flush()?;
    std::fs::rename(&temp, path)?;
    tracing::debug!(path = %path.display(), "saved results");
    Ok(())
}

///////////
// Tests //
///////////
