/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Job files and command line overrides.

use std::{num::NonZeroUsize, path::Path};

use anyhow::Context;
use layout_core::{
    bench::{ArchChoice, RunConfig},
    dataset::Field,
};

/// Load a [`RunConfig`] from the JSON job file at `path`.
///
/// Every key is optional. Missing keys take their default values and unknown keys are
/// rejected.
pub fn load(path: &Path) -> anyhow::Result<RunConfig> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("while opening job file {}", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let config: RunConfig = serde_json::from_reader(reader)
        .with_context(|| format!("while parsing job file {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded job file");
    Ok(config)
}

/// The example job printed by the `skeleton` command.
pub fn skeleton() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&RunConfig::default())?)
}

/// Values given on the command line, each replacing the corresponding job file entry.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Overrides {
    pub element_count: Option<NonZeroUsize>,
    pub iteration_count: Option<NonZeroUsize>,
    pub field: Option<Field>,
    pub arch: Option<ArchChoice>,
    pub tolerance: Option<f64>,
}

impl Overrides {
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        let Self {
            element_count,
            iteration_count,
            field,
            arch,
            tolerance,
        } = *self;

        if let Some(v) = element_count {
            config.element_count = v;
        }
        if let Some(v) = iteration_count {
            config.iteration_count = v;
        }
        if let Some(v) = field {
            config.field = v;
        }
        if let Some(v) = arch {
            config.arch = v;
        }
        if let Some(v) = tolerance {
            config.tolerance = v;
        }
        config
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use rstest::rstest;

    fn write_job(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("job.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_partial_job() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_job(dir.path(), r#"{"element_count": 64, "field": "z"}"#);
        let config = load(&path).unwrap();
        assert_eq!(config.element_count.get(), 64);
        assert_eq!(config.field, Field::Z);
        assert_eq!(config.iteration_count, RunConfig::default().iteration_count);
    }

    #[rstest]
    #[case::zero_elements(r#"{"element_count": 0}"#)]
    #[case::zero_iterations(r#"{"iteration_count": 0}"#)]
    #[case::unknown_key(r#"{"elements": 64}"#)]
    #[case::unknown_field(r#"{"field": "q"}"#)]
    #[case::unknown_arch(r#"{"arch": "avx512"}"#)]
    #[case::not_json("not json")]
    fn load_rejects_bad_jobs(#[case] contents: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_job(dir.path(), contents);
        let err = load(&path).unwrap_err();
        assert!(
            format!("{:#}", err).contains("while parsing job file"),
            "{contents}: {err:#}"
        );
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("while opening job file"));
    }

    #[test]
    fn skeleton_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_job(dir.path(), &skeleton().unwrap());
        assert_eq!(load(&path).unwrap(), RunConfig::default());
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let base = RunConfig {
            field: Field::Y,
            ..RunConfig::default()
        };

        assert_eq!(Overrides::default().apply(base), base);

        let overrides = Overrides {
            element_count: NonZeroUsize::new(17),
            tolerance: Some(0.5),
            ..Overrides::default()
        };
        let config = overrides.apply(base);
        assert_eq!(config.element_count.get(), 17);
        assert_eq!(config.tolerance, 0.5);
        assert_eq!(config.field, Field::Y);
        assert_eq!(config.arch, base.arch);
    }
}
