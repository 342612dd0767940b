//! Console-wide options and JSON file helpers.

use crate::{CaptureOptions, VerifierOptions};
use anyhow::{Context, Result};
use roiscope_core::ArrowOptions;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs, path::Path};

/// All tunables of the console, as one JSON document.
///
/// Every section is optional in the file; missing fields keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleOptions {
    pub capture: CaptureOptions,
    pub arrows: ArrowOptions,
    pub verifier: VerifierOptions,
}

impl ConsoleOptions {
    pub fn validate(&self) -> roiscope_core::Result<()> {
        self.capture.validate()?;
        self.arrows.validate()?;
        self.verifier.validate()?;
        Ok(())
    }

    /// Load and validate options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let options: Self = load_json(path)?;
        options
            .validate()
            .with_context(|| format!("invalid options in {}", path.display()))?;
        Ok(options)
    }
}

/// Read and parse a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("cannot parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_tmp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_tmp(
            r#"{"capture":{"closure_radius_px":25.0},"verifier":{"max_lines":5}}"#,
        );
        let opts = ConsoleOptions::from_json_file(file.path()).unwrap();
        assert_eq!(opts.capture.closure_radius_px, 25.0);
        assert_eq!(opts.capture.min_point_distance_px, 10.0);
        assert_eq!(opts.verifier.max_lines, 5);
        assert_eq!(opts.arrows, ArrowOptions::default());
    }

    #[test]
    fn invalid_values_are_reported() {
        let file = write_tmp(r#"{"arrows":{"min_length_px":-1.0}}"#);
        let err = ConsoleOptions::from_json_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("min_length_px"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let missing = Path::new("/nonexistent/options.json");
        let err = load_json::<ConsoleOptions>(missing).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/options.json"));
    }
}
