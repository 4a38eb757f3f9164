//! `schedboard.toml` configuration
//!
//! ```toml
//! [loader]
//! date_format = "%d/%m/%y"
//! percent_scale = "auto"
//!
//! [loader.columns]
//! name = "Nome"
//! start = "Início"
//!
//! [views]
//! long_duration_threshold = 20
//! upcoming_windows = [7, 15, 30]
//!
//! [report]
//! title = "Obra Norte"
//! ```
//!
//! Every section is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use schedboard_core::RenderError;
use schedboard_parser::LoaderConfig;
use schedboard_render::check_date_format;
use schedboard_solver::ViewOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "schedboard.toml";

/// Report presentation options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub title: String,
    /// Date format for Excel cells
    pub excel_date_format: String,
    /// Date format for PDF lines
    pub pdf_date_format: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Project Dashboard".into(),
            excel_date_format: "%Y-%m-%d".into(),
            pdf_date_format: "%d/%m/%Y".into(),
        }
    }
}

impl ReportOptions {
    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        for (key, format) in [
            ("excel_date_format", &self.excel_date_format),
            ("pdf_date_format", &self.pdf_date_format),
        ] {
            check_date_format(format).map_err(|source| ConfigError::DateFormat {
                path: path.to_path_buf(),
                key,
                source,
            })?;
        }
        Ok(())
    }
}

/// Whole configuration file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub views: ViewOptions,
    pub report: ReportOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {}: [report] {key}: {source}", .path.display())]
    DateFormat {
        path: PathBuf,
        key: &'static str,
        #[source]
        source: RenderError,
    },
}

impl Config {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.report.validate(path)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load the explicit file, else `schedboard.toml` if present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schedboard_core::PercentScale;

    #[test]
    fn empty_file_is_default() {
        let config = Config::from_toml_str("", Path::new("x.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [loader]
            percent_scale = "percent"

            [loader.columns]
            name = "Nome"

            [views]
            upcoming_windows = [30]

            [report]
            title = "Obra Norte"
        "#;
        let config = Config::from_toml_str(text, Path::new("x.toml")).unwrap();

        assert_eq!(config.loader.percent_scale, PercentScale::Percent);
        assert_eq!(config.loader.columns.name, "Nome");
        assert_eq!(config.loader.columns.start, "Start");
        assert_eq!(config.views.upcoming_windows, vec![30]);
        assert_eq!(config.views.long_duration_threshold, 15);
        assert_eq!(config.report.title, "Obra Norte");
        assert_eq!(config.report.pdf_date_format, "%d/%m/%Y");
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = Config::from_toml_str("[views]\nupcoming_windows = \"x\"", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn bad_report_date_format_is_rejected() {
        let err = Config::from_toml_str("[report]\npdf_date_format = \"%Q\"", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DateFormat {
                key: "pdf_date_format",
                ..
            }
        ));
        assert!(err.to_string().contains("[report] pdf_date_format"));
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let err = Config::discover(Some(Path::new("/nonexistent/schedboard.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
