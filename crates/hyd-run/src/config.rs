//! Engine configuration file (`~/.hyd/config.toml`).
//!
//! Holds the engine binary locations and output defaults. Everything is
//! optional: with no config file present, engines are discovered through
//! `~/.hyd/engines/` and `PATH`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const CONFIG_TEMPLATE: &str = "\
# hyd engine configuration
#
# epanet_path = \"/usr/local/bin/runepanet\"
# swmm_path = \"/usr/local/bin/runswmm\"
# report_dir = \"/tmp/hyd-reports\"
";

/// Engine locations and output defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Explicit path to the EPANET CLI binary.
    pub epanet_path: Option<PathBuf>,
    /// Explicit path to the SWMM CLI binary.
    pub swmm_path: Option<PathBuf>,
    /// Directory for generated report files (defaults to the model's dir).
    pub report_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Default config file location (`~/.hyd/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".hyd").join("config.toml"))
    }

    /// Load from the default location; absent file yields the defaults.
    pub fn load() -> Result<Self, EngineError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| EngineError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Write a commented template config, creating parent directories.
    pub fn write_template(path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::Config(format!("creating {}: {e}", parent.display())))?;
        }
        std::fs::write(path, CONFIG_TEMPLATE)
            .map_err(|e| EngineError::Config(format!("writing {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "epanet_path = \"/opt/epanet/runepanet\"\n").unwrap();
        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(
            config.epanet_path.as_deref(),
            Some(Path::new("/opt/epanet/runepanet"))
        );
        assert!(config.swmm_path.is_none());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "epanet_path = [not toml").unwrap();
        assert!(matches!(
            EngineConfig::load_from(&path),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_template_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        EngineConfig::write_template(&path).unwrap();
        let config = EngineConfig::load_from(&path).unwrap();
        assert!(config.epanet_path.is_none());
        assert!(config.report_dir.is_none());
    }
}
