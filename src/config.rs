// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! TOML configuration. Every field has a default, so an empty file is valid.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::{standard_icons, OverlayDefaults, DEFAULT_COLOR};
use crate::store::WriteDurability;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TpnetConfig {
    pub save: SaveConfig,
    pub validator: ValidatorConfig,
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveConfig {
    pub dir: PathBuf,
    pub blob_name: String,
    pub durable_writes: bool,
}

impl SaveConfig {
    pub fn durability(&self) -> WriteDurability {
        if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        }
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("saves"),
            blob_name: default_blob_name(),
            durable_writes: false,
        }
    }
}

pub fn default_blob_name() -> String {
    "TPNetData".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Whether a load schedules the world existence check.
    pub enabled: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    pub icons: Vec<String>,
    pub default_color: i32,
}

impl OverlayConfig {
    pub fn defaults(&self) -> OverlayDefaults {
        OverlayDefaults::new(self.icons.clone(), self.default_color)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { icons: standard_icons(), default_color: DEFAULT_COLOR }
    }
}

impl TpnetConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(path, &raw)
    }

    /// Like [`Self::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(path, &raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{ConfigError, TpnetConfig};
    use crate::model::DEFAULT_COLOR;
    use crate::store::WriteDurability;

    #[test]
    fn empty_file_yields_defaults() {
        let config: TpnetConfig = toml::from_str("").unwrap();
        assert_eq!(config, TpnetConfig::default());
        assert_eq!(config.save.dir, PathBuf::from("saves"));
        assert_eq!(config.save.blob_name, "TPNetData");
        assert_eq!(config.save.durability(), WriteDurability::BestEffort);
        assert!(config.validator.enabled);
        assert_eq!(config.overlay.default_color, DEFAULT_COLOR);
        assert_eq!(config.overlay.defaults().first_icon(), "circle");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let raw = r#"
            [save]
            durable_writes = true

            [overlay]
            icons = ["home", "star1"]
        "#;
        let config: TpnetConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.save.durability(), WriteDurability::Durable);
        assert_eq!(config.save.blob_name, "TPNetData");
        assert_eq!(config.overlay.defaults().first_icon(), "home");
        assert_eq!(config.overlay.default_color, DEFAULT_COLOR);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tpnet.toml");
        std::fs::write(&path, "[save]\nfolder = \"x\"\n").unwrap();
        assert!(matches!(TpnetConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_an_error_only_for_load() {
        let path = Path::new("/nonexistent/tpnet.toml");
        assert!(matches!(TpnetConfig::load(path), Err(ConfigError::Io { .. })));
        assert_eq!(TpnetConfig::load_or_default(path).unwrap(), TpnetConfig::default());
    }
}
