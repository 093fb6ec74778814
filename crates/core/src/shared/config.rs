use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classification::domain::tensor_adapter::RowOrder;
use crate::coloring::domain::kmeans::KMeansParams;
use crate::detection::domain::face_region_extractor::CropPolicy;
use crate::shared::color::ColorSpace;
use crate::shared::constants::{DEFAULT_CLUSTERS, DEFAULT_DETECT_EVERY};
use crate::shared::error::CoreError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Tunables for one analysis run, persisted as JSON.
///
/// Missing fields take their defaults, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub clusters: usize,
    pub color_space: ColorSpace,
    pub crop_policy: CropPolicy,
    pub face_index: usize,
    pub detect_every: usize,
    pub tensor_row_order: RowOrder,
    pub kmeans: KMeansParams,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            color_space: ColorSpace::default(),
            crop_policy: CropPolicy::default(),
            face_index: 0,
            detect_every: DEFAULT_DETECT_EVERY,
            tensor_row_order: RowOrder::default(),
            kmeans: KMeansParams::default(),
        }
    }
}

impl AnalysisConfig {
    /// `<config dir>/CatPattern/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("CatPattern").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Loads from [`default_path`](Self::default_path), falling back to
    /// defaults when the file is absent or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, json).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.clusters == 0 {
            return Err(CoreError::invalid("clusters must be at least 1"));
        }
        if self.detect_every == 0 {
            return Err(CoreError::invalid("detect_every must be at least 1"));
        }
        self.kmeans.validate()
    }
}
