use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const APP_TITLE: &str = "Credit Risk Prediction – Home Credit";

/// Suggested file name for the results download.
pub const EXPORT_FILE_NAME: &str = "predicciones_home_credit.csv";

/// Rows shown in the upload and results previews.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Artifact locations
// ---------------------------------------------------------------------------

/// Artifact directory and file names under the application root.
/// `src/bin/generate_artifacts.rs` writes the same names.
pub const ARTIFACT_DIR: &str = "artifacts";
pub const PIPELINE_FILE: &str = "preprocessing_pipeline_v3.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names_v3.json";
pub const CLASSIFIER_FILE: &str = "lgbm_optimized_v1.json";

/// Fixed artifact paths relative to the application root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub pipeline: PathBuf,
    pub feature_names: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    pub fn under(root: &Path) -> Self {
        let dir = root.join(ARTIFACT_DIR);
        ArtifactPaths {
            pipeline: dir.join(PIPELINE_FILE),
            feature_names: dir.join(FEATURE_NAMES_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: PathBuf,
    pub artifacts: ArtifactPaths,
}

impl AppConfig {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let artifacts = ArtifactPaths::under(&root);
        AppConfig { root, artifacts }
    }

    /// The application root is the working directory the host started us in.
    pub fn from_current_dir() -> Result<Self> {
        let root = std::env::current_dir().context("resolving the working directory")?;
        Ok(Self::from_root(root))
    }
}
