use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::classifier::{Classifier, GradientBoostedTrees};
use super::pipeline::{PreprocessingPipeline, Transformer};
use crate::config::ArtifactPaths;

#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("cannot read the {artifact} artifact at {}", .path.display())]
    Read {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot deserialize the {artifact} artifact at {}", .path.display())]
    Deserialize {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {artifact} artifact: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
    #[error("artifacts do not match each other: {0}")]
    Inconsistent(String),
}

// ---------------------------------------------------------------------------
// ArtifactBundle – transformer, feature names, classifier
// ---------------------------------------------------------------------------

/// The loaded model artifacts. Read-only once built.
pub struct ArtifactBundle {
    transformer: Box<dyn Transformer>,
    feature_names: Vec<String>,
    classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("feature_names", &self.feature_names.len())
            .field("classifier_features", &self.classifier.num_features())
            .finish_non_exhaustive()
    }
}

impl ArtifactBundle {
    /// Assemble a bundle, checking that the three parts agree on the
    /// feature layout.
    pub fn new(
        transformer: Box<dyn Transformer>,
        feature_names: Vec<String>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ArtifactLoadError> {
        let produced = transformer.output_names();
        if produced.len() != feature_names.len() {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "pipeline produces {} features but the feature list has {}",
                produced.len(),
                feature_names.len()
            )));
        }
        if let Some((i, (a, b))) = produced
            .iter()
            .zip(&feature_names)
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "feature {i} is '{a}' in the pipeline but '{b}' in the feature list"
            )));
        }
        if classifier.num_features() != feature_names.len() {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "classifier expects {} features but the feature list has {}",
                classifier.num_features(),
                feature_names.len()
            )));
        }

        Ok(ArtifactBundle {
            transformer,
            feature_names,
            classifier,
        })
    }

    pub fn transformer(&self) -> &dyn Transformer {
        self.transformer.as_ref()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

// ---------------------------------------------------------------------------
// ArtifactStore – load once, hand out shared read-only handles
// ---------------------------------------------------------------------------

/// Owns the artifact locations and the bundle once it has been loaded.
///
/// Constructed once at startup and passed to each session. A failed load is
/// not cached.
pub struct ArtifactStore {
    paths: ArtifactPaths,
    bundle: OnceLock<Arc<ArtifactBundle>>,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        ArtifactStore {
            paths,
            bundle: OnceLock::new(),
        }
    }

    /// Return the bundle, reading storage only on the first successful call.
    pub fn load(&self) -> Result<Arc<ArtifactBundle>, ArtifactLoadError> {
        if let Some(bundle) = self.bundle.get() {
            return Ok(Arc::clone(bundle));
        }

        let bundle = Arc::new(load_bundle(&self.paths)?);
        log::info!(
            "Loaded artifacts: {} features, classifier expects {}",
            bundle.feature_names().len(),
            bundle.classifier().num_features()
        );
        Ok(Arc::clone(self.bundle.get_or_init(|| bundle)))
    }
}

fn load_bundle(paths: &ArtifactPaths) -> Result<ArtifactBundle, ArtifactLoadError> {
    let pipeline: PreprocessingPipeline = read_json("preprocessing pipeline", &paths.pipeline)?;
    pipeline
        .validate()
        .map_err(|reason| ArtifactLoadError::Invalid {
            artifact: "preprocessing pipeline",
            reason,
        })?;

    let feature_names: Vec<String> = read_json("feature names", &paths.feature_names)?;

    let model: GradientBoostedTrees = read_json("classifier", &paths.classifier)?;
    model.validate().map_err(|reason| ArtifactLoadError::Invalid {
        artifact: "classifier",
        reason,
    })?;

    ArtifactBundle::new(Box::new(pipeline), feature_names, Box::new(model))
}

fn read_json<T: DeserializeOwned>(
    artifact: &'static str,
    path: &Path,
) -> Result<T, ArtifactLoadError> {
    log::debug!("Reading {artifact} from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| ArtifactLoadError::Read {
        artifact,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactLoadError::Deserialize {
        artifact,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::testing::{demo_model, demo_pipeline, write_artifacts};

    #[test]
    fn load_is_cached_and_shared() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(write_artifacts(dir.path()));

        let first = store.load().unwrap();
        // Removing the files proves the second call does not touch storage.
        std::fs::remove_dir_all(dir.path().join("artifacts")).unwrap();
        let second = store.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.feature_names().len(), 3);
    }

    #[test]
    fn missing_file_fails_the_whole_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        std::fs::remove_file(&paths.classifier).unwrap();

        let err = ArtifactStore::new(paths).load().unwrap_err();
        assert!(matches!(
            err,
            ArtifactLoadError::Read {
                artifact: "classifier",
                ..
            }
        ));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::under(dir.path());
        let store = ArtifactStore::new(paths);
        assert!(store.load().is_err());

        write_artifacts(dir.path());
        assert!(store.load().is_ok());
    }

    #[test]
    fn corrupt_json_is_a_deserialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        std::fs::write(&paths.feature_names, "not json").unwrap();

        let err = ArtifactStore::new(paths).load().unwrap_err();
        assert!(matches!(
            err,
            ArtifactLoadError::Deserialize {
                artifact: "feature names",
                ..
            }
        ));
    }

    #[test]
    fn feature_list_must_match_the_pipeline() {
        let names = vec![
            "AMT_INCOME_TOTAL".to_string(),
            "NAME_CONTRACT_TYPE_Cash loans".to_string(),
            "SOMETHING_ELSE".to_string(),
        ];
        let err = ArtifactBundle::new(Box::new(demo_pipeline()), names, Box::new(demo_model()))
            .unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Inconsistent(_)));
    }

    #[test]
    fn classifier_width_must_match_the_feature_list() {
        let mut model = demo_model();
        model.num_features = 4;
        let names = demo_pipeline().output_names();
        let err =
            ArtifactBundle::new(Box::new(demo_pipeline()), names, Box::new(model)).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Inconsistent(_)));
    }
}
