use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::data::ingest::parse_csv;
use crate::data::model::{RawTable, ResultTable, DEFAULT_ID_COLUMN};
use crate::scoring::{score, ArtifactBundle, ArtifactStore};

// ---------------------------------------------------------------------------
// Errors shown to the user
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fatal for the session.
    Artifacts,
    Parse,
    Scoring,
    Export,
}

/// A short message plus the full technical cause chain.
#[derive(Debug, Clone, PartialEq)]
pub struct UserError {
    pub kind: ErrorKind,
    pub message: &'static str,
    pub cause: String,
}

impl UserError {
    fn new(kind: ErrorKind, err: impl Into<anyhow::Error>) -> Self {
        let message = match kind {
            ErrorKind::Artifacts => "Could not load the model artifacts. Check the 'artifacts/' folder.",
            ErrorKind::Parse => "Could not read the CSV. Check the file format.",
            ErrorKind::Scoring => {
                "Could not apply the pipeline or the model. Check that the CSV columns match the expected dataset."
            }
            ErrorKind::Export => "Could not save the results.",
        };
        UserError {
            kind,
            message,
            cause: format!("{:#}", err.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Where the session is in the upload → preview → compute flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ArtifactsFailed,
    AwaitingUpload,
    UploadFailed,
    Previewing,
    Computing,
    ScoringFailed,
    Scored,
}

/// The parsed upload and where it came from.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub table: RawTable,
}

/// The full state of one session, independent of rendering.
pub struct SessionState {
    /// Loaded artifacts; `None` means the session cannot score.
    bundle: Option<Arc<ArtifactBundle>>,

    /// Current upload (None until the user picks a file).
    pub upload: Option<Upload>,

    /// Scores for the current upload.
    pub results: Option<ResultTable>,

    /// Last error, if any.
    pub error: Option<UserError>,

    /// Status line, e.g. where results were saved.
    pub status_message: Option<String>,

    /// Set by the compute action, cleared once scoring has run.
    compute_pending: bool,
}

impl SessionState {
    /// Start a session: load (or reuse) the artifact bundle.
    pub fn start(store: &ArtifactStore) -> Self {
        let mut state = SessionState {
            bundle: None,
            upload: None,
            results: None,
            error: None,
            status_message: None,
            compute_pending: false,
        };
        match store.load() {
            Ok(bundle) => {
                state.bundle = Some(bundle);
                state.status_message = Some("Artifacts loaded.".to_string());
            }
            Err(e) => {
                log::error!("Failed to load artifacts: {e}");
                state.error = Some(UserError::new(ErrorKind::Artifacts, e));
            }
        }
        state
    }

    pub fn stage(&self) -> Stage {
        if self.bundle.is_none() {
            return Stage::ArtifactsFailed;
        }
        let error = self.error.as_ref().map(|e| e.kind);
        if self.compute_pending {
            return Stage::Computing;
        }
        match (&self.upload, &self.results, error) {
            (None, _, _) if error == Some(ErrorKind::Parse) => Stage::UploadFailed,
            (None, _, _) => Stage::AwaitingUpload,
            (Some(_), _, Some(ErrorKind::Scoring)) => Stage::ScoringFailed,
            (Some(_), Some(_), _) => Stage::Scored,
            (Some(_), None, _) => Stage::Previewing,
        }
    }

    pub fn bundle(&self) -> Option<&ArtifactBundle> {
        self.bundle.as_deref()
    }

    /// Uploads are offered only while artifacts are loaded.
    pub fn can_upload(&self) -> bool {
        self.bundle.is_some()
    }

    /// Replace the current upload with a freshly parsed one.
    pub fn ingest_upload(&mut self, file_name: &str, bytes: &[u8]) {
        if !self.can_upload() {
            log::warn!("Ignoring upload of {file_name}: artifacts are not loaded");
            return;
        }
        self.clear_upload();

        match parse_csv(bytes) {
            Ok(table) => {
                log::info!(
                    "Parsed {file_name}: {} rows, {} columns",
                    table.len(),
                    table.columns().len()
                );
                self.upload = Some(Upload {
                    file_name: file_name.to_string(),
                    table,
                });
            }
            Err(e) => {
                log::warn!("Failed to parse {file_name}: {e}");
                self.error = Some(UserError::new(ErrorKind::Parse, e));
            }
        }
    }

    /// The picked file could not be read at all.
    pub fn upload_read_failed(&mut self, err: anyhow::Error) {
        self.clear_upload();
        log::warn!("Failed to read upload: {err:#}");
        self.error = Some(UserError::new(ErrorKind::Parse, err));
    }

    fn clear_upload(&mut self) {
        self.upload = None;
        self.results = None;
        self.error = None;
        self.status_message = None;
        self.compute_pending = false;
    }

    /// The explicit "compute" action. Scoring itself runs in
    /// [`SessionState::run_pending_compute`].
    pub fn request_compute(&mut self) {
        if self.upload.is_some() && self.bundle.is_some() {
            self.compute_pending = true;
        }
    }

    pub fn compute_pending(&self) -> bool {
        self.compute_pending
    }

    /// Score the current upload if a compute was requested.
    pub fn run_pending_compute(&mut self) {
        if !std::mem::take(&mut self.compute_pending) {
            return;
        }
        let (Some(bundle), Some(upload)) = (&self.bundle, &self.upload) else {
            return;
        };

        self.results = None;
        self.error = None;
        self.status_message = None;

        match score(
            &upload.table,
            bundle.transformer(),
            bundle.classifier(),
            DEFAULT_ID_COLUMN,
        ) {
            Ok(results) => {
                log::info!("Scored {} rows of {}", results.len(), upload.file_name);
                self.results = Some(results);
            }
            Err(e) => {
                log::warn!("Scoring {} failed: {e}", upload.file_name);
                self.error = Some(UserError::new(ErrorKind::Scoring, e));
            }
        }
    }

    /// CSV bytes of the full results table.
    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        match &self.results {
            Some(results) if !results.is_empty() => results.to_csv_bytes(),
            _ => bail!("there are no results to export"),
        }
    }

    pub fn export_saved(&mut self, path: &Path) {
        log::info!("Saved results to {}", path.display());
        self.status_message = Some(format!("Results saved to {}", path.display()));
    }

    /// Export failures keep the results on screen.
    pub fn export_failed(&mut self, err: anyhow::Error) {
        log::warn!("Export failed: {err:#}");
        self.error = Some(UserError::new(ErrorKind::Export, err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::scoring::testing::{write_artifacts, VALID_CSV};

    fn started() -> (tempfile::TempDir, SessionState) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(write_artifacts(dir.path()));
        let state = SessionState::start(&store);
        (dir, state)
    }

    fn compute(state: &mut SessionState) {
        state.request_compute();
        assert_eq!(state.stage(), Stage::Computing);
        state.run_pending_compute();
    }

    #[test]
    fn upload_previews_without_scoring() {
        let (_dir, mut state) = started();
        assert_eq!(state.stage(), Stage::AwaitingUpload);

        state.ingest_upload("clients.csv", VALID_CSV.as_bytes());
        assert_eq!(state.stage(), Stage::Previewing);
        assert!(state.results.is_none());
        assert_eq!(state.upload.as_ref().unwrap().table.len(), 2);
    }

    #[test]
    fn scenario_a_scores_every_row_with_its_id() {
        let (_dir, mut state) = started();
        state.ingest_upload("clients.csv", VALID_CSV.as_bytes());
        compute(&mut state);

        assert_eq!(state.stage(), Stage::Scored);
        let results = state.results.as_ref().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.id_column, "SK_ID_CURR");
        assert_eq!(results.ids, vec![CellValue::Integer(100), CellValue::Integer(101)]);
        assert!(results.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));

        let csv = String::from_utf8(state.export_bytes().unwrap()).unwrap();
        assert!(csv.starts_with("SK_ID_CURR,TARGET\n100,"));
    }

    #[test]
    fn scenario_b_missing_feature_is_recoverable() {
        let (_dir, mut state) = started();
        state.ingest_upload("bad.csv", b"SK_ID_CURR,AMT_INCOME_TOTAL\n100,1000\n");
        compute(&mut state);

        assert_eq!(state.stage(), Stage::ScoringFailed);
        assert!(state.results.is_none());
        let error = state.error.as_ref().unwrap();
        assert_eq!(error.kind, ErrorKind::Scoring);
        assert!(error.cause.contains("NAME_CONTRACT_TYPE"));

        state.ingest_upload("fixed.csv", VALID_CSV.as_bytes());
        compute(&mut state);
        assert_eq!(state.stage(), Stage::Scored);
    }

    #[test]
    fn scenario_c_binary_upload_is_a_parse_error() {
        let (_dir, mut state) = started();
        state.ingest_upload("logo.png", &[0x89, b'P', b'N', b'G', 0, 0, 0, 0x0d]);

        assert_eq!(state.stage(), Stage::UploadFailed);
        assert!(state.upload.is_none());
        assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::Parse);
        assert!(state.can_upload());
    }

    #[test]
    fn scenario_d_row_ids_without_id_column() {
        let (_dir, mut state) = started();
        state.ingest_upload(
            "anon.csv",
            b"AMT_INCOME_TOTAL,NAME_CONTRACT_TYPE\n1,Cash loans\n2,Cash loans\n3,Revolving loans\n",
        );
        compute(&mut state);

        let results = state.results.as_ref().unwrap();
        assert_eq!(results.id_column, "row_id");
        assert_eq!(results.ids, (0..3).map(CellValue::Integer).collect::<Vec<_>>());
    }

    #[test]
    fn scenario_e_missing_artifact_blocks_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        std::fs::remove_file(&paths.feature_names).unwrap();

        let mut state = SessionState::start(&ArtifactStore::new(paths));
        assert_eq!(state.stage(), Stage::ArtifactsFailed);
        assert!(!state.can_upload());
        assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::Artifacts);

        state.ingest_upload("clients.csv", VALID_CSV.as_bytes());
        assert!(state.upload.is_none());
        assert_eq!(state.stage(), Stage::ArtifactsFailed);
    }

    #[test]
    fn reupload_discards_previous_results() {
        let (_dir, mut state) = started();
        state.ingest_upload("clients.csv", VALID_CSV.as_bytes());
        compute(&mut state);
        assert!(state.results.is_some());

        state.ingest_upload("other.csv", VALID_CSV.as_bytes());
        assert!(state.results.is_none());
        assert_eq!(state.stage(), Stage::Previewing);
        assert!(state.export_bytes().is_err());
    }

    #[test]
    fn empty_results_are_not_exported() {
        let (_dir, mut state) = started();
        state.ingest_upload("clients.csv", VALID_CSV.as_bytes());
        state.results = Some(ResultTable {
            id_column: "row_id".into(),
            ids: Vec::new(),
            probabilities: Vec::new(),
        });
        assert!(state.export_bytes().is_err());
    }

    #[test]
    fn sessions_share_one_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(write_artifacts(dir.path()));
        let a = SessionState::start(&store);
        let b = SessionState::start(&store);
        assert!(Arc::ptr_eq(a.bundle.as_ref().unwrap(), b.bundle.as_ref().unwrap()));
    }

    #[test]
    fn compute_without_upload_does_nothing() {
        let (_dir, mut state) = started();
        state.request_compute();
        assert!(!state.compute_pending());
        state.run_pending_compute();
        assert_eq!(state.stage(), Stage::AwaitingUpload);
    }
}
