use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::{Classifier, FittedModel};

/// Format tag written into every artifact.
pub const ARTIFACT_FORMAT: &str = "expense-categorizer/multinomial-nb";
/// Artifact layout version; bump when `FittedModel` changes shape.
pub const ARTIFACT_VERSION: u32 = 1;

const CACHE_ENV_VAR: &str = "EXPENSE_CATEGORIZER_CACHE";
const MODEL_FILE_NAME: &str = "model.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Corrupt model artifact: {0}")]
    CorruptArtifact(String),
    #[error("Model artifact verification failed after write")]
    VerificationFailed,
}

/// A classifier restored from disk together with the digest of the corpus it was
/// trained on.
#[derive(Debug, Clone)]
pub struct StoredModel {
    pub corpus_digest: String,
    pub classifier: Classifier,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    format: String,
    version: u32,
    corpus_digest: String,
    /// Hex SHA-256 of the serialized `model`
    checksum: String,
    model: FittedModel,
}

/// Persists one fitted classifier at a fixed path.
///
/// The artifact is a cache: the training corpus can always regenerate it, so a missing
/// file is a normal state and a damaged one is reported as [`StoreError::CorruptArtifact`]
/// for the caller to discard.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    /// Creates a ModelStore at the default artifact path
    pub fn new_default() -> Self {
        Self::new(Self::get_default_model_path())
    }

    /// Returns the default artifact path
    pub fn get_default_model_path() -> PathBuf {
        Self::default_model_path_from(env::var_os(CACHE_ENV_VAR).map(PathBuf::from))
    }

    /// Resolves the default artifact path given the value of `EXPENSE_CATEGORIZER_CACHE`.
    fn default_model_path_from(cache_override: Option<PathBuf>) -> PathBuf {
        // 1. Check environment variable
        if let Some(path) = cache_override {
            return path.join("models").join(MODEL_FILE_NAME);
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir
                .join("expense-categorizer")
                .join("models")
                .join(MODEL_FILE_NAME);
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir
                .join(".cache")
                .join("expense-categorizer")
                .join("models")
                .join(MODEL_FILE_NAME);
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir()
            .join("expense-categorizer")
            .join("models")
            .join(MODEL_FILE_NAME)
    }

    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn checksum(model: &FittedModel) -> Result<String, StoreError> {
        let bytes = serde_json::to_vec(model)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Writes the classifier to the artifact path, replacing any previous artifact.
    pub fn save(&self, classifier: &Classifier, corpus_digest: &str) -> Result<(), StoreError> {
        let model = classifier.to_fitted_model();
        let checksum = Self::checksum(&model)?;
        let envelope = ArtifactEnvelope {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            corpus_digest: corpus_digest.to_string(),
            checksum: checksum.clone(),
            model,
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        if let Some(parent) = self.path.parent() {
            log::debug!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent)?;
        }

        // Write next to the target and rename, so readers never see a partial file.
        let tmp_path = self.path.with_extension("json.tmp");
        log::debug!("Writing {} bytes to {:?}", bytes.len(), tmp_path);
        fs::write(&tmp_path, &bytes)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        // Verify after writing
        let written: ArtifactEnvelope = serde_json::from_slice(&fs::read(&self.path)?)
            .map_err(|_| StoreError::VerificationFailed)?;
        if written.checksum != checksum || Self::checksum(&written.model)? != checksum {
            log::error!("Model artifact at {:?} failed verification", self.path);
            return Err(StoreError::VerificationFailed);
        }

        log::info!("Model artifact saved to {:?}", self.path);
        Ok(())
    }

    /// Reads the artifact.
    ///
    /// Returns `Ok(None)` when no artifact exists yet.
    pub fn load(&self) -> Result<Option<StoredModel>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No model artifact at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        log::debug!("Read {} bytes from {:?}", bytes.len(), self.path);

        let envelope: ArtifactEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::CorruptArtifact(format!("unreadable artifact: {}", e)))?;

        if envelope.format != ARTIFACT_FORMAT {
            return Err(StoreError::CorruptArtifact(format!(
                "unexpected format '{}'",
                envelope.format
            )));
        }
        if envelope.version != ARTIFACT_VERSION {
            return Err(StoreError::CorruptArtifact(format!(
                "unsupported version {} (expected {})",
                envelope.version, ARTIFACT_VERSION
            )));
        }

        let actual = Self::checksum(&envelope.model)?;
        if actual != envelope.checksum {
            return Err(StoreError::CorruptArtifact(format!(
                "checksum mismatch: expected {}, got {}",
                envelope.checksum, actual
            )));
        }

        let classifier = Classifier::from_fitted_model(envelope.model)
            .map_err(|e| StoreError::CorruptArtifact(e.to_string()))?;

        log::info!("Loaded model artifact from {:?}", self.path);
        Ok(Some(StoredModel {
            corpus_digest: envelope.corpus_digest,
            classifier,
        }))
    }

    /// Deletes the artifact if present.
    pub fn remove(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("Removed model artifact at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
