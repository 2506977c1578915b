//! The categorization service: trains or loads the classifier once, then answers
//! `classify` calls from any number of threads.

use std::path::PathBuf;
#[cfg(test)]
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

use log::{debug, error, info, warn};

use crate::category::{self, Category};
use crate::classifier::{
    Classifier, ClassifierError, VectorizerConfig, DEFAULT_SMOOTHING,
};
use crate::corpus::{class_definitions, corpus_digest, training_corpus, TrainingExample};
use crate::model_store::{ModelStore, StoreError};

/// Lifecycle of the service. `classify` is only legal in `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Loading,
    Fitting,
    Ready,
    Failed,
}

impl ServiceState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Loading,
            2 => Self::Fitting,
            3 => Self::Ready,
            4 => Self::Failed,
            _ => Self::Uninitialized,
        }
    }
}

/// Where the ready model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    /// Restored from the model store
    Loaded,
    /// Fitted on the training corpus during `initialize`
    Trained,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Categorization service is not ready (state: {0:?}); call initialize() first")]
    NotReady(ServiceState),
    #[error("Training failed: {0}")]
    Training(#[from] ClassifierError),
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Artifact location; `None` uses [`ModelStore::get_default_model_path`]
    pub model_path: Option<PathBuf>,
    /// Load from and save to the model store. When false the model lives in memory only.
    pub persist: bool,
    /// Additive smoothing for the Naive Bayes model
    pub smoothing: f64,
    pub vectorizer: VectorizerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            persist: true,
            smoothing: DEFAULT_SMOOTHING,
            vectorizer: VectorizerConfig::default(),
        }
    }
}

#[derive(Debug)]
struct ReadyModel {
    classifier: Classifier,
    source: ModelSource,
}

/// Owns the one fitted classifier of the process.
///
/// Construct it once at startup, call [`initialize`](Self::initialize), and hand a shared
/// reference (typically an `Arc`) to whatever creates expenses.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use expense_categorizer::{CategorizationService, Category, ServiceConfig};
///
/// let service = CategorizationService::new(ServiceConfig {
///     persist: false,
///     ..ServiceConfig::default()
/// });
/// service.initialize()?;
///
/// assert_eq!(service.classify("uber to airport"), Category::Travel);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CategorizationService {
    config: ServiceConfig,
    store: ModelStore,
    corpus: &'static [TrainingExample],
    state: AtomicU8,
    init_lock: Mutex<()>,
    ready: OnceLock<ReadyModel>,
    #[cfg(test)]
    load_or_fit_runs: AtomicUsize,
}

impl CategorizationService {
    /// Creates a service over the built-in training corpus
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_corpus(config, training_corpus())
    }

    /// Creates a service over a caller-supplied corpus
    pub fn with_corpus(config: ServiceConfig, corpus: &'static [TrainingExample]) -> Self {
        let store = match &config.model_path {
            Some(path) => ModelStore::new(path),
            None => ModelStore::new_default(),
        };
        Self {
            config,
            store,
            corpus,
            state: AtomicU8::new(ServiceState::Uninitialized as u8),
            init_lock: Mutex::new(()),
            ready: OnceLock::new(),
            #[cfg(test)]
            load_or_fit_runs: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ServiceState) {
        debug!("Categorization service state: {:?}", state);
        self.state.store(state as u8, Ordering::Release);
    }

    /// Loads the persisted model or fits a new one.
    ///
    /// Safe to call from several threads at once: exactly one caller performs the
    /// load-or-fit sequence, the others wait and then observe the finished model.
    /// Calls after success return immediately. A failed attempt leaves the service in
    /// `Failed`, and the next call tries again.
    pub fn initialize(&self) -> Result<ModelSource, ServiceError> {
        if let Some(ready) = self.ready.get() {
            return Ok(ready.source);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ready) = self.ready.get() {
            return Ok(ready.source);
        }

        #[cfg(test)]
        self.load_or_fit_runs.fetch_add(1, Ordering::SeqCst);

        let digest = corpus_digest(self.corpus);

        if self.config.persist {
            self.set_state(ServiceState::Loading);
            if let Some(classifier) = self.load_matching(&digest) {
                return Ok(self.publish(classifier, ModelSource::Loaded));
            }
        }

        self.set_state(ServiceState::Fitting);
        info!("Training categorization model on {} examples...", self.corpus.len());
        let classifier = match self.train() {
            Ok(classifier) => classifier,
            Err(e) => {
                error!("Failed to train categorization model: {}", e);
                self.set_state(ServiceState::Failed);
                return Err(e.into());
            }
        };

        if self.config.persist {
            if let Err(e) = self.store.save(&classifier, &digest) {
                warn!(
                    "Could not persist model to {:?}, continuing in memory: {}",
                    self.store.path(),
                    e
                );
            }
        }

        Ok(self.publish(classifier, ModelSource::Trained))
    }

    /// Must be called with `init_lock` held.
    fn publish(&self, classifier: Classifier, source: ModelSource) -> ModelSource {
        info!(
            "Categorization model ready ({:?}, default category '{}')",
            source,
            classifier.naive_bayes().default_category()
        );
        if self.ready.set(ReadyModel { classifier, source }).is_err() {
            error!("Categorization model was already published; discarding duplicate");
            return self.ready.get().map_or(source, |ready| ready.source);
        }
        self.set_state(ServiceState::Ready);
        source
    }

    /// Returns the stored classifier if it exists, is intact, and was fitted on this
    /// corpus with these settings. Any other outcome means "train".
    fn load_matching(&self, digest: &str) -> Option<Classifier> {
        match self.store.load() {
            Ok(Some(stored)) => {
                if stored.corpus_digest != digest {
                    info!("Stored model was trained on a different corpus, retraining");
                    return None;
                }
                let info = stored.classifier.info();
                if info.vectorizer_config != self.config.vectorizer
                    || info.smoothing != self.config.smoothing
                {
                    info!("Stored model uses different settings, retraining");
                    return None;
                }
                Some(stored.classifier)
            }
            Ok(None) => {
                info!("No stored model at {:?}, training", self.store.path());
                None
            }
            Err(StoreError::CorruptArtifact(reason)) => {
                warn!("Discarding corrupt model artifact: {}", reason);
                if let Err(e) = self.store.remove() {
                    warn!("Failed to remove corrupt model artifact: {}", e);
                }
                None
            }
            Err(e) => {
                warn!("Could not read stored model, training instead: {}", e);
                None
            }
        }
    }

    fn train(&self) -> Result<Classifier, ClassifierError> {
        class_definitions(self.corpus)
            .into_iter()
            .try_fold(
                Classifier::builder()
                    .with_vectorizer_config(self.config.vectorizer.clone())
                    .with_smoothing(self.config.smoothing),
                |builder, class| builder.add_class(class),
            )?
            .build()
    }

    /// The ready classifier
    pub fn classifier(&self) -> Result<&Classifier, ServiceError> {
        self.ready
            .get()
            .map(|ready| &ready.classifier)
            .ok_or_else(|| ServiceError::NotReady(self.state()))
    }

    /// Where the ready model came from, if the service is ready
    pub fn model_source(&self) -> Option<ModelSource> {
        self.ready.get().map(|ready| ready.source)
    }

    /// Categorizes a description.
    ///
    /// Every input yields a category; empty or unrecognised text gets the category with the
    /// highest prior.
    ///
    /// # Panics
    ///
    /// Panics if called before [`initialize`](Self::initialize) has succeeded. Use
    /// [`try_classify`](Self::try_classify) to check instead.
    pub fn classify(&self, text: &str) -> Category {
        match self.try_classify(text) {
            Ok(category) => category,
            Err(e) => panic!("classify() called on an uninitialized service: {}", e),
        }
    }

    pub fn try_classify(&self, text: &str) -> Result<Category, ServiceError> {
        let category = self.classifier()?.classify(text);
        debug!("Classified {:?} as {}", text, category);
        Ok(category)
    }

    /// Confidence per category in percent, in category order
    pub fn predict_with_confidence(
        &self,
        text: &str,
    ) -> Result<Vec<(Category, f64)>, ServiceError> {
        Ok(self.classifier()?.predict_with_confidence(text))
    }

    /// Category for a new expense: a category the user picked wins over the prediction.
    pub fn categorize_expense(&self, description: &str, manual: Option<Category>) -> Category {
        match manual {
            Some(category) => category,
            None => self.classify(description),
        }
    }

    /// Categories a user can choose from
    pub fn categories(&self) -> &'static [Category] {
        category::categories()
    }

    /// Fraction of training examples the ready model labels correctly.
    pub fn evaluate_corpus(&self) -> Result<f64, ServiceError> {
        let classifier = self.classifier()?;
        if self.corpus.is_empty() {
            return Ok(0.0);
        }
        let correct = self
            .corpus
            .iter()
            .filter(|example| classifier.classify(example.text) == example.label)
            .count();
        Ok(correct as f64 / self.corpus.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    fn in_memory() -> CategorizationService {
        CategorizationService::new(ServiceConfig {
            persist: false,
            ..ServiceConfig::default()
        })
    }

    #[test]
    fn test_state_transitions() {
        let service = in_memory();
        assert_eq!(service.state(), ServiceState::Uninitialized);
        assert!(matches!(
            service.try_classify("pizza"),
            Err(ServiceError::NotReady(ServiceState::Uninitialized))
        ));
        assert_eq!(service.initialize().unwrap(), ModelSource::Trained);
        assert_eq!(service.state(), ServiceState::Ready);
        assert_eq!(service.initialize().unwrap(), ModelSource::Trained);
    }

    #[test]
    #[should_panic(expected = "uninitialized service")]
    fn test_classify_before_initialize_panics() {
        in_memory().classify("pizza delivery");
    }

    #[test]
    fn test_failed_training_is_reported_and_retried() {
        static ONLY_FOOD: [TrainingExample; 1] = [TrainingExample {
            text: "pizza",
            label: Category::Food,
        }];
        let service = CategorizationService::with_corpus(
            ServiceConfig {
                persist: false,
                ..ServiceConfig::default()
            },
            &ONLY_FOOD,
        );
        assert!(matches!(service.initialize(), Err(ServiceError::Training(_))));
        assert_eq!(service.state(), ServiceState::Failed);
        assert!(service.initialize().is_err());
        assert!(service.try_classify("pizza").is_err());
    }

    #[test]
    fn test_manual_category_wins() {
        let service = in_memory();
        service.initialize().unwrap();
        assert_eq!(
            service.categorize_expense("uber to airport", Some(Category::Bills)),
            Category::Bills
        );
        assert_eq!(service.categorize_expense("uber to airport", None), Category::Travel);
    }

    #[test]
    fn test_persists_after_training_then_loads() {
        let dir = TempDir::new().unwrap();
        let config = ServiceConfig {
            model_path: Some(dir.path().join("model.json")),
            ..ServiceConfig::default()
        };

        let first = CategorizationService::new(config.clone());
        assert_eq!(first.initialize().unwrap(), ModelSource::Trained);
        assert!(first.store().exists());

        let second = CategorizationService::new(config);
        assert_eq!(second.initialize().unwrap(), ModelSource::Loaded);
        assert_eq!(second.model_source(), Some(ModelSource::Loaded));
    }

    fn initialize_concurrently(
        service: &Arc<CategorizationService>,
        threads: usize,
    ) -> Vec<ModelSource> {
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let service = Arc::clone(service);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    service.initialize().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn test_concurrent_initialize_fits_once() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(CategorizationService::new(ServiceConfig {
            model_path: Some(dir.path().join("model.json")),
            ..ServiceConfig::default()
        }));

        let sources = initialize_concurrently(&service, 8);
        assert!(sources.iter().all(|&s| s == ModelSource::Trained));
        assert_eq!(service.load_or_fit_runs.load(Ordering::SeqCst), 1);
        assert!(service.store().exists());

        service.initialize().unwrap();
        assert_eq!(service.load_or_fit_runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_initialize_loads_once() {
        let dir = TempDir::new().unwrap();
        let config = ServiceConfig {
            model_path: Some(dir.path().join("model.json")),
            ..ServiceConfig::default()
        };
        CategorizationService::new(config.clone()).initialize().unwrap();

        let service = Arc::new(CategorizationService::new(config));
        let sources = initialize_concurrently(&service, 8);
        assert!(sources.iter().all(|&s| s == ModelSource::Loaded));
        assert_eq!(service.load_or_fit_runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_attempts_are_counted_until_success() {
        static ONLY_FOOD: [TrainingExample; 1] = [TrainingExample {
            text: "pizza",
            label: Category::Food,
        }];
        let service = CategorizationService::with_corpus(
            ServiceConfig {
                persist: false,
                ..ServiceConfig::default()
            },
            &ONLY_FOOD,
        );
        assert!(service.initialize().is_err());
        assert!(service.initialize().is_err());
        assert_eq!(service.load_or_fit_runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_changed_settings_retrain() {
        let dir = TempDir::new().unwrap();
        let config = ServiceConfig {
            model_path: Some(dir.path().join("model.json")),
            ..ServiceConfig::default()
        };
        CategorizationService::new(config.clone()).initialize().unwrap();

        let changed = CategorizationService::new(ServiceConfig {
            smoothing: 0.5,
            ..config
        });
        assert_eq!(changed.initialize().unwrap(), ModelSource::Trained);
    }
}
