use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::naive_bayes::NaiveBayes;
use super::vectorizer::{TfidfVectorizer, VectorizerConfig};
use crate::category::Category;

/// Plain, serializable parameters of a fitted classifier.
///
/// The vocabulary and the likelihood table are only meaningful together, so they are
/// always stored and restored as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub config: VectorizerConfig,
    pub alpha: f64,
    pub categories: Vec<Category>,
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
}

/// A fitted expense classifier: TF-IDF features feeding a multinomial Naive Bayes model.
///
/// # Thread Safety
///
/// The classifier is immutable once built and holds no interior mutability, so it is
/// `Send + Sync` and can be shared through `Arc` by any number of concurrent callers.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use expense_categorizer::{Category, Classifier, ClassDefinition};
///
/// let mut builder = Classifier::builder();
/// for category in Category::ALL {
///     builder = builder.add_class(
///         ClassDefinition::new(category, category.description())
///             .with_examples(vec![category.label()]),
///     )?;
/// }
/// let classifier = builder.build()?;
///
/// assert_eq!(classifier.classify("bills"), Category::Bills);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    vectorizer: TfidfVectorizer,
    model: NaiveBayes,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    pub(crate) fn from_fitted_parts(vectorizer: TfidfVectorizer, model: NaiveBayes) -> Self {
        Self { vectorizer, model }
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            num_classes: Category::COUNT,
            class_labels: Category::ALL.to_vec(),
            vocabulary_size: self.vectorizer.num_features(),
            smoothing: self.model.alpha(),
            default_category: self.model.default_category(),
            vectorizer_config: self.vectorizer.config().clone(),
        }
    }

    /// Extracts the feature vector for a description
    pub fn features(&self, text: &str) -> Array1<f64> {
        self.vectorizer.transform(text)
    }

    /// Predicts the category of the text and returns the posterior probability of every
    /// category.
    ///
    /// Every input is valid: empty or entirely unknown text falls back to the category
    /// with the highest prior.
    pub fn predict(&self, text: &str) -> (Category, HashMap<Category, f64>) {
        let features = self.vectorizer.transform(text);
        let label = self.model.predict(&features);
        let scores = Category::ALL
            .iter()
            .copied()
            .zip(self.model.predict_proba(&features))
            .collect();
        (label, scores)
    }

    /// Predicts the category of the text
    pub fn classify(&self, text: &str) -> Category {
        self.model.predict(&self.vectorizer.transform(text))
    }

    /// Posterior probabilities as percentages rounded to two decimals, in category order.
    pub fn predict_with_confidence(&self, text: &str) -> Vec<(Category, f64)> {
        let features = self.vectorizer.transform(text);
        Category::ALL
            .iter()
            .copied()
            .zip(self.model.predict_proba(&features))
            .map(|(category, p)| (category, (p * 10_000.0).round() / 100.0))
            .collect()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn naive_bayes(&self) -> &NaiveBayes {
        &self.model
    }

    /// Copies the fitted parameters into their serializable form.
    pub fn to_fitted_model(&self) -> FittedModel {
        FittedModel {
            config: self.vectorizer.config().clone(),
            alpha: self.model.alpha(),
            categories: Category::ALL.to_vec(),
            vocabulary: self.vectorizer.vocabulary().to_vec(),
            idf: self.vectorizer.idf().to_vec(),
            class_log_prior: self.model.class_log_prior().to_vec(),
            feature_log_prob: self
                .model
                .feature_log_prob()
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
        }
    }

    /// Restores a classifier from persisted parameters after checking that they
    /// describe a structurally valid model.
    pub fn from_fitted_model(fitted: FittedModel) -> Result<Self, ClassifierError> {
        if fitted.categories != Category::ALL {
            return Err(ClassifierError::InvalidModel(format!(
                "Category table {:?} does not match {:?}",
                fitted.categories,
                Category::ALL
            )));
        }
        let n_features = fitted.vocabulary.len();
        let vectorizer = TfidfVectorizer::from_parts(fitted.config, fitted.vocabulary, fitted.idf)?;
        let model = NaiveBayes::from_parts(
            fitted.alpha,
            fitted.class_log_prior,
            fitted.feature_log_prob,
            n_features,
        )?;
        Ok(Self { vectorizer, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{class_definitions, training_corpus};

    fn corpus_classifier() -> Classifier {
        class_definitions(training_corpus())
            .into_iter()
            .try_fold(Classifier::builder(), |b, def| b.add_class(def))
            .and_then(|b| b.build())
            .expect("Failed to build classifier")
    }

    #[test]
    fn test_class_info() {
        let classifier = corpus_classifier();
        let info = classifier.info();
        assert_eq!(info.num_classes, 5);
        assert_eq!(info.class_labels, Category::ALL.to_vec());
        assert!(info.vocabulary_size > 100);
        assert_eq!(info.smoothing, 1.0);
        assert_eq!(info.default_category, Category::Shopping);
    }

    #[test]
    fn test_predict_scores_cover_every_category() {
        let classifier = corpus_classifier();
        let (label, scores) = classifier.predict("uber to airport");
        assert_eq!(label, Category::Travel);
        assert_eq!(scores.len(), Category::COUNT);
        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        let best = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(c, _)| *c)
            .unwrap();
        assert_eq!(best, label);
    }

    #[test]
    fn test_predict_with_confidence_is_percentage() {
        let classifier = corpus_classifier();
        let confidence = classifier.predict_with_confidence("gaming subscription");
        let categories: Vec<Category> = confidence.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, Category::ALL.to_vec());
        let total: f64 = confidence.iter().map(|(_, p)| p).sum();
        assert!((total - 100.0).abs() < 0.05);
        for (_, p) in &confidence {
            assert_eq!((p * 100.0).round() / 100.0, *p);
        }
    }

    #[test]
    fn test_fitted_model_round_trip() {
        let classifier = corpus_classifier();
        let restored = Classifier::from_fitted_model(classifier.to_fitted_model()).unwrap();
        for example in training_corpus() {
            assert_eq!(restored.classify(example.text), classifier.classify(example.text));
        }
        assert_eq!(restored.to_fitted_model(), classifier.to_fitted_model());
    }

    #[test]
    fn test_from_fitted_model_rejects_reordered_categories() {
        let mut fitted = corpus_classifier().to_fitted_model();
        fitted.categories.swap(0, 1);
        assert!(matches!(
            Classifier::from_fitted_model(fitted),
            Err(ClassifierError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_from_fitted_model_rejects_truncated_rows() {
        let mut fitted = corpus_classifier().to_fitted_model();
        fitted.feature_log_prob[3].pop();
        assert!(matches!(
            Classifier::from_fitted_model(fitted),
            Err(ClassifierError::InvalidModel(_))
        ));
    }
}
