mod builder;
mod error;
mod model;
mod naive_bayes;
mod tokenizer;
mod utils;
mod vectorizer;

pub use builder::{ClassDefinition, ClassifierBuilder};
pub use error::ClassifierError;
pub use model::{Classifier, FittedModel};
pub use naive_bayes::{NaiveBayes, DEFAULT_SMOOTHING};
pub use tokenizer::Tokenizer;
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};

use crate::category::Category;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierInfo {
    /// Number of categories the classifier predicts
    pub num_classes: usize,
    /// Labels of the categories, in tie-break order
    pub class_labels: Vec<Category>,
    /// Number of terms in the fitted vocabulary
    pub vocabulary_size: usize,
    /// Additive smoothing factor used when fitting
    pub smoothing: f64,
    /// Category predicted for text without any known term
    pub default_category: Category,
    /// Tokenization and vocabulary settings
    pub vectorizer_config: VectorizerConfig,
}
