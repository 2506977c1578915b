use std::collections::BTreeMap;

use log::{debug, info};

use super::error::ClassifierError;
use super::model::Classifier;
use super::naive_bayes::{validate_smoothing, NaiveBayes, DEFAULT_SMOOTHING};
use super::vectorizer::{TfidfVectorizer, VectorizerConfig};
use crate::category::Category;

/// Represents a class definition with required label, description and optional examples
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    /// The category this class trains
    pub label: Category,
    /// A short description of what this category covers.
    pub description: String,
    /// Example descriptions that belong to this category. At least one is required
    /// before the class can be added to a builder.
    pub examples: Option<Vec<String>>,
}

impl ClassDefinition {
    /// Creates a new class definition with required label and description
    ///
    /// # Example
    /// ```
    /// use expense_categorizer::{Category, ClassDefinition};
    ///
    /// let class = ClassDefinition::new(Category::Travel, "Getting from A to B");
    /// ```
    pub fn new(label: Category, description: impl Into<String>) -> Self {
        Self {
            label,
            description: description.into(),
            examples: None,
        }
    }

    /// Adds examples to the class definition
    ///
    /// # Example
    /// ```
    /// use expense_categorizer::{Category, ClassDefinition};
    ///
    /// let class = ClassDefinition::new(Category::Travel, "Getting from A to B")
    ///     .with_examples(vec!["taxi fare", "train ticket"]);
    /// ```
    pub fn with_examples(mut self, examples: Vec<impl Into<String>>) -> Self {
        self.examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }
}

/// A builder for fitting a Classifier with a fluent interface.
#[derive(Debug)]
pub struct ClassifierBuilder {
    class_examples: BTreeMap<Category, Vec<String>>,
    vectorizer_config: VectorizerConfig,
    smoothing: f64,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    pub fn new() -> Self {
        Self {
            class_examples: BTreeMap::new(),
            vectorizer_config: VectorizerConfig::default(),
            smoothing: DEFAULT_SMOOTHING,
        }
    }

    /// Sets the tokenization and vocabulary settings
    pub fn with_vectorizer_config(mut self, config: VectorizerConfig) -> Self {
        self.vectorizer_config = config;
        self
    }

    /// Sets the additive smoothing factor. Validated by [`ClassifierBuilder::build`].
    pub fn with_smoothing(mut self, alpha: f64) -> Self {
        self.smoothing = alpha;
        self
    }

    /// Validates class data according to the following rules:
    /// - Description must not be empty and must not exceed 1000 characters
    /// - Must have at least one example
    /// - No example text can be empty
    fn validate_class_data(
        label: Category,
        description: &str,
        examples: &[impl AsRef<str>],
    ) -> Result<(), ClassifierError> {
        const MAX_DESCRIPTION_LENGTH: usize = 1000;

        if description.trim().is_empty() {
            return Err(ClassifierError::ValidationError(
                "Class description cannot be empty".into(),
            ));
        }
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(ClassifierError::ValidationError(format!(
                "Class description is too long ({} chars, max is {})",
                description.len(),
                MAX_DESCRIPTION_LENGTH
            )));
        }
        if examples.is_empty() {
            return Err(ClassifierError::ValidationError(format!(
                "Class '{}' must have at least one example",
                label
            )));
        }
        if let Some(pos) = examples.iter().position(|e| e.as_ref().trim().is_empty()) {
            return Err(ClassifierError::ValidationError(format!(
                "Example {} cannot be empty",
                pos + 1
            )));
        }
        Ok(())
    }

    /// Adds a category with its description and training examples
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The description is empty or too long
    ///   - No examples are provided
    ///   - Any example text is empty
    ///   - The category was already added
    pub fn add_class(mut self, class: ClassDefinition) -> Result<Self, ClassifierError> {
        let examples = class.examples.unwrap_or_default();

        Self::validate_class_data(class.label, &class.description, &examples)?;

        if self.class_examples.contains_key(&class.label) {
            return Err(ClassifierError::ValidationError(format!(
                "Class '{}' was already added",
                class.label
            )));
        }

        debug!("Adding class '{}' with {} examples", class.label, examples.len());
        self.class_examples.insert(class.label, examples);

        Ok(self)
    }

    /// Fits the vectorizer and the Naive Bayes model and returns the final Classifier
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The fitted Classifier if successful, or an error if:
    ///   - Any category has no class definition
    ///   - The smoothing factor is not a positive finite number
    ///   - The examples produce no usable terms
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        if let Some(missing) = Category::ALL
            .iter()
            .find(|c| !self.class_examples.contains_key(*c))
        {
            return Err(ClassifierError::BuildError(format!(
                "Category '{}' has no class definition",
                missing
            )));
        }
        validate_smoothing(self.smoothing)?;

        let mut texts = Vec::new();
        let mut labels = Vec::new();
        for (&label, examples) in &self.class_examples {
            texts.extend(examples.iter().map(String::as_str));
            labels.extend(std::iter::repeat(label).take(examples.len()));
        }

        info!(
            "Fitting classifier on {} examples across {} categories",
            texts.len(),
            self.class_examples.len()
        );

        let vectorizer = TfidfVectorizer::fit(self.vectorizer_config, &texts)?;
        let features = vectorizer.transform_all(&texts);
        let model = NaiveBayes::fit(&features, &labels, self.smoothing)?;
        info!(
            "Classifier ready: {} terms, default category '{}'",
            vectorizer.num_features(),
            model.default_category()
        );

        Ok(Classifier::from_fitted_parts(vectorizer, model))
    }
}
