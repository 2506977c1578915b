use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::tokenizer::Tokenizer;
use super::utils::normalize_vector;

/// Settings for term extraction and vocabulary selection.
///
/// These are persisted alongside a fitted model: a model is only reused when the
/// settings it was fitted with match the requested ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Fold input to lower case before tokenizing
    pub lowercase: bool,
    /// Inclusive range of word n-gram sizes to extract
    pub ngram_range: (usize, usize),
    /// Drop English stop words before forming n-grams
    pub stop_words: bool,
    /// Keep at most this many terms, by corpus frequency
    pub max_features: Option<usize>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            ngram_range: (1, 2),
            stop_words: true,
            max_features: Some(1000),
        }
    }
}

/// TF-IDF feature extractor with a vocabulary fixed at fit time.
///
/// Term weights are raw counts times the smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1`, and every transformed vector is L2-normalized.
/// Terms outside the vocabulary are ignored, so text made only of unknown words maps
/// to the zero vector.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    tokenizer: Tokenizer,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Array1<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and idf table from the given documents.
    pub fn fit<S: AsRef<str>>(
        config: VectorizerConfig,
        documents: &[S],
    ) -> Result<Self, ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::BuildError(
                "Cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }
        if config.max_features == Some(0) {
            return Err(ClassifierError::ValidationError(
                "max_features must be at least 1".to_string(),
            ));
        }

        let tokenizer = Tokenizer::new(&config)?;

        let mut term_frequency: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let terms = tokenizer.terms(doc.as_ref());
            let mut seen = HashSet::new();
            for term in terms {
                *term_frequency.entry(term.clone()).or_default() += 1;
                if seen.insert(term.clone()) {
                    *document_frequency.entry(term).or_default() += 1;
                }
            }
        }

        if term_frequency.is_empty() {
            return Err(ClassifierError::BuildError(
                "Corpus produced no usable terms".to_string(),
            ));
        }

        let mut selected: Vec<(String, usize)> = term_frequency.into_iter().collect();
        if let Some(limit) = config.max_features {
            if selected.len() > limit {
                selected.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                selected.truncate(limit);
            }
        }

        // Feature indices follow alphabetical term order.
        let ordered: BTreeMap<String, usize> = selected
            .into_iter()
            .map(|(term, _)| {
                let df = document_frequency[&term];
                (term, df)
            })
            .collect();

        let n = documents.len() as f64;
        let vocabulary: Vec<String> = ordered.keys().cloned().collect();
        let idf = Array1::from_iter(
            ordered
                .values()
                .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0),
        );

        debug!(
            "Fitted vectorizer on {} documents: {} terms",
            documents.len(),
            vocabulary.len()
        );

        Self::from_parts(config, vocabulary, idf.to_vec())
    }

    /// Rebuilds a vectorizer from a persisted vocabulary and idf table.
    pub fn from_parts(
        config: VectorizerConfig,
        vocabulary: Vec<String>,
        idf: Vec<f64>,
    ) -> Result<Self, ClassifierError> {
        if vocabulary.is_empty() {
            return Err(ClassifierError::InvalidModel("Vocabulary is empty".to_string()));
        }
        if vocabulary.len() != idf.len() {
            return Err(ClassifierError::InvalidModel(format!(
                "Vocabulary has {} terms but idf table has {} entries",
                vocabulary.len(),
                idf.len()
            )));
        }
        if let Some(pos) = idf.iter().position(|w| !w.is_finite() || *w <= 0.0) {
            return Err(ClassifierError::InvalidModel(format!(
                "Idf weight for term '{}' is not a positive finite number",
                vocabulary[pos]
            )));
        }

        let mut index = HashMap::with_capacity(vocabulary.len());
        for (i, term) in vocabulary.iter().enumerate() {
            if term.is_empty() {
                return Err(ClassifierError::InvalidModel(format!("Term {} is empty", i)));
            }
            if index.insert(term.clone(), i).is_some() {
                return Err(ClassifierError::InvalidModel(format!(
                    "Duplicate vocabulary term '{}'",
                    term
                )));
            }
        }

        let tokenizer = Tokenizer::new(&config)?;
        Ok(Self {
            config,
            tokenizer,
            vocabulary,
            index,
            idf: Array1::from(idf),
        })
    }

    /// Converts text into its normalized TF-IDF vector.
    pub fn transform(&self, text: &str) -> Array1<f64> {
        let mut counts = Array1::<f64>::zeros(self.vocabulary.len());
        for term in self.tokenizer.terms(text) {
            if let Some(&j) = self.index.get(&term) {
                counts[j] += 1.0;
            }
        }
        normalize_vector(&(counts * &self.idf))
    }

    /// Transforms every document into one row of a feature matrix.
    pub fn transform_all<S: AsRef<str>>(&self, documents: &[S]) -> Array2<f64> {
        let mut matrix = Array2::zeros((documents.len(), self.vocabulary.len()));
        for (i, doc) in documents.iter().enumerate() {
            matrix.row_mut(i).assign(&self.transform(doc.as_ref()));
        }
        matrix
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &Array1<f64> {
        &self.idf
    }

    pub fn num_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Feature index of a term, if it is in the vocabulary
    pub fn feature_index(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }
}
