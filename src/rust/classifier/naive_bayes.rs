use log::debug;
use ndarray::{Array1, Array2, Axis};

use super::error::ClassifierError;
use super::utils::softmax;
use crate::category::Category;

/// Default additive smoothing (Laplace).
pub const DEFAULT_SMOOTHING: f64 = 1.0;

/// Multinomial Naive Bayes over non-negative feature vectors.
///
/// Rows of both tables follow [`Category::ALL`]. A value of this type only exists
/// once fitted or restored from validated parameters, so there is no untrained state
/// to predict from.
#[derive(Debug, Clone)]
pub struct NaiveBayes {
    alpha: f64,
    class_log_prior: Array1<f64>,
    /// Shape `(categories, features)`
    feature_log_prob: Array2<f64>,
}

pub(crate) fn validate_smoothing(alpha: f64) -> Result<(), ClassifierError> {
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(ClassifierError::ValidationError(format!(
            "Smoothing factor must be a positive finite number, got {}",
            alpha
        )));
    }
    Ok(())
}

impl NaiveBayes {
    /// Estimates priors and smoothed per-class feature likelihoods.
    ///
    /// `features` has one row per training example; `labels[i]` labels row `i`.
    /// Every category must have at least one example.
    pub fn fit(
        features: &Array2<f64>,
        labels: &[Category],
        alpha: f64,
    ) -> Result<Self, ClassifierError> {
        validate_smoothing(alpha)?;
        if features.nrows() != labels.len() {
            return Err(ClassifierError::BuildError(format!(
                "Got {} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        if features.ncols() == 0 {
            return Err(ClassifierError::BuildError("Feature space is empty".to_string()));
        }

        let n_features = features.ncols();
        let mut class_count = Array1::<f64>::zeros(Category::COUNT);
        let mut feature_count = Array2::<f64>::zeros((Category::COUNT, n_features));
        for (row, label) in features.axis_iter(Axis(0)).zip(labels) {
            let c = label.index();
            class_count[c] += 1.0;
            let mut counts = feature_count.row_mut(c);
            counts += &row;
        }

        if let Some(missing) = Category::ALL.iter().find(|c| class_count[c.index()] == 0.0) {
            return Err(ClassifierError::BuildError(format!(
                "Category '{}' has no training examples",
                missing
            )));
        }

        let total = labels.len() as f64;
        let class_log_prior = class_count.mapv(|count| (count / total).ln());

        let smoothed = feature_count + alpha;
        let row_totals = smoothed.sum_axis(Axis(1));
        let mut feature_log_prob = smoothed.mapv(f64::ln);
        for (mut row, total) in feature_log_prob.axis_iter_mut(Axis(0)).zip(row_totals.iter()) {
            let log_total = total.ln();
            row.mapv_inplace(|x| x - log_total);
        }

        debug!(
            "Fitted naive bayes: {} examples, {} features, alpha {}",
            labels.len(),
            n_features,
            alpha
        );

        Ok(Self {
            alpha,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Rebuilds a model from persisted parameters, rejecting inconsistent shapes.
    pub fn from_parts(
        alpha: f64,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
        n_features: usize,
    ) -> Result<Self, ClassifierError> {
        validate_smoothing(alpha).map_err(|e| ClassifierError::InvalidModel(e.to_string()))?;
        if class_log_prior.len() != Category::COUNT {
            return Err(ClassifierError::InvalidModel(format!(
                "Expected {} class priors, found {}",
                Category::COUNT,
                class_log_prior.len()
            )));
        }
        if feature_log_prob.len() != Category::COUNT {
            return Err(ClassifierError::InvalidModel(format!(
                "Expected {} likelihood rows, found {}",
                Category::COUNT,
                feature_log_prob.len()
            )));
        }
        if let Some((c, row)) = feature_log_prob
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(ClassifierError::InvalidModel(format!(
                "Likelihood row for '{}' has {} entries, expected {}",
                Category::ALL[c],
                row.len(),
                n_features
            )));
        }

        let all_finite = class_log_prior
            .iter()
            .chain(feature_log_prob.iter().flatten())
            .all(|x| x.is_finite() && *x <= 0.0);
        if !all_finite {
            return Err(ClassifierError::InvalidModel(
                "Log probabilities must be finite and non-positive".to_string(),
            ));
        }

        let flat: Vec<f64> = feature_log_prob.into_iter().flatten().collect();
        let feature_log_prob = Array2::from_shape_vec((Category::COUNT, n_features), flat)
            .map_err(|e| ClassifierError::InvalidModel(e.to_string()))?;

        Ok(Self {
            alpha,
            class_log_prior: Array1::from(class_log_prior),
            feature_log_prob,
        })
    }

    /// Per-category `log P(c) + sum_j x_j * log P(j | c)`.
    pub fn joint_log_likelihood(&self, features: &Array1<f64>) -> Array1<f64> {
        self.feature_log_prob.dot(features) + &self.class_log_prior
    }

    /// Highest scoring category; exact ties go to the category declared first.
    pub fn predict(&self, features: &Array1<f64>) -> Category {
        let scores = self.joint_log_likelihood(features);
        let mut best = 0;
        for (c, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = c;
            }
        }
        Category::ALL[best]
    }

    /// Posterior probability of each category, in category order.
    pub fn predict_proba(&self, features: &Array1<f64>) -> Array1<f64> {
        softmax(&self.joint_log_likelihood(features))
    }

    /// The category with the highest prior, which is what an all-zero vector predicts.
    pub fn default_category(&self) -> Category {
        self.predict(&Array1::zeros(self.num_features()))
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn class_log_prior(&self) -> &Array1<f64> {
        &self.class_log_prior
    }

    pub fn feature_log_prob(&self) -> &Array2<f64> {
        &self.feature_log_prob
    }

    pub fn num_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }
}
