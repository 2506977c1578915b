/// Represents the different types of errors that can occur while fitting or restoring
/// the expense classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    /// Error occurred while compiling or running the tokenizer
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),
    /// Error occurred during the build (fit) phase
    #[error("Build error: {0}")]
    BuildError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Persisted model parameters are structurally inconsistent
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

impl From<regex::Error> for ClassifierError {
    fn from(err: regex::Error) -> Self {
        ClassifierError::TokenizerError(err.to_string())
    }
}
