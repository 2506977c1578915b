//! An offline expense categorizer: TF-IDF features over a built-in corpus of expense
//! descriptions, classified with multinomial Naive Bayes.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use expense_categorizer::{CategorizationService, Category, ServiceConfig};
//!
//! let service = CategorizationService::new(ServiceConfig {
//!     persist: false,
//!     ..ServiceConfig::default()
//! });
//! service.initialize()?;
//!
//! assert_eq!(service.classify("lunch at chipotle"), Category::Food);
//! assert_eq!(service.classify("netflix subscription"), Category::Bills);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! After `initialize` the model is immutable, so the service can be shared across
//! threads using `Arc` and `classify` takes no locks:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use expense_categorizer::{CategorizationService, ServiceConfig};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let service = Arc::new(CategorizationService::new(ServiceConfig {
//!     persist: false,
//!     ..ServiceConfig::default()
//! }));
//! service.initialize()?;
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let service = Arc::clone(&service);
//!     handles.push(thread::spawn(move || {
//!         service.classify("movie tickets");
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod category;
pub mod classifier;
pub mod corpus;
pub mod model_store;
pub mod service;

pub use category::{categories, Category, ParseCategoryError};
pub use classifier::{
    ClassDefinition, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, FittedModel,
    VectorizerConfig,
};
pub use corpus::{training_corpus, TrainingExample};
pub use model_store::{ModelStore, StoreError};
pub use service::{CategorizationService, ModelSource, ServiceConfig, ServiceError, ServiceState};

pub fn init_logger() {
    env_logger::init();
}
