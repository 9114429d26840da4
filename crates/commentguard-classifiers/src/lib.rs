//! CommentGuard Classifiers
//!
//! Safety classification for submitted comments.
//!
//! The classifier reports against a fixed taxonomy (harassment, hate,
//! illicit, self-harm, sexual, violence and their sub-categories). A flagged
//! result vetoes publication before any operator policy is consulted.

pub mod category;
pub mod classifier;
pub mod openai;

pub use category::Category;
pub use classifier::{Classification, SafetyClassifier};
pub use openai::OpenAiModerationClient;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::category::Category;
    pub use crate::classifier::{Classification, SafetyClassifier};
    pub use crate::openai::OpenAiModerationClient;
}
