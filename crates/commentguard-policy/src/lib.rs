//! CommentGuard Policy Evaluation
//!
//! Website owners write moderation policies in plain language ("no
//! self-promotion", "stay on topic"). Active policies are folded into one
//! instruction and a language model judges each comment against them.
//!
//! The model must answer `APPROVED` or `REJECTED: <reason>`; any other reply
//! is treated as a rejection so that ambiguity never publishes content.

pub mod evaluator;
pub mod instruction;
pub mod openai;
pub mod verdict;

pub use evaluator::PolicyEvaluator;
pub use instruction::build_instruction;
pub use openai::OpenAiPolicyEvaluator;
pub use verdict::{parse_verdict, PolicyVerdict, UNCLEAR_REASON};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::evaluator::PolicyEvaluator;
    pub use crate::openai::OpenAiPolicyEvaluator;
    pub use crate::verdict::{parse_verdict, PolicyVerdict};
}
