//! Policy verdicts and reply parsing
//!
//! The evaluator is asked to answer `APPROVED` or `REJECTED: <reason>`.
//! Anything else fails closed.

use serde::{Deserialize, Serialize};

/// Reason recorded when the reply matches neither form
pub const UNCLEAR_REASON: &str = "Unclear moderation result";

const APPROVED: &str = "APPROVED";
const REJECTED: &str = "REJECTED";
const REJECTED_MARKER: &str = "REJECTED:";

/// Outcome of evaluating a comment against the active policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    /// Whether every policy allows the comment
    pub approved: bool,

    /// Rejection reason; empty when approved
    pub reason: String,
}

impl PolicyVerdict {
    /// The comment satisfies the policies
    pub fn approved() -> Self {
        Self {
            approved: true,
            reason: String::new(),
        }
    }

    /// The comment violates a policy
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: reason.into(),
        }
    }

    /// The reply could not be interpreted
    pub fn unclear() -> Self {
        Self::rejected(UNCLEAR_REASON)
    }
}

/// Parse the evaluator's single text reply.
///
/// Prefixes are matched case-insensitively at the very start of the reply;
/// leading whitespace is not skipped. The rejection reason is the text after
/// the first exact `REJECTED:` marker, trimmed; without that marker the whole
/// reply is kept as the reason.
pub fn parse_verdict(reply: &str) -> PolicyVerdict {
    if has_prefix_ignore_case(reply, APPROVED) {
        return PolicyVerdict::approved();
    }

    if has_prefix_ignore_case(reply, REJECTED) {
        let reason = match reply.find(REJECTED_MARKER) {
            Some(idx) => &reply[idx + REJECTED_MARKER.len()..],
            None => reply,
        };
        return PolicyVerdict::rejected(reason.trim());
    }

    PolicyVerdict::unclear()
}

fn has_prefix_ignore_case(reply: &str, prefix: &str) -> bool {
    reply
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}
