//! System instruction built from a website's active policies

/// Build the system instruction for one evaluation.
///
/// Statements are joined one per line in the order given, which is the
/// store's creation-descending order.
pub fn build_instruction<S: AsRef<str>>(policies: &[S]) -> String {
    let guidelines = policies
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a content moderator. Review the following comment based on these moderation guidelines:\n\n{}\n\nRespond with either \"APPROVED\" or \"REJECTED: [reason]\"",
        guidelines
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_kept_in_order() {
        let instruction = build_instruction(&["No links", "Be kind"]);

        let links = instruction.find("No links").unwrap();
        let kind = instruction.find("Be kind").unwrap();
        assert!(links < kind);
        assert!(instruction.contains("No links\nBe kind"));
        assert!(instruction.ends_with("Respond with either \"APPROVED\" or \"REJECTED: [reason]\""));
    }
}
