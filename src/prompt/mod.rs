//! Review prompt assembly.
//!
//! A grounded prompt is the base instruction, the style guide passages most
//! relevant to the change, and the diff, in that order.

use thiserror::Error;

/// Heading for the style guide section.
const GUIDE_HEADING: &str = "## Style Guide";

/// Heading for the diff section.
const CODE_HEADING: &str = "## Code to Review";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptError {
    #[error("no style guide passages available to ground the review")]
    InsufficientContext,
}

/// Build a prompt grounded in `passages`.
///
/// Passages appear in the order given, separated by blank lines. Fails with
/// [`PromptError::InsufficientContext`] when `passages` is empty; use
/// [`build_ungrounded_prompt`] to review without a guide on purpose.
pub fn build_review_prompt<S: AsRef<str>>(
    base: &str,
    passages: &[S],
    diff: &str,
) -> Result<String, PromptError> {
    if passages.is_empty() {
        return Err(PromptError::InsufficientContext);
    }

    let guide = passages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(format!(
        "{base}\n\n{GUIDE_HEADING}\n\n{guide}\n\n{CODE_HEADING}\n\n```diff\n{diff}\n```\n"
    ))
}

/// Build a prompt with no style guide section.
pub fn build_ungrounded_prompt(base: &str, diff: &str) -> String {
    format!(
        "{base}\n\nNo style guide excerpts are available; review against general best practices.\n\n\
         {CODE_HEADING}\n\n```diff\n{diff}\n```\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_appear_in_order() {
        let prompt = build_review_prompt("Review this", &["A", "B", "C"], "diff-text").unwrap();

        let positions: Vec<usize> = ["Review this", "A", "B", "C", "diff-text"]
            .iter()
            .map(|needle| prompt.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{prompt}");
        assert!(prompt.starts_with("Review this"));
    }

    #[test]
    fn passages_are_blank_line_separated() {
        let prompt = build_review_prompt("base", &["first rule", "second rule"], "d").unwrap();
        assert!(prompt.contains("first rule\n\nsecond rule"));
    }

    #[test]
    fn sections_are_labeled() {
        let prompt = build_review_prompt("base", &["rule"], "+fn main() {}").unwrap();
        let guide = prompt.find(GUIDE_HEADING).unwrap();
        let code = prompt.find(CODE_HEADING).unwrap();
        assert!(guide < prompt.find("rule").unwrap());
        assert!(code < prompt.find("+fn main() {}").unwrap());
        assert!(guide < code);
    }

    #[test]
    fn empty_passages_are_rejected() {
        let passages: [&str; 0] = [];
        assert_eq!(
            build_review_prompt("base", &passages, "diff"),
            Err(PromptError::InsufficientContext)
        );
    }

    #[test]
    fn accepts_owned_strings() {
        let passages = vec!["rule one".to_string()];
        assert!(build_review_prompt("base", &passages, "diff").is_ok());
    }

    #[test]
    fn ungrounded_prompt_has_no_guide_section() {
        let prompt = build_ungrounded_prompt("base", "diff-text");
        assert!(!prompt.contains(GUIDE_HEADING));
        assert!(prompt.contains("diff-text"));
        assert!(prompt.starts_with("base"));
    }
}
