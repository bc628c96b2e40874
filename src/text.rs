// Text normalization shared by entity extraction, entropy scoring, and
// export.

/// Characters removed before comparing salient terms against event text.
pub const REMOVED_CHARACTERS: &str = "!@#$%^&*()[]\"';:\\|/<>-_=+~,.";

/// Remove every character in [`REMOVED_CHARACTERS`] from `text`.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !REMOVED_CHARACTERS.contains(*c))
        .collect()
}

/// Punctuation-stripped, lowercased form used for term matching.
pub fn normalize(text: &str) -> String {
    strip_punctuation(text).to_lowercase()
}

/// Cut an event text at its last sentence-ending period that is not inside
/// parentheses, dropping the trailing source attribution.
///
/// "Floods hit the coast. (Reuters)" becomes "Floods hit the coast". Text
/// without such a period is returned unchanged.
pub fn trim_trailing_citation(text: &str) -> &str {
    let mut depth: i32 = 0;
    for (i, b) in text.bytes().enumerate().rev() {
        match b {
            b')' => depth += 1,
            b'(' => depth -= 1,
            b'.' if depth == 0 => return &text[..i],
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punctuation("U.S.-led (coalition), \"now\""), "USled coalition now");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("New York's Mayor"), "new yorks mayor");
    }

    #[test]
    fn test_trim_trailing_citation() {
        assert_eq!(
            trim_trailing_citation("Floods hit the coast. (Reuters)"),
            "Floods hit the coast"
        );
    }

    #[test]
    fn test_trim_ignores_periods_inside_parentheses() {
        assert_eq!(
            trim_trailing_citation("Talks resume. (AP News. Reuters)"),
            "Talks resume"
        );
    }

    #[test]
    fn test_trim_without_period_is_unchanged() {
        assert_eq!(trim_trailing_citation("No period here"), "No period here");
        assert_eq!(trim_trailing_citation(""), "");
    }
}
