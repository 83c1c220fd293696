use once_cell::sync::Lazy;
use std::collections::HashSet;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "is", "are", "was", "were", "be", "been", "to",
        "in", "on", "at", "of", "for", "with", "from", "into", "about", "you", "your", "i", "me",
        "my", "we", "our", "they", "them", "their", "there", "this", "that", "these", "those",
        "what", "which", "when", "where", "have", "has", "had", "will", "would", "could",
        "should", "can", "just", "also", "than", "then", "some", "very",
    ]
    .into_iter()
    .collect()
});

/// Fixed English function-word list.
pub struct StopWordFilter;

impl StopWordFilter {
    pub fn is_stopword(token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        if STOP_WORDS.contains(token) {
            return true;
        }
        STOP_WORDS.contains(token.to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert!(StopWordFilter::is_stopword("the"));
        assert!(StopWordFilter::is_stopword("The"));
        assert!(StopWordFilter::is_stopword("THEY"));
    }

    #[test]
    fn test_exact_match_only() {
        assert!(!StopWordFilter::is_stopword("theory"));
        assert!(!StopWordFilter::is_stopword("they,"));
        assert!(!StopWordFilter::is_stopword(""));
        assert!(!StopWordFilter::is_stopword("rust"));
    }
}
