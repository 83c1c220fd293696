use crate::stopwords::StopWordFilter;

/// Tokens at or below this many characters are never keywords.
const MIN_KEYWORD_CHARS: usize = 3;

pub struct KeywordExtractor;

impl KeywordExtractor {
    /// Lower-cased whitespace tokens longer than three characters that are not
    /// stop words, in first-seen order. Duplicates are kept.
    pub fn extract(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_KEYWORD_CHARS)
            .filter(|token| !StopWordFilter::is_stopword(token))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_filters_short_and_stop_words() {
        let keywords = KeywordExtractor::extract("They told me the Rust compiler is fast");
        assert_eq!(keywords, vec!["told", "rust", "compiler", "fast"]);
    }

    #[test]
    fn test_extract_keeps_duplicates_in_order() {
        let keywords = KeywordExtractor::extract("apple banana Apple");
        assert_eq!(keywords, vec!["apple", "banana", "apple"]);
    }

    #[test]
    fn test_extract_counts_characters_not_bytes() {
        // "été" is 3 chars (5 bytes) and must be dropped
        let keywords = KeywordExtractor::extract("été éclair");
        assert_eq!(keywords, vec!["éclair"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(KeywordExtractor::extract("").is_empty());
        assert!(KeywordExtractor::extract("   \n\t ").is_empty());
    }
}
