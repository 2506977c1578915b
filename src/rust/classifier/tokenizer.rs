use std::collections::HashSet;

use regex::Regex;

use super::error::ClassifierError;
use super::vectorizer::VectorizerConfig;

/// Maximal runs of Unicode letters and digits. Everything else is a boundary, so
/// "Uber," and "uber" produce the same term.
const TOKEN_PATTERN: &str = r"[\p{L}\p{N}]+";

/// English function words dropped before n-grams are formed.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Splits raw descriptions into the terms the vectorizer counts.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
    lowercase: bool,
    stop_words: Option<HashSet<&'static str>>,
    ngram_range: (usize, usize),
}

impl Tokenizer {
    pub fn new(config: &VectorizerConfig) -> Result<Self, ClassifierError> {
        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::ValidationError(format!(
                "Invalid n-gram range ({}, {}): bounds must satisfy 1 <= min <= max",
                min_n, max_n
            )));
        }

        Ok(Self {
            pattern: Regex::new(TOKEN_PATTERN)?,
            lowercase: config.lowercase,
            stop_words: config
                .stop_words
                .then(|| ENGLISH_STOP_WORDS.iter().copied().collect()),
            ngram_range: config.ngram_range,
        })
    }

    /// Word tokens after case folding and stop-word removal.
    pub fn words(&self, text: &str) -> Vec<String> {
        let folded;
        let text = if self.lowercase {
            folded = text.to_lowercase();
            folded.as_str()
        } else {
            text
        };

        self.pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|word| {
                self.stop_words
                    .as_ref()
                    .map_or(true, |stop| !stop.contains(*word))
            })
            .map(str::to_string)
            .collect()
    }

    /// All terms of the text: word n-grams for every n in the configured range,
    /// shorter n-grams first.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let words = self.words(text);
        let (min_n, max_n) = self.ngram_range;

        let mut terms = Vec::new();
        for n in min_n..=max_n.min(words.len()) {
            if n == 1 {
                terms.extend(words.iter().cloned());
            } else {
                terms.extend(words.windows(n).map(|window| window.join(" ")));
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(&VectorizerConfig::default()).unwrap()
    }

    #[test]
    fn test_punctuation_insensitive() {
        let t = tokenizer();
        assert_eq!(t.words("Uber, to the AIRPORT!"), vec!["uber", "airport"]);
        assert_eq!(t.words("uber"), t.words("Uber,"));
    }

    #[test]
    fn test_bigrams_skip_stop_words() {
        let t = tokenizer();
        assert_eq!(
            t.terms("lunch at restaurant"),
            vec!["lunch", "restaurant", "lunch restaurant"]
        );
    }

    #[test]
    fn test_empty_and_punctuation_only_input() {
        let t = tokenizer();
        assert!(t.terms("").is_empty());
        assert!(t.terms("  ,.;!? ").is_empty());
        assert!(t.terms("the of and").is_empty());
    }

    #[test]
    fn test_single_word_has_no_bigram() {
        assert_eq!(tokenizer().terms("watch"), vec!["watch"]);
    }

    #[test]
    fn test_unicode_and_digits_are_kept() {
        let t = tokenizer();
        assert_eq!(t.words("Café 24/7"), vec!["café", "24", "7"]);
    }

    #[test]
    fn test_stop_words_can_be_disabled() {
        let config = VectorizerConfig {
            stop_words: false,
            ngram_range: (1, 1),
            ..VectorizerConfig::default()
        };
        let t = Tokenizer::new(&config).unwrap();
        assert_eq!(t.terms("lunch at restaurant"), vec!["lunch", "at", "restaurant"]);
    }

    #[test]
    fn test_invalid_ngram_range() {
        for range in [(0, 1), (2, 1)] {
            let config = VectorizerConfig {
                ngram_range: range,
                ..VectorizerConfig::default()
            };
            assert!(matches!(
                Tokenizer::new(&config),
                Err(ClassifierError::ValidationError(_))
            ));
        }
    }
}
