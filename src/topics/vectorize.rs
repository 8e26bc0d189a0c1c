//! # Topic Vectorization
//!
//! Turns a topic set into a numeric vector for the compatibility scorer:
//! the topics are joined into one document and TF-IDF term scores become the
//! vector components, in ranked order.
//!
//! Short or stop-word-only input can legitimately produce an empty or
//! all-zero vector; the scorer detects that and falls back to
//! psychometric-only comparison, so no error surface is needed here.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};

/// Vectorize a topic set into TF-IDF term scores over the joined document.
///
/// The output length equals the number of distinct scoreable terms, which is
/// zero when every token is a stop word or blank.
pub fn vectorize_topics(topics: &[String]) -> Vec<f64> {
    let joined = topics.join(" ");
    if joined.trim().is_empty() {
        return Vec::new();
    }

    // Vocabulary can never exceed the whitespace token count, so ranking
    // that many terms captures every component
    let max_terms = joined.split_whitespace().count();

    let documents = vec![joined];
    let stop_words: Vec<String> = get(LANGUAGE::English);
    let params = TfIdfParams::UnprocessedDocuments(&documents, &stop_words, None);
    let tfidf = TfIdf::new(params);

    tfidf
        .get_ranked_word_scores(max_terms)
        .into_iter()
        .map(|(_, score)| score as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectorize_empty_topics() {
        assert!(vectorize_topics(&[]).is_empty());
        assert!(vectorize_topics(&["   ".to_string()]).is_empty());
    }

    #[test]
    fn test_vectorize_content_topics() {
        let topics = vec!["mars".to_string(), "rover".to_string(), "landing".to_string()];
        let vector = vectorize_topics(&topics);
        assert!(!vector.is_empty());
        assert!(vector.iter().all(|score| score.is_finite() && *score >= 0.0));
    }

    #[test]
    fn test_vectorize_is_deterministic() {
        let topics = vec!["mars".to_string(), "rover".to_string()];
        assert_eq!(vectorize_topics(&topics), vectorize_topics(&topics));
    }

    #[test]
    fn test_vectorize_stop_words_degenerates() {
        // Stop-word-only input yields no scoreable terms (or only zero
        // scores); either way there is no usable topic signal
        let topics = vec!["the".to_string(), "and".to_string(), "of".to_string()];
        let vector = vectorize_topics(&topics);
        assert!(vector.is_empty() || vector.iter().all(|score| *score == 0.0));
    }
}
