//! # Statistical Topic Extractors
//!
//! Extracts ranked topical keywords from a transcript. TF-IDF is the default
//! method (each sentence is treated as a separate document, so words that
//! appear everywhere get downweighted while distinctive words get boosted);
//! RAKE and TextRank are provided for the comparison endpoint.

use keyword_extraction::rake::{Rake, RakeParams};
use keyword_extraction::text_rank::{TextRank, TextRankParams};
use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};

/// Extract the top `top_n` topics from a transcript using the default
/// (TF-IDF) method.
///
/// Returns an empty list for transcripts with no scoreable content; topic
/// extraction never fails.
pub fn extract_topics(transcript: &str, top_n: usize) -> Vec<String> {
    // Each sentence is a document for IDF purposes; a transcript that is one
    // long sentence still works as a single-document corpus
    let documents = sentence_documents(transcript);
    if documents.is_empty() {
        return Vec::new();
    }

    let stop_words: Vec<String> = get(LANGUAGE::English);
    let params = TfIdfParams::UnprocessedDocuments(&documents, &stop_words, None);
    let tfidf = TfIdf::new(params);

    tfidf
        .get_ranked_word_scores(top_n)
        .into_iter()
        .map(|(word, _)| word)
        .collect()
}

/// Extract topics using RAKE (Rapid Automatic Keyword Extraction).
///
/// RAKE scores contiguous non-stop-word phrases, so it tends to surface
/// multi-word keywords where TF-IDF surfaces single terms.
pub fn extract_topics_rake(transcript: &str, top_n: usize) -> Vec<String> {
    if transcript.trim().is_empty() {
        return Vec::new();
    }

    let stop_words: Vec<String> = get(LANGUAGE::English);
    let rake = Rake::new(RakeParams::WithDefaults(transcript, &stop_words));
    rake.get_ranked_keyword(top_n)
}

/// Extract topics using TextRank (graph-based co-occurrence ranking).
pub fn extract_topics_textrank(transcript: &str, top_n: usize) -> Vec<String> {
    if transcript.trim().is_empty() {
        return Vec::new();
    }

    let stop_words: Vec<String> = get(LANGUAGE::English);
    let text_rank = TextRank::new(TextRankParams::WithDefaults(transcript, &stop_words));
    text_rank.get_ranked_words(top_n)
}

/// Split a transcript into per-sentence documents for IDF computation.
/// Sentences that trim to nothing are dropped.
fn sentence_documents(transcript: &str) -> Vec<String> {
    transcript
        .split(|c| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "We discussed the Mars mission planning. \
        The Starships will be launched next year. \
        Landing on Mars is the main challenge. \
        We need to ensure safe landing procedures.";

    #[test]
    fn test_extract_topics_respects_top_n() {
        let topics = extract_topics(TRANSCRIPT, 3);
        assert!(topics.len() <= 3);
        assert!(!topics.is_empty());
    }

    #[test]
    fn test_extract_topics_skips_stop_words() {
        let topics = extract_topics(TRANSCRIPT, 10);
        for topic in &topics {
            assert_ne!(topic.as_str(), "the");
            assert_ne!(topic.as_str(), "we");
        }
    }

    #[test]
    fn test_extract_topics_empty_transcript() {
        assert!(extract_topics("", 5).is_empty());
        assert!(extract_topics("   ", 5).is_empty());
    }

    #[test]
    fn test_rake_empty_transcript() {
        assert!(extract_topics_rake("", 5).is_empty());
    }

    #[test]
    fn test_textrank_empty_transcript() {
        assert!(extract_topics_textrank("", 5).is_empty());
    }

    #[test]
    fn test_sentence_documents_split() {
        let documents = sentence_documents("One. Two! Three? ");
        assert_eq!(documents, vec!["One", "Two", "Three"]);
    }
}
