//! # Extractive Summarization
//!
//! Produces a single-sentence summary of a conversational transcript by
//! scoring cleaned sentence candidates on weighted criteria and selecting
//! the best one. The summarizer never fails: every input, including the
//! empty string, resolves to a defined output, falling back to echoing the
//! transcript when there is not enough structure to summarize.
//!
//! ## Scoring criteria:
//! - **Topic relevance** (0.4): fraction of supplied topics present
//! - **Content density** (0.2): word count saturating at 50 words
//! - **Position**: banded by relative index (intro/conclusion/main body)
//! - **Question or future-orientation bonus** (+0.1, mutually exclusive)
//! - **Length penalty**: too short (−0.1) or too long (−0.05)
//! - **Incompleteness penalty** (−0.1): trailing dangling connective

use regex_lite::Regex;
use std::sync::OnceLock;

/// Segments at or below this many characters are discarded at split time.
const MIN_RAW_SEGMENT_CHARS: usize = 10;

/// Cleaned segments at or below this many characters are discarded.
const MIN_CLEANED_SEGMENT_CHARS: usize = 15;

/// Conversational filler tokens removed before scoring (whole words,
/// case-insensitive).
const FILLER_PATTERN: &str = r"(?i)\b(yeah|uh|um|like|you know|so|well)\b";

/// Keywords marking forward-looking statements.
const FUTURE_KEYWORDS: [&str; 5] = ["plan", "next", "future", "will", "going to"];

/// Trailing words that indicate an incomplete thought (checked
/// case-sensitively on the cleaned segment).
const DANGLING_CONNECTIVES: [&str; 5] = ["and", "but", "so", "because", "the"];

/// A cleaned sentence candidate: its text, position among the cleaned
/// segments, and derived score. Discarded once the best candidate is chosen.
#[derive(Debug)]
struct SentenceCandidate {
    text: String,
    index: usize,
    score: f64,
}

fn filler_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FILLER_PATTERN).expect("filler pattern is valid"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Generate a single-sentence extractive summary guided by the supplied
/// topics.
///
/// Transcripts with two or fewer usable sentences (before or after filler
/// cleaning) are returned verbatim — that is an early exit, not a failure.
pub fn generate_summary(transcript: &str, topics: &[String]) -> String {
    // Split on runs of sentence-terminal punctuation and drop fragments
    let sentences: Vec<&str> = transcript
        .split(|c| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_RAW_SEGMENT_CHARS)
        .collect();

    if sentences.len() <= 2 {
        return transcript.to_string();
    }

    // Strip fillers and re-collapse whitespace; keep only substantial results
    let cleaned: Vec<String> = sentences
        .iter()
        .map(|sentence| {
            let without_fillers = filler_regex().replace_all(sentence, "");
            whitespace_regex()
                .replace_all(&without_fillers, " ")
                .trim()
                .to_string()
        })
        .filter(|sentence| sentence.chars().count() > MIN_CLEANED_SEGMENT_CHARS)
        .collect();

    if cleaned.len() <= 2 {
        return transcript.to_string();
    }

    let total = cleaned.len() as f64;
    let mut candidates: Vec<SentenceCandidate> = cleaned
        .iter()
        .enumerate()
        .map(|(index, sentence)| SentenceCandidate {
            score: score_sentence(sentence, index, total, topics),
            text: sentence.clone(),
            index,
        })
        .collect();

    // Stable sort: equal scores keep encounter order, so ties resolve to the
    // earlier candidate
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    match candidates.first() {
        Some(best) => {
            tracing::debug!(
                "Selected sentence {} of {} as summary (score {:.3})",
                best.index + 1,
                cleaned.len(),
                best.score
            );
            format_summary(&best.text)
        }
        None => transcript.to_string(),
    }
}

/// Score one cleaned sentence on the weighted criteria. Position math runs
/// over the cleaned segment list, and the bands are evaluated in a fixed
/// first-match order.
fn score_sentence(sentence: &str, index: usize, total: f64, topics: &[String]) -> f64 {
    let lower = sentence.to_lowercase();

    // 1. Topic relevance: fraction of the topic set present as a substring
    let topic_score = if topics.is_empty() {
        0.0
    } else {
        let matches = topics
            .iter()
            .filter(|topic| lower.contains(&topic.to_lowercase()))
            .count();
        (matches as f64 / topics.len() as f64) * 0.4
    };

    // 2. Content density, saturating at 50 words
    let word_count = sentence.split_whitespace().count();
    let content_density = (word_count as f64 / 50.0).min(1.0) * 0.2;

    // 3. Position band, first match wins
    let position = index as f64;
    let position_score = if position < total * 0.1 {
        0.15 // introduction
    } else if position > total * 0.8 {
        0.15 // conclusion
    } else if position >= total * 0.3 && position <= total * 0.7 {
        0.25 // main discussion
    } else {
        0.1
    };

    // 4. Question bonus takes priority over the future-orientation bonus
    let conversational_bonus = if sentence.contains('?') {
        0.1
    } else if FUTURE_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        0.1
    } else {
        0.0
    };

    // 5. Length penalty for fragments and run-ons
    let char_count = sentence.chars().count();
    let length_penalty = if char_count < 30 {
        0.1
    } else if char_count > 300 {
        0.05
    } else {
        0.0
    };

    // 6. Incomplete-thought penalty
    let incomplete_penalty = if DANGLING_CONNECTIVES
        .iter()
        .any(|connective| sentence.ends_with(connective))
    {
        0.1
    } else {
        0.0
    };

    topic_score + content_density + position_score + conversational_bonus
        - length_penalty
        - incomplete_penalty
}

/// Collapse whitespace in the winning sentence and ensure terminal
/// punctuation.
fn format_summary(sentence: &str) -> String {
    let mut summary = whitespace_regex()
        .replace_all(sentence, " ")
        .trim()
        .to_string();

    if !summary.ends_with(['.', '!', '?']) {
        summary.push('.');
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const MARS_TRANSCRIPT: &str = "We discussed the Mars mission planning. \
        The Starships will be launched next year. \
        Landing on Mars is the main challenge. \
        We need to ensure safe landing procedures.";

    #[test]
    fn test_empty_transcript_echoes() {
        assert_eq!(generate_summary("", &[]), "");
    }

    #[test]
    fn test_short_transcript_is_returned_verbatim() {
        assert_eq!(
            generate_summary("Short text.", &topics(&["test"])),
            "Short text."
        );
    }

    #[test]
    fn test_two_sentences_are_returned_verbatim() {
        let transcript = "This is the first sentence here. This is the second sentence here.";
        assert_eq!(generate_summary(transcript, &[]), transcript);
    }

    #[test]
    fn test_summary_contains_a_topic() {
        let summary = generate_summary(MARS_TRANSCRIPT, &topics(&["mars", "starships", "landing"]));
        let lower = summary.to_lowercase();
        assert!(
            lower.contains("mars") || lower.contains("starships") || lower.contains("landing"),
            "summary should mention a topic: {summary}"
        );
    }

    #[test]
    fn test_summary_is_not_longer_than_transcript() {
        let summary = generate_summary(MARS_TRANSCRIPT, &topics(&["mars"]));
        assert!(summary.len() <= MARS_TRANSCRIPT.len());
    }

    #[test]
    fn test_summary_ends_with_terminal_punctuation() {
        let summary = generate_summary(MARS_TRANSCRIPT, &topics(&["mars"]));
        assert!(summary.ends_with(['.', '!', '?']));
    }

    #[test]
    fn test_topic_relevance_drives_selection() {
        // The landing sentence matches two of three topics and sits in the
        // middle band; it should win
        let summary = generate_summary(MARS_TRANSCRIPT, &topics(&["mars", "starships", "landing"]));
        assert_eq!(summary, "Landing on Mars is the main challenge.");
    }

    #[test]
    fn test_fillers_are_stripped_from_the_winner() {
        let transcript = "Yeah so we should talk about the database migration strategy. \
            Um the current schema cannot handle the new reporting workload at all. \
            You know the migration must finish before the next quarterly release. \
            Well that gives the team roughly nine weeks of runway.";
        let summary = generate_summary(transcript, &topics(&["migration"]));
        let lower = summary.to_lowercase();
        assert!(!lower.contains("yeah"));
        assert!(!lower.contains(" um "));
        assert!(!lower.contains("you know"));
    }

    #[test]
    fn test_dangling_connective_is_penalized() {
        let base = 10.0;
        let complete = score_sentence("The launch window opens in March", 1, base, &[]);
        let dangling = score_sentence("The launch window opens in March and", 1, base, &[]);
        assert!(complete > dangling);
    }

    #[test]
    fn test_question_bonus_beats_future_bonus_once() {
        // A segment with both a question mark and a future keyword gets only
        // the single question bonus
        let with_both = score_sentence("Will the launch happen next year?", 1, 10.0, &[]);
        let with_future = score_sentence("Will the launch happen next year", 1, 10.0, &[]);
        assert!((with_both - with_future).abs() < 1e-12);
    }

    #[test]
    fn test_position_bands_first_match_order() {
        // index 0 of 10 is in the first 10% band even though other
        // conditions could also apply at small counts
        let intro = score_sentence("An ordinary sentence about nothing much", 0, 10.0, &[]);
        let body = score_sentence("An ordinary sentence about nothing much", 5, 10.0, &[]);
        let gap = body - intro;
        assert!((gap - 0.1).abs() < 1e-12, "expected 0.25 vs 0.15 bands, gap {gap}");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let transcript = "The   first    topic covered deployment pipelines today. \
            The team   agreed to automate the release checklist fully. \
            Someone raised    concerns about rollback procedures in production. \
            Everyone committed to review the runbook next sprint.";
        let summary = generate_summary(transcript, &[]);
        assert!(!summary.contains("  "), "summary still has runs of spaces: {summary}");
    }
}
