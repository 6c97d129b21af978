// Transcription similarity scoring.
//
// The accept/retry decision uses a character-level sequence ratio over
// normalized text. The word-level mismatch list is diagnostic only.

mod matcher;
mod normalize;

pub use matcher::{matched_len, matching_blocks, MatchingBlock};
pub use normalize::normalize;

use serde::{Deserialize, Serialize};

/// One misaligned region between source and transcription.
///
/// Either side may be empty (dropped or inserted words).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMismatch {
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Sequence-similarity ratio in `[0.0, 1.0]` after normalization.
    ///
    /// `2 * matched / total` over the characters of both normalized strings.
    /// Two empty strings are vacuously identical and score 1.0.
    pub fn score(&self, original: &str, transcribed: &str) -> f64 {
        let original: Vec<char> = normalize(original).chars().collect();
        let transcribed: Vec<char> = normalize(transcribed).chars().collect();

        let total = original.len() + transcribed.len();
        if total == 0 {
            return 1.0;
        }

        let matched = matched_len(&original, &transcribed);
        (2.0 * matched as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Word regions that did not align between source and transcription.
    pub fn mismatched_words(&self, original: &str, transcribed: &str) -> Vec<WordMismatch> {
        let original = normalize(original);
        let transcribed = normalize(transcribed);
        let expected: Vec<&str> = original.split_whitespace().collect();
        let actual: Vec<&str> = transcribed.split_whitespace().collect();

        let sentinel = MatchingBlock {
            a: expected.len(),
            b: actual.len(),
            size: 0,
        };

        let mut mismatches = Vec::new();
        let (mut i, mut j) = (0, 0);

        for block in matching_blocks(&expected, &actual)
            .into_iter()
            .chain(std::iter::once(sentinel))
        {
            if i < block.a || j < block.b {
                mismatches.push(WordMismatch {
                    expected: expected[i..block.a].join(" "),
                    actual: actual[j..block.b].join(" "),
                });
            }
            i = block.a + block.size;
            j = block.b + block.size;
        }

        mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn normalization_equivalent_strings_score_one() {
        let scorer = SimilarityScorer::new();
        assert_eq!(scorer.score("Hello, World!", "hello world"), 1.0);
        assert_eq!(scorer.score("안녕하세요", "안녕하세요."), 1.0);
    }

    #[test]
    fn identical_strings_score_one() {
        let scorer = SimilarityScorer::new();
        for text in ["a", "The quick brown fox.", "   spaced   out  ", "123 go"] {
            assert_eq!(scorer.score(text, text), 1.0, "text: {text:?}");
        }
    }

    #[test]
    fn empty_inputs() {
        let scorer = SimilarityScorer::new();
        assert_eq!(scorer.score("", ""), 1.0);
        assert_eq!(scorer.score("!!!", "  "), 1.0);
        assert_eq!(scorer.score("hello", ""), 0.0);
        assert_eq!(scorer.score("", "hello"), 0.0);
    }

    #[test]
    fn disjoint_content_scores_zero() {
        let scorer = SimilarityScorer::new();
        assert_eq!(scorer.score("abc", "xyz"), 0.0);
    }

    #[test]
    fn spacing_drift_in_korean_is_penalized() {
        let scorer = SimilarityScorer::new();
        // 5 + 6 characters, 5 matched.
        let score = scorer.score("안녕하세요", "안녕 하세요");
        assert!(approx(score, 10.0 / 11.0), "score = {score}");
        assert!(score < 0.95);
    }

    #[test]
    fn order_matters() {
        let scorer = SimilarityScorer::new();
        let in_order = scorer.score("red green blue", "red green blue");
        let shuffled = scorer.score("red green blue", "blue green red");
        assert!(shuffled < in_order);
    }

    #[test]
    fn score_is_symmetric_for_simple_substitution() {
        let scorer = SimilarityScorer::new();
        let forward = scorer.score("the cat sat", "the bat sat");
        let backward = scorer.score("the bat sat", "the cat sat");
        assert!(approx(forward, backward));
        assert!(forward > 0.8 && forward < 1.0);
    }

    #[test]
    fn score_stays_in_range() {
        let scorer = SimilarityScorer::new();
        let pairs = [
            ("aaaa", "a"),
            ("a", "aaaa"),
            ("long sentence with many words", "short"),
            ("x", "x x x x x x"),
        ];
        for (a, b) in pairs {
            let score = scorer.score(a, b);
            assert!((0.0..=1.0).contains(&score), "{a:?} vs {b:?} -> {score}");
        }
    }

    #[test]
    fn mismatched_words_reports_substitutions() {
        let scorer = SimilarityScorer::new();
        let mismatches = scorer.mismatched_words("The quick brown fox.", "the quick red fox");
        assert_eq!(
            mismatches,
            vec![WordMismatch {
                expected: "brown".to_string(),
                actual: "red".to_string(),
            }]
        );
    }

    #[test]
    fn mismatched_words_reports_drops_and_insertions() {
        let scorer = SimilarityScorer::new();
        let mismatches = scorer.mismatched_words("one two three", "one three four");
        assert_eq!(
            mismatches,
            vec![
                WordMismatch {
                    expected: "two".to_string(),
                    actual: String::new(),
                },
                WordMismatch {
                    expected: String::new(),
                    actual: "four".to_string(),
                },
            ]
        );
    }

    // Deterministic word salad; long enough that an unbounded matcher
    // takes tens of seconds.
    fn word_salad(seed: u64, words: usize) -> String {
        const VOCAB: [&str; 16] = [
            "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "river",
            "stone", "morning", "light", "carries", "every", "quiet", "voice",
        ];
        let mut state = seed;
        (0..words)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                VOCAB[(state >> 33) as usize % VOCAB.len()]
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn long_passages_score_quickly() {
        let scorer = SimilarityScorer::new();
        let original = word_salad(7, 1500);
        let transcribed = word_salad(11, 1500);
        assert!(original.chars().count() > 8000);

        let started = std::time::Instant::now();
        let score = scorer.score(&original, &transcribed);
        let mismatches = scorer.mismatched_words(&original, &transcribed);
        let elapsed = started.elapsed();

        assert!((0.0..1.0).contains(&score), "score = {score}");
        assert!(!mismatches.is_empty());
        assert!(
            elapsed < std::time::Duration::from_secs(10),
            "scoring took {elapsed:?}"
        );
    }

    #[test]
    fn no_mismatches_for_equivalent_text() {
        let scorer = SimilarityScorer::new();
        assert!(scorer.mismatched_words("Hello, World!", "hello world").is_empty());
        assert!(scorer.mismatched_words("", "").is_empty());
    }
}
