// Offline word-list classifier, used when no CLASSIFIER_URL is configured.
//
// Obscenity: 1.0 if any profanity-list word appears as a token, else 0.0.
// Negativity: text is split into chunks of at most CHUNK_WORDS words; a
// chunk counts as negative when it has more negative than positive hits.
// The score is 1.0 when negative chunks outnumber the rest, else 0.0, so a
// tie is never flagged.

use crate::core::moderation::{Classifier, ClassifierError, ClassifierScores};
use async_trait::async_trait;
use std::collections::HashSet;

/// Longest chunk the sentiment pass looks at in one go.
pub const CHUNK_WORDS: usize = 512;

const PROFANITY: &[&str] = &[
    "arse", "arsehole", "asshole", "bastard", "bitch", "bollocks", "bullshit", "crap", "cunt",
    "damn", "dick", "dickhead", "dumbass", "fuck", "fucked", "fucker", "fucking", "goddamn",
    "jackass", "motherfucker", "piss", "pissed", "prick", "shit", "shitty", "slut", "twat",
    "wanker", "whore",
];

const NEGATIVE: &[&str] = &[
    "angry", "annoying", "awful", "bad", "boring", "broken", "disappointed", "disappointing",
    "disgusting", "dislike", "dreadful", "garbage", "hate", "hated", "hideous", "horrible",
    "lame", "mediocre", "pathetic", "poor", "ridiculous", "sad", "stupid", "sucks", "terrible",
    "trash", "ugly", "useless", "waste", "worse", "worst", "wrong",
];

const POSITIVE: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "breathtaking", "brilliant", "cool", "excellent",
    "fantastic", "fascinating", "good", "great", "happy", "incredible", "inspiring", "like",
    "love", "lovely", "nice", "perfect", "stunning", "thanks", "wonderful",
];

pub struct LexiconClassifier {
    profanity: HashSet<String>,
    negative: HashSet<String>,
    positive: HashSet<String>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        let to_set =
            |words: &[&str]| -> HashSet<String> { words.iter().map(|w| w.to_string()).collect() };
        Self {
            profanity: to_set(PROFANITY),
            negative: to_set(NEGATIVE),
            positive: to_set(POSITIVE),
        }
    }

    /// Add extra words to the profanity list.
    pub fn with_profanity<I, W>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        self.profanity
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Lowercased word tokens, punctuation stripped (apostrophes kept).
    fn tokenize(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric() || *c == '\'')
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|word| !word.is_empty())
            .collect()
    }

    fn is_negative_chunk(&self, chunk: &[String]) -> bool {
        let negative = chunk.iter().filter(|w| self.negative.contains(*w)).count();
        let positive = chunk.iter().filter(|w| self.positive.contains(*w)).count();
        negative > positive
    }

    pub fn score(&self, text: &str) -> ClassifierScores {
        let tokens = Self::tokenize(text);

        let obscenity = if tokens.iter().any(|w| self.profanity.contains(w)) {
            1.0
        } else {
            0.0
        };

        let chunks: Vec<&[String]> = tokens.chunks(CHUNK_WORDS).collect();
        let negative_chunks = chunks
            .iter()
            .filter(|chunk| self.is_negative_chunk(chunk))
            .count();
        let negativity = if negative_chunks > chunks.len() - negative_chunks {
            1.0
        } else {
            0.0
        };

        ClassifierScores::new(obscenity, negativity)
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierScores, ClassifierError> {
        Ok(self.score(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{Flag, ModerationConfig};

    #[test]
    fn test_positive_comment_scores_low() {
        let scores = LexiconClassifier::new().score("This is great!");
        assert_eq!(scores, ClassifierScores::new(0.0, 0.0));
    }

    #[test]
    fn test_profanity_ignores_case_and_punctuation() {
        let scores = LexiconClassifier::new().score("Well, SHIT... that happened");
        assert_eq!(scores.obscenity, 1.0);
        assert_eq!(scores.negativity, 0.0);
    }

    #[test]
    fn test_profanity_needs_whole_word() {
        // "class" and "assessment" contain listed substrings
        let scores = LexiconClassifier::new().score("The class assessment was scunthorpe-level");
        assert_eq!(scores.obscenity, 0.0);
    }

    #[test]
    fn test_negative_comment_maps_to_banner() {
        let scores = LexiconClassifier::new().score("I hate this");
        let flags = ModerationConfig::default().flags_for(&scores);
        assert_eq!(flags.obscene, Some(Flag::Clear));
        assert_eq!(flags.negative, Some(Flag::Flagged));
    }

    #[test]
    fn test_mixed_sentiment_is_not_negative() {
        let scores = LexiconClassifier::new().score("bad lighting but a great view");
        assert_eq!(scores.negativity, 0.0);
    }

    #[test]
    fn test_chunk_tie_is_not_negative() {
        let negative_chunk = vec!["terrible"; CHUNK_WORDS].join(" ");
        let positive_chunk = vec!["great"; CHUNK_WORDS].join(" ");
        let text = format!("{} {}", negative_chunk, positive_chunk);

        let scores = LexiconClassifier::new().score(&text);
        assert_eq!(scores.negativity, 0.0);
        let flags = ModerationConfig::default().flags_for(&scores);
        assert_eq!(flags.negative, Some(Flag::Clear));
    }

    #[test]
    fn test_negative_chunk_majority_is_flagged() {
        let negative_chunk = vec!["terrible"; CHUNK_WORDS].join(" ");
        let neutral_chunk = vec!["trail"; CHUNK_WORDS].join(" ");
        let text = format!("{} {} {}", negative_chunk, negative_chunk, neutral_chunk);

        let scores = LexiconClassifier::new().score(&text);
        assert_eq!(scores.negativity, 1.0);
        let flags = ModerationConfig::default().flags_for(&scores);
        assert_eq!(flags.negative, Some(Flag::Flagged));
    }

    #[test]
    fn test_extra_profanity_words() {
        let classifier = LexiconClassifier::new().with_profanity(["Frak"]);
        assert_eq!(classifier.score("frak this").obscenity, 1.0);
    }

    #[tokio::test]
    async fn test_classify_never_fails() {
        let scores = LexiconClassifier::new().classify("").await.unwrap();
        assert_eq!(scores, ClassifierScores::new(0.0, 0.0));
    }
}
