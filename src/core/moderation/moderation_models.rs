// Moderation domain models - comments, tri-state flags, classifier scores.
//
// These are pure domain types with no storage or network dependencies.
// The infra layer persists them, the console layer only ever sees the
// render policy built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Obscenity score at or above which a comment is redacted.
pub const OBSCENITY_THRESHOLD: f32 = 0.5;

/// Negativity score at or above which a comment gets the review banner.
pub const NEGATIVITY_THRESHOLD: f32 = 0.5;

/// How long the pipeline waits for a single classifier call.
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// FLAGS
// ============================================================================

/// Tri-state moderation flag.
///
/// Stored as `null` / `0` / `1`, the same shape the comment database used
/// before moderation existed, so old rows deserialize as `Unclassified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u8>", into = "Option<u8>")]
pub enum Flag {
    /// Classification has not completed (or never will).
    #[default]
    Unclassified,
    /// Classified and below the threshold.
    Clear,
    /// Classified and at or above the threshold.
    Flagged,
}

impl Flag {
    /// Map a classifier score onto a flag.
    pub fn from_score(score: f32, threshold: f32) -> Self {
        if score >= threshold {
            Flag::Flagged
        } else {
            Flag::Clear
        }
    }

    pub fn is_flagged(self) -> bool {
        self == Flag::Flagged
    }

    pub fn is_classified(self) -> bool {
        self != Flag::Unclassified
    }

    /// Database column representation.
    pub fn to_db(self) -> Option<i64> {
        Option::<u8>::from(self).map(i64::from)
    }

    pub fn from_db(value: Option<i64>) -> Self {
        match value {
            None => Flag::Unclassified,
            Some(0) => Flag::Clear,
            Some(_) => Flag::Flagged,
        }
    }
}

impl From<Option<u8>> for Flag {
    fn from(value: Option<u8>) -> Self {
        Flag::from_db(value.map(i64::from))
    }
}

impl From<Flag> for Option<u8> {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Unclassified => None,
            Flag::Clear => Some(0),
            Flag::Flagged => Some(1),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Unclassified => write!(f, "unclassified"),
            Flag::Clear => write!(f, "clear"),
            Flag::Flagged => write!(f, "flagged"),
        }
    }
}

// ============================================================================
// COMMENTS
// ============================================================================

/// A stored comment. Only the two flags ever change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub obscene: Flag,
    #[serde(default)]
    pub negative: Flag,
}

impl Comment {
    /// True once both axes have been resolved.
    pub fn is_classified(&self) -> bool {
        self.obscene.is_classified() && self.negative.is_classified()
    }
}

/// Input to `CommentStore::create`. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: u64,
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Partial flag update applied by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagUpdate {
    pub obscene: Option<Flag>,
    pub negative: Option<Flag>,
}

impl FlagUpdate {
    /// Apply to a comment, write-once: an axis that is already classified
    /// keeps its value, and `Unclassified` never overwrites anything.
    pub fn apply_to(&self, comment: &mut Comment) {
        if let Some(flag) = self.obscene {
            if !comment.obscene.is_classified() {
                comment.obscene = flag;
            }
        }
        if let Some(flag) = self.negative {
            if !comment.negative.is_classified() {
                comment.negative = flag;
            }
        }
    }
}

// ============================================================================
// CLASSIFIER OUTPUT
// ============================================================================

/// Raw scores returned by a classifier, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierScores {
    pub obscenity: f32,
    pub negativity: f32,
}

impl ClassifierScores {
    pub fn new(obscenity: f32, negativity: f32) -> Self {
        Self {
            obscenity: obscenity.clamp(0.0, 1.0),
            negativity: negativity.clamp(0.0, 1.0),
        }
    }
}

/// Pipeline tuning. There is one global policy, not one per feed.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub obscenity_threshold: f32,
    pub negativity_threshold: f32,
    pub classify_timeout: Duration,
}

impl ModerationConfig {
    /// Turn classifier scores into the flag update the store should apply.
    pub fn flags_for(&self, scores: &ClassifierScores) -> FlagUpdate {
        FlagUpdate {
            obscene: Some(Flag::from_score(
                scores.obscenity,
                self.obscenity_threshold,
            )),
            negative: Some(Flag::from_score(
                scores.negativity,
                self.negativity_threshold,
            )),
        }
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            obscenity_threshold: OBSCENITY_THRESHOLD,
            negativity_threshold: NEGATIVITY_THRESHOLD,
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }
}

// ============================================================================
// PRESENTATION
// ============================================================================

/// What the presenter is allowed to know about a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPolicy {
    pub display_text: String,
    pub show_review_banner: bool,
}
