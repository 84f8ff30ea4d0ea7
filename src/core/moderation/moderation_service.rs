// Comment moderation pipeline - core business logic.
//
// This service handles:
// - Validating and storing newly submitted comments (unflagged)
// - One asynchronous classification per comment
// - Mapping classifier scores onto write-once obscene/negative flags
//
// Classification is best-effort. A failed or slow classifier leaves the
// comment unclassified, which the presenter treats the same as clear.
//
// NO storage or HTTP dependencies here - just ports and domain logic.

use super::moderation_models::{
    ClassifierScores, Comment, FlagUpdate, ModerationConfig, NewComment,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("Storage write failed: {0}")]
    StoreWrite(String),

    #[error("Storage read failed: {0}")]
    StoreRead(String),

    #[error("Comment {0} not found")]
    NotFound(u64),
}

/// Errors raised by classifier adapters.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Classifier returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed classifier response: {0}")]
    Malformed(String),
}

impl From<ClassifierError> for ModerationError {
    fn from(err: ClassifierError) -> Self {
        ModerationError::ClassifierUnavailable(err.to_string())
    }
}

// ============================================================================
// PORTS
// ============================================================================

/// Durable comment list keyed by post.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Append a new, unflagged comment and return it with its assigned id.
    async fn create(&self, comment: NewComment) -> Result<Comment, ModerationError>;

    /// Apply a flag update to an existing comment. Implementations must keep
    /// flags write-once (see `FlagUpdate::apply_to`) and must never touch
    /// content, author or timestamp.
    async fn update_flags(&self, id: u64, update: FlagUpdate) -> Result<Comment, ModerationError>;

    /// Fetch a single comment.
    async fn get(&self, id: u64) -> Result<Option<Comment>, ModerationError>;

    /// All comments for a post, in insertion order.
    async fn list_by_post(&self, post_id: u64) -> Result<Vec<Comment>, ModerationError>;
}

// Lets main pick the store at runtime (SQLite or in-memory).
#[async_trait]
impl CommentStore for Box<dyn CommentStore> {
    async fn create(&self, comment: NewComment) -> Result<Comment, ModerationError> {
        (**self).create(comment).await
    }

    async fn update_flags(&self, id: u64, update: FlagUpdate) -> Result<Comment, ModerationError> {
        (**self).update_flags(id, update).await
    }

    async fn get(&self, id: u64) -> Result<Option<Comment>, ModerationError> {
        (**self).get(id).await
    }

    async fn list_by_post(&self, post_id: u64) -> Result<Vec<Comment>, ModerationError> {
        (**self).list_by_post(post_id).await
    }
}

/// Opaque scoring service.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierScores, ClassifierError>;
}

#[async_trait]
impl Classifier for Box<dyn Classifier> {
    async fn classify(&self, text: &str) -> Result<ClassifierScores, ClassifierError> {
        (**self).classify(text).await
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// How a single classification attempt ended.
#[derive(Debug)]
pub enum ClassificationOutcome {
    /// Flags were written; holds the comment as stored afterwards.
    Resolved(Comment),
    /// Classifier failed or timed out. The comment stays unclassified.
    Unclassified(ModerationError),
    /// Scores came back but the store rejected the update. Not retried.
    UpdateFailed(ModerationError),
}

// ============================================================================
// PURE LOGIC
// ============================================================================

/// Reject blank submissions before anything touches the store.
pub fn validate_comment_text(text: &str) -> Result<(), ModerationError> {
    if text.trim().is_empty() {
        return Err(ModerationError::Validation(
            "Comment content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Map classifier output onto a comment's flags.
///
/// Idempotent: flags are only filled while unclassified, and the mapping
/// from scores to flags is a pure threshold check.
pub fn resolve_flags(
    comment: &Comment,
    scores: &ClassifierScores,
    config: &ModerationConfig,
) -> Comment {
    let mut resolved = comment.clone();
    config.flags_for(scores).apply_to(&mut resolved);
    resolved
}

/// Run one classification for `comment` and persist the result.
async fn classify_and_store<S, C>(
    store: &S,
    classifier: &C,
    config: &ModerationConfig,
    comment: &Comment,
) -> ClassificationOutcome
where
    S: CommentStore + ?Sized,
    C: Classifier + ?Sized,
{
    let scores = match tokio::time::timeout(
        config.classify_timeout,
        classifier.classify(&comment.content),
    )
    .await
    {
        Ok(Ok(scores)) => scores,
        Ok(Err(e)) => {
            tracing::warn!(
                comment_id = comment.id,
                "Classifier failed, comment left unclassified: {}",
                e
            );
            return ClassificationOutcome::Unclassified(e.into());
        }
        Err(_) => {
            tracing::warn!(
                comment_id = comment.id,
                timeout_ms = config.classify_timeout.as_millis() as u64,
                "Classifier timed out, comment left unclassified"
            );
            return ClassificationOutcome::Unclassified(ModerationError::ClassifierUnavailable(
                format!("timed out after {:?}", config.classify_timeout),
            ));
        }
    };

    let resolved = resolve_flags(comment, &scores, config);
    let update = FlagUpdate {
        obscene: Some(resolved.obscene),
        negative: Some(resolved.negative),
    };
    match store.update_flags(comment.id, update).await {
        Ok(updated) => {
            tracing::info!(
                comment_id = updated.id,
                post_id = updated.post_id,
                obscene = %updated.obscene,
                negative = %updated.negative,
                "Comment classified"
            );
            ClassificationOutcome::Resolved(updated)
        }
        Err(e) => {
            tracing::error!(
                comment_id = comment.id,
                "Failed to persist moderation flags: {}",
                e
            );
            ClassificationOutcome::UpdateFailed(e)
        }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Moderation pipeline for user-submitted comments.
///
/// The store and classifier are held in `Arc`s so each classification can
/// run as its own detached task.
pub struct ModerationService<S: CommentStore, C: Classifier> {
    store: Arc<S>,
    classifier: Arc<C>,
    config: ModerationConfig,
    /// Comment ids that already had their one classification attempt
    /// (finished or still running) in this process.
    attempted: DashSet<u64>,
}

impl<S, C> ModerationService<S, C>
where
    S: CommentStore + 'static,
    C: Classifier + 'static,
{
    /// Create a pipeline with the default thresholds and timeout.
    pub fn new(store: S, classifier: C) -> Self {
        Self::with_config(store, classifier, ModerationConfig::default())
    }

    pub fn with_config(store: S, classifier: C, config: ModerationConfig) -> Self {
        Self {
            store: Arc::new(store),
            classifier: Arc::new(classifier),
            config,
            attempted: DashSet::new(),
        }
    }

    /// Shared handle to the comment store, for readers like the feed.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Submit a comment.
    ///
    /// Returns as soon as the unflagged comment is stored. Flags are resolved
    /// later by a background task; callers must not expect them here.
    ///
    /// # Errors
    /// - `Validation` for blank text (nothing is stored or classified)
    /// - `StoreWrite` if the initial insert fails
    pub async fn submit_comment(
        &self,
        post_id: u64,
        author: &str,
        text: &str,
    ) -> Result<Comment, ModerationError> {
        let (comment, _classification) = self.submit_comment_tracked(post_id, author, text).await?;
        Ok(comment)
    }

    /// Like [`submit_comment`](Self::submit_comment), but also hands back the
    /// classification task so the caller can wait on it.
    pub async fn submit_comment_tracked(
        &self,
        post_id: u64,
        author: &str,
        text: &str,
    ) -> Result<(Comment, JoinHandle<ClassificationOutcome>), ModerationError> {
        validate_comment_text(text)?;

        let comment = self
            .store
            .create(NewComment {
                post_id,
                author: author.to_string(),
                content: text.to_string(),
                timestamp: Utc::now(),
            })
            .await?;

        tracing::info!(
            comment_id = comment.id,
            post_id,
            "Comment stored, classification queued"
        );

        self.attempted.insert(comment.id);

        let store = Arc::clone(&self.store);
        let classifier = Arc::clone(&self.classifier);
        let config = self.config.clone();
        let queued = comment.clone();
        let handle = tokio::spawn(async move {
            classify_and_store(&*store, &*classifier, &config, &queued).await
        });

        Ok((comment, handle))
    }

    /// Classify the comments on a post that never had a classification
    /// attempt, such as seeded rows or rows stored by an earlier run.
    ///
    /// Runs inline, one comment at a time. Comments that already have flags,
    /// or whose attempt has started (even if it failed or is still running),
    /// are skipped, so every comment is sent to the classifier at most once.
    pub async fn classify_pending(
        &self,
        post_id: u64,
    ) -> Result<Vec<ClassificationOutcome>, ModerationError> {
        let comments = self.store.list_by_post(post_id).await?;
        let mut outcomes = Vec::new();

        for comment in comments.iter().filter(|c| !c.is_classified()) {
            // insert() is false when another caller already claimed the id
            if !self.attempted.insert(comment.id) {
                continue;
            }
            outcomes.push(
                classify_and_store(&*self.store, &*self.classifier, &self.config, comment).await,
            );
        }

        tracing::debug!(post_id, classified = outcomes.len(), "Pending classification run finished");
        Ok(outcomes)
    }

    /// Current comments for a post, flags as stored.
    pub async fn comments_for_post(&self, post_id: u64) -> Result<Vec<Comment>, ModerationError> {
        self.store.list_by_post(post_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
