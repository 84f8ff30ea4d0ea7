use crate::core::moderation::{render_policy_at, Comment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub author: String,
    pub avatar: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub likes: u64,
    #[serde(default)]
    pub is_liked: bool,
}

impl Post {
    /// Flip the viewer's like and adjust the counter to match.
    pub fn toggle_like(&mut self) {
        if self.is_liked {
            self.likes = self.likes.saturating_sub(1);
        } else {
            self.likes = self.likes.saturating_add(1);
        }
        self.is_liked = !self.is_liked;
    }
}

/// A post together with its comments as last loaded.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Whole-feed state produced by a refresh.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub entries: Vec<FeedEntry>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// A comment as the presenter may see it: render policy output plus
/// the immutable metadata. No flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedComment {
    pub id: u64,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub display_text: String,
    pub show_review_banner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPost {
    pub id: u64,
    pub author: String,
    pub avatar: String,
    pub content: String,
    pub image: Option<String>,
    pub likes: u64,
    pub is_liked: bool,
    pub comments: Vec<RenderedComment>,
}

impl FeedEntry {
    pub fn render_at(&self, rendered_at: DateTime<Utc>) -> RenderedPost {
        RenderedPost {
            id: self.post.id,
            author: self.post.author.clone(),
            avatar: self.post.avatar.clone(),
            content: self.post.content.clone(),
            image: self.post.image.clone(),
            likes: self.post.likes,
            is_liked: self.post.is_liked,
            comments: self
                .comments
                .iter()
                .map(|comment| {
                    let policy = render_policy_at(comment, rendered_at);
                    RenderedComment {
                        id: comment.id,
                        author: comment.author.clone(),
                        timestamp: comment.timestamp,
                        display_text: policy.display_text,
                        show_review_banner: policy.show_review_banner,
                    }
                })
                .collect(),
        }
    }
}
