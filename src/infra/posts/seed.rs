// Demo content written on first start, so an empty data dir still shows a feed.

use super::json_store::JsonPostStore;
use crate::core::feed::{Post, PostStore};
use crate::core::moderation::{CommentStore, NewComment};
use chrono::{Duration, Utc};

pub struct SeedPost {
    pub post: Post,
    pub comments: Vec<NewComment>,
}

pub fn demo_feed() -> Vec<SeedPost> {
    let now = Utc::now();
    vec![
        SeedPost {
            post: Post {
                id: 1,
                author: "Sarah Johnson".to_string(),
                avatar: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=150"
                    .to_string(),
                content: "Just finished reading an amazing book about sustainable architecture. \
                          The way modern design can harmonize with nature is truly inspiring! 🌿🏗️"
                    .to_string(),
                image: Some(
                    "https://images.unsplash.com/photo-1518780664697-55e3ad937233?w=800"
                        .to_string(),
                ),
                likes: 124,
                is_liked: false,
            },
            comments: vec![NewComment {
                post_id: 1,
                author: "Alex Chen".to_string(),
                content: "This is fascinating! Which book was it?".to_string(),
                timestamp: now - Duration::hours(2),
            }],
        },
        SeedPost {
            post: Post {
                id: 2,
                author: "Mike Peters".to_string(),
                avatar: "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=150"
                    .to_string(),
                content: "Exploring the hidden trails of Mount Rainier today. \
                          The views are absolutely breathtaking! 🏔️"
                    .to_string(),
                image: Some(
                    "https://images.unsplash.com/photo-1464822759023-fed622ff2c3b?w=800"
                        .to_string(),
                ),
                likes: 89,
                is_liked: false,
            },
            comments: vec![NewComment {
                post_id: 2,
                author: "Lisa Wong".to_string(),
                content: "The colors in this photo are incredible!".to_string(),
                timestamp: now - Duration::hours(5),
            }],
        },
    ]
}

/// Write the demo feed if the post store has nothing in it.
///
/// Returns the ids of the posts that were seeded (empty if the store
/// already had posts). Seed comments go in unclassified.
pub async fn seed_if_empty<S: CommentStore + ?Sized>(
    posts: &JsonPostStore,
    comments: &S,
) -> anyhow::Result<Vec<u64>> {
    if !posts.is_empty().await {
        return Ok(Vec::new());
    }

    let mut seeded = Vec::new();
    for seed in demo_feed() {
        let post_id = seed.post.id;
        posts.save_post(seed.post).await?;
        for comment in seed.comments {
            comments.create(comment).await?;
        }
        seeded.push(post_id);
    }

    tracing::info!(posts = seeded.len(), "Seeded demo feed");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::comments::InMemoryCommentStore;

    #[tokio::test]
    async fn test_seed_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let posts = JsonPostStore::open(dir.path().join("posts.json")).unwrap();
        let comments = InMemoryCommentStore::new();

        let first = seed_if_empty(&posts, &comments).await.unwrap();
        assert_eq!(first, vec![1, 2]);
        assert_eq!(comments.list_by_post(1).await.unwrap().len(), 1);

        let second = seed_if_empty(&posts, &comments).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(comments.list_by_post(1).await.unwrap().len(), 1);
    }
}
