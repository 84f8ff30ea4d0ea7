// Executes parsed console commands against the core services.

use super::commands::{ConsoleCommand, HELP_TEXT};
use super::formatter::format_feed;
use crate::core::feed::{FeedError, FeedService};
use crate::core::moderation::{
    ClassificationOutcome, Classifier, CommentStore, ModerationError, ModerationService,
};
use crate::infra::posts::JsonPostStore;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub type Moderation = ModerationService<Box<dyn CommentStore>, Box<dyn Classifier>>;
pub type Feed = FeedService<JsonPostStore, Box<dyn CommentStore>>;

/// Shared state handed to every command.
pub struct Data {
    pub moderation: Arc<Moderation>,
    pub feed: Arc<Feed>,
    /// Author name for comments typed at this console.
    pub author: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

pub async fn handle_command(data: &Data, command: ConsoleCommand) -> Result<Reply, Error> {
    let text = match command {
        ConsoleCommand::Feed => {
            let mut out = format_feed(&data.feed.render().await);
            if let Some(at) = data.feed.snapshot().await.refreshed_at {
                out.push_str(&format!("\n(last refreshed {})", at.format("%H:%M:%S UTC")));
            }
            out
        }
        ConsoleCommand::Refresh => {
            let count = data.feed.refresh().await?;
            format!("Feed refreshed ({} posts).", count)
        }
        ConsoleCommand::Help => HELP_TEXT.to_string(),
        ConsoleCommand::Quit => return Ok(Reply::Quit),
        ConsoleCommand::Comment { post_id, text } => post_comment(data, post_id, &text).await?,
        ConsoleCommand::Like { post_id } => match data.feed.toggle_like(post_id).await {
            Ok(post) if post.is_liked => {
                format!("Liked post {} ({} likes).", post_id, post.likes)
            }
            Ok(post) => format!("Unliked post {} ({} likes).", post_id, post.likes),
            Err(FeedError::PostNotFound(_)) => format!("No post with id {}.", post_id),
            Err(e) => return Err(e.into()),
        },
        ConsoleCommand::Analyze { post_id } => analyze_post(data, post_id).await?,
    };

    Ok(Reply::Output(text))
}

async fn post_comment(data: &Data, post_id: u64, text: &str) -> Result<String, Error> {
    if !data.feed.post_exists(post_id).await? {
        return Ok(format!("No post with id {}.", post_id));
    }

    match data
        .moderation
        .submit_comment(post_id, &data.author, text)
        .await
    {
        Ok(comment) => {
            let id = comment.id;
            data.feed.append_comment(comment).await;
            Ok(format!("Comment #{} posted on post {}.", id, post_id))
        }
        // Blank submissions are a no-op, not a failure
        Err(ModerationError::Validation(_)) => {
            Ok("Nothing to post: the comment is empty.".to_string())
        }
        Err(e) => Err(e.into()),
    }
}

async fn analyze_post(data: &Data, post_id: u64) -> Result<String, Error> {
    if !data.feed.post_exists(post_id).await? {
        return Ok(format!("No post with id {}.", post_id));
    }

    let outcomes = data.moderation.classify_pending(post_id).await?;
    let resolved = outcomes
        .iter()
        .filter(|o| matches!(o, ClassificationOutcome::Resolved(_)))
        .count();
    let unresolved = outcomes.len() - resolved;

    // Pull the new flags into the snapshot
    data.feed.refresh().await?;

    Ok(match (resolved, unresolved) {
        (0, 0) => format!("All comments on post {} are already checked.", post_id),
        (_, 0) => format!("Checked {} comment(s) on post {}.", resolved, post_id),
        _ => format!(
            "Checked {} comment(s) on post {}; {} could not be checked right now.",
            resolved, post_id, unresolved
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::commands::parse_command;
    use crate::core::moderation::{redaction_notice, REVIEW_BANNER};
    use crate::infra::classifier::LexiconClassifier;
    use crate::infra::comments::InMemoryCommentStore;
    use crate::infra::posts::seed_if_empty;
    use tempfile::TempDir;

    async fn setup() -> (Data, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let posts = JsonPostStore::open(dir.path().join("posts.json")).unwrap();
        let store: Box<dyn CommentStore> = Box::new(InMemoryCommentStore::new());
        seed_if_empty(&posts, &store).await.unwrap();

        let classifier: Box<dyn Classifier> = Box::new(LexiconClassifier::new());
        let moderation = Arc::new(ModerationService::new(store, classifier));
        let feed = Arc::new(FeedService::new(posts, moderation.store()));
        feed.refresh().await.unwrap();

        let data = Data {
            moderation,
            feed,
            author: "You".to_string(),
        };
        (data, dir)
    }

    async fn run(data: &Data, line: &str) -> String {
        let command = parse_command(line).unwrap();
        match handle_command(data, command).await.unwrap() {
            Reply::Output(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_feed_shows_seeded_posts() {
        let (data, _dir) = setup().await;
        let out = run(&data, "feed").await;
        assert!(out.contains("Sarah Johnson"));
        assert!(out.contains("Which book was it?"));
        assert!(out.contains("Mike Peters"));
    }

    #[tokio::test]
    async fn test_comment_appears_immediately() {
        let (data, _dir) = setup().await;
        let reply = run(&data, "comment 2 What a view").await;
        assert!(reply.starts_with("Comment #"));

        let out = run(&data, "feed").await;
        assert!(out.contains("You · "));
        assert!(out.contains("What a view"));
    }

    #[tokio::test]
    async fn test_blank_comment_is_a_no_op() {
        let (data, _dir) = setup().await;
        let reply = run(&data, "comment 1    ").await;
        assert_eq!(reply, "Nothing to post: the comment is empty.");
        assert_eq!(data.moderation.comments_for_post(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let (data, _dir) = setup().await;
        assert_eq!(run(&data, "comment 42 hi").await, "No post with id 42.");
    }

    /// Wait for the background classifications on a post to land.
    async fn wait_until_classified(data: &Data, post_id: u64) {
        for _ in 0..200 {
            let comments = data.moderation.comments_for_post(post_id).await.unwrap();
            if comments.iter().all(|c| c.is_classified()) {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("comments on post {} were never classified", post_id);
    }

    #[tokio::test]
    async fn test_flags_show_after_refresh() {
        let (data, _dir) = setup().await;
        run(&data, "comment 1 this is shit").await;
        run(&data, "comment 1 I hate this").await;

        // The seed comment has no task of its own
        run(&data, "analyze 1").await;
        wait_until_classified(&data, 1).await;
        run(&data, "refresh").await;
        let out = run(&data, "feed").await;

        // Notice text up to the timestamp
        let notice = redaction_notice(chrono::Utc::now());
        let prefix = notice.split(" (as of").next().unwrap();
        assert!(out.contains(prefix));
        assert!(!out.contains("this is shit"));
        assert!(out.contains(REVIEW_BANNER));
        assert!(out.contains("I hate this"));
    }

    #[tokio::test]
    async fn test_analyze_skips_submitted_comments() {
        let (data, _dir) = setup().await;
        run(&data, "comment 2 What a view").await;

        // Only the seed comment is picked up; the new one has its own task
        assert_eq!(run(&data, "analyze 2").await, "Checked 1 comment(s) on post 2.");
    }

    #[tokio::test]
    async fn test_analyze_twice_finds_nothing_new() {
        let (data, _dir) = setup().await;
        run(&data, "analyze 2").await;
        assert_eq!(
            run(&data, "analyze 2").await,
            "All comments on post 2 are already checked."
        );
    }

    #[tokio::test]
    async fn test_like_toggles() {
        let (data, _dir) = setup().await;
        assert_eq!(run(&data, "like 1").await, "Liked post 1 (125 likes).");
        assert_eq!(run(&data, "like 1").await, "Unliked post 1 (124 likes).");
        assert_eq!(run(&data, "like 9").await, "No post with id 9.");
    }

    #[tokio::test]
    async fn test_quit() {
        let (data, _dir) = setup().await;
        let reply = handle_command(&data, ConsoleCommand::Quit).await.unwrap();
        assert_eq!(reply, Reply::Quit);
    }
}
