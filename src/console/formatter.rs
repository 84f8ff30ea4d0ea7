use crate::core::feed::{RenderedComment, RenderedPost};
use crate::core::moderation::REVIEW_BANNER;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_comment(comment: &RenderedComment) -> String {
    let mut out = format!(
        "    #{} {} · {}\n",
        comment.id,
        comment.author,
        comment.timestamp.format(TIMESTAMP_FORMAT)
    );
    if comment.show_review_banner {
        out.push_str(&format!("      {}\n", REVIEW_BANNER));
    }
    for line in comment.display_text.lines() {
        out.push_str(&format!("      {}\n", line));
    }
    out
}

pub fn format_post(post: &RenderedPost) -> String {
    let heart = if post.is_liked { "♥" } else { "♡" };
    let mut out = format!(
        "[{}] {}  {} {}\n  {}\n",
        post.id, post.author, heart, post.likes, post.content
    );
    if let Some(image) = &post.image {
        out.push_str(&format!("  🖼  {}\n", image));
    }

    if post.comments.is_empty() {
        out.push_str("  No comments yet.\n");
    } else {
        out.push_str(&format!("  Comments ({}):\n", post.comments.len()));
        for comment in &post.comments {
            out.push_str(&format_comment(comment));
        }
    }
    out
}

pub fn format_feed(posts: &[RenderedPost]) -> String {
    if posts.is_empty() {
        return "The feed is empty.".to_string();
    }
    posts
        .iter()
        .map(format_post)
        .collect::<Vec<_>>()
        .join("\n")
}
