// Presentation decision for a single comment.
//
// The presenter never looks at flags directly; it only gets the text to show
// and whether to add the review banner.

use super::moderation_models::{Comment, RenderPolicy};
use chrono::{DateTime, Utc};

/// Banner shown under comments judged negative.
pub const REVIEW_BANNER: &str = "⚠️ This comment is under review.";

const REDACTION_PREFIX: &str = "This comment has been hidden for violating community guidelines";

/// Build the redaction notice for a render happening at `rendered_at`.
///
/// The time is the time of rendering, not of moderation, so two renders of
/// the same comment produce different text.
pub fn redaction_notice(rendered_at: DateTime<Utc>) -> String {
    format!(
        "{} (as of {}).",
        REDACTION_PREFIX,
        rendered_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Decide how to present a comment right now.
pub fn render_policy(comment: &Comment) -> RenderPolicy {
    render_policy_at(comment, Utc::now())
}

/// Same as [`render_policy`] with an explicit render time.
pub fn render_policy_at(comment: &Comment, rendered_at: DateTime<Utc>) -> RenderPolicy {
    let display_text = if comment.obscene.is_flagged() {
        let mut notice = redaction_notice(rendered_at);
        // Someone could paste the notice itself as their comment
        if notice == comment.content {
            notice.push_str(" [redacted]");
        }
        notice
    } else {
        comment.content.clone()
    };

    RenderPolicy {
        display_text,
        show_review_banner: comment.negative.is_flagged(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::Flag;
    use chrono::{Duration, TimeZone};

    fn comment_with(content: &str, obscene: Flag, negative: Flag) -> Comment {
        Comment {
            id: 7,
            post_id: 2,
            author: "You".to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
            obscene,
            negative,
        }
    }

    #[test]
    fn test_unclassified_comment_is_shown_verbatim() {
        let comment = comment_with("  spacing kept  ", Flag::Unclassified, Flag::Unclassified);
        let policy = render_policy(&comment);
        assert_eq!(policy.display_text, "  spacing kept  ");
        assert!(!policy.show_review_banner);
    }

    #[test]
    fn test_clear_comment_is_shown_verbatim() {
        let comment = comment_with("This is great!", Flag::Clear, Flag::Clear);
        let policy = render_policy(&comment);
        assert_eq!(policy.display_text, "This is great!");
        assert!(!policy.show_review_banner);
    }

    #[test]
    fn test_obscene_comment_is_redacted() {
        let comment = comment_with("what the shit", Flag::Flagged, Flag::Clear);
        let policy = render_policy(&comment);
        assert_ne!(policy.display_text, comment.content);
        assert!(policy.display_text.starts_with(REDACTION_PREFIX));
        assert!(!policy.show_review_banner);
    }

    #[test]
    fn test_redaction_notice_uses_render_time() {
        let comment = comment_with("what the shit", Flag::Flagged, Flag::Unclassified);
        let first = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let second = first + Duration::seconds(90);

        let a = render_policy_at(&comment, first);
        let b = render_policy_at(&comment, second);
        assert!(a.display_text.contains("2024-05-01 12:00:00 UTC"));
        assert!(b.display_text.contains("2024-05-01 12:01:30 UTC"));
        assert_ne!(a.display_text, b.display_text);
    }

    #[test]
    fn test_review_banner_is_independent_of_obscenity() {
        for obscene in [Flag::Unclassified, Flag::Clear, Flag::Flagged] {
            let flagged = render_policy(&comment_with("I hate this", obscene, Flag::Flagged));
            assert!(flagged.show_review_banner, "obscene = {obscene}");

            for negative in [Flag::Unclassified, Flag::Clear] {
                let policy = render_policy(&comment_with("I hate this", obscene, negative));
                assert!(!policy.show_review_banner, "obscene = {obscene}, negative = {negative}");
            }
        }
    }

    #[test]
    fn test_both_flags_redact_and_annotate() {
        let comment = comment_with("you shit, I hate this", Flag::Flagged, Flag::Flagged);
        let policy = render_policy(&comment);
        assert_ne!(policy.display_text, comment.content);
        assert!(policy.show_review_banner);
    }

    #[test]
    fn test_comment_copying_the_notice_is_still_redacted() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let comment = comment_with(&redaction_notice(at), Flag::Flagged, Flag::Clear);
        let policy = render_policy_at(&comment, at);
        assert_ne!(policy.display_text, comment.content);
    }
}
