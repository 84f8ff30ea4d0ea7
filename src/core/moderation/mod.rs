// Core moderation module - comment classification and render decisions.

pub mod moderation_models;
pub mod moderation_service;
pub mod render_policy;

pub use moderation_models::*;
pub use moderation_service::*;
pub use render_policy::{redaction_notice, render_policy, render_policy_at, REVIEW_BANNER};
