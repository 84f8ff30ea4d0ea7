// Runtime configuration, read from environment variables.
//
// Every setting has a default so the app starts with an empty environment.
// Bad numbers are logged and replaced with the default instead of aborting.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_CLASSIFY_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_AUTHOR: &str = "You";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStoreKind {
    Sqlite,
    Memory,
}

impl FromStr for CommentStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(CommentStoreKind::Sqlite),
            "memory" | "in-memory" => Ok(CommentStoreKind::Memory),
            other => Err(format!("unknown comment store '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub posts_file: PathBuf,
    pub comment_store: CommentStoreKind,
    pub classifier_url: Option<String>,
    pub classifier_api_key: Option<String>,
    pub classify_timeout: Duration,
    pub refresh_interval: Duration,
    pub author: String,
    pub extra_profanity: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("FEED_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let posts_file = get("FEED_POSTS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("posts.json"));

        let comment_store = match get("FEED_COMMENT_STORE") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("FEED_COMMENT_STORE: {}, using sqlite", e);
                CommentStoreKind::Sqlite
            }),
            None => CommentStoreKind::Sqlite,
        };

        let extra_profanity = get("FEED_EXTRA_PROFANITY")
            .map(|raw| {
                raw.split(',')
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            posts_file,
            data_dir,
            comment_store,
            classifier_url: get("CLASSIFIER_URL"),
            classifier_api_key: get("CLASSIFIER_API_KEY"),
            classify_timeout: Duration::from_secs(secs_or_default(
                "CLASSIFIER_TIMEOUT_SECS",
                get("CLASSIFIER_TIMEOUT_SECS"),
                DEFAULT_CLASSIFY_TIMEOUT_SECS,
            )),
            refresh_interval: Duration::from_secs(secs_or_default(
                "FEED_REFRESH_SECS",
                get("FEED_REFRESH_SECS"),
                DEFAULT_REFRESH_SECS,
            )),
            author: get("FEED_AUTHOR").unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            extra_profanity,
        }
    }

    pub fn comments_db_path(&self) -> PathBuf {
        self.data_dir.join("comments.db")
    }
}

/// Parse a positive number of seconds, falling back to `default`.
fn secs_or_default(key: &str, raw: Option<String>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => secs,
        _ => {
            tracing::warn!("{}={:?} is not a positive number, using {}", key, raw, default);
            default
        }
    }
}
