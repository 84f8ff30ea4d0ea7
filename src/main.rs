// Entry point of the feed moderation console.
//
// **Architecture Overview:**
// - `core/` = Business logic (comments, flags, render policy, feed)
// - `infra/` = Implementations of core traits (SQLite, JSON files, classifiers)
// - `console/` = Terminal adapter (command parsing, feed formatting)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start the background feed refresh
// 4. Run the command loop on stdin

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "console/console_layer.rs"]
mod console;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::{AppConfig, CommentStoreKind};
use crate::console::{handle_command, parse_command, Data, Reply};
use crate::core::feed::FeedService;
use crate::core::moderation::{Classifier, CommentStore, ModerationConfig, ModerationService};
use crate::infra::classifier::{HttpClassifier, LexiconClassifier};
use crate::infra::comments::{InMemoryCommentStore, SqliteCommentStore};
use crate::infra::posts::{seed_if_empty, JsonPostStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() {
    // Logs go to stderr so they don't get mixed into command output
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();

    // Keep runtime data in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let comment_store: Box<dyn CommentStore> = match config.comment_store {
        CommentStoreKind::Sqlite => {
            let db_path = config.comments_db_path();
            let db_path = db_path
                .to_str()
                .expect("Comment database path is not valid UTF-8");
            Box::new(
                SqliteCommentStore::new(db_path)
                    .await
                    .expect("Failed to initialize SQLite comment store"),
            )
        }
        CommentStoreKind::Memory => {
            tracing::warn!("Using in-memory comment store; comments are lost on exit");
            Box::new(InMemoryCommentStore::new())
        }
    };

    let post_store = JsonPostStore::open(&config.posts_file).expect("Failed to open post store");
    let seeded_posts = seed_if_empty(&post_store, &comment_store)
        .await
        .expect("Failed to seed demo feed");

    let classifier: Box<dyn Classifier> = match &config.classifier_url {
        Some(url) => {
            tracing::info!("Using HTTP classifier at {}", url);
            Box::new(
                HttpClassifier::new(
                    url.clone(),
                    config.classifier_api_key.clone(),
                    config.classify_timeout,
                )
                .expect("Failed to create classifier client"),
            )
        }
        None => {
            tracing::info!("CLASSIFIER_URL not set, using the built-in word lists");
            Box::new(LexiconClassifier::new().with_profanity(&config.extra_profanity))
        }
    };

    let moderation_config = ModerationConfig {
        classify_timeout: config.classify_timeout,
        ..ModerationConfig::default()
    };
    let moderation = Arc::new(ModerationService::with_config(
        comment_store,
        classifier,
        moderation_config,
    ));

    // Seed comments go in unclassified; check them once up front
    for post_id in seeded_posts {
        if let Err(e) = moderation.classify_pending(post_id).await {
            tracing::warn!(post_id, "Failed to classify seed comments: {}", e);
        }
    }

    let feed = Arc::new(FeedService::new(post_store, moderation.store()));
    if let Err(e) = feed.refresh().await {
        tracing::error!("Initial feed load failed: {}", e);
    }

    let data = Data {
        moderation,
        feed: Arc::clone(&feed),
        author: config.author.clone(),
    };

    // Background refresh so flags from finished classifications show up
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        use tokio::time::sleep;

        loop {
            sleep(refresh_interval).await;
            match feed.refresh().await {
                Ok(posts) => tracing::debug!(posts, "Background feed refresh done"),
                Err(err) => tracing::warn!("Background feed refresh failed: {}", err),
            }
        }
    });

    // ========================================================================
    // COMMAND LOOP
    // ========================================================================

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_out(&mut stdout, "Feed moderation console. Type `help` for commands.\n> ").await;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read from stdin: {}", e);
                break;
            }
        };

        let output = match parse_command(&line) {
            Ok(command) => match handle_command(&data, command).await {
                Ok(Reply::Output(text)) => text,
                Ok(Reply::Quit) => break,
                Err(e) => {
                    tracing::error!("Command failed: {}", e);
                    format!("Something went wrong: {}", e)
                }
            },
            Err(e) => e.to_string(),
        };

        write_out(&mut stdout, &format!("{}\n> ", output)).await;
    }
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) {
    if let Err(e) = stdout.write_all(text.as_bytes()).await {
        tracing::warn!("Failed to write to stdout: {}", e);
    }
    let _ = stdout.flush().await;
}
