// SQLite-backed comment store.
//
// Tables:
// - comments: one row per comment; obscene/negative are NULL until classified

use crate::core::moderation::{
    Comment, CommentStore, Flag, FlagUpdate, ModerationError, NewComment,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteCommentStore {
    pool: Pool<Sqlite>,
}

impl SqliteCommentStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure the file exists if it's a file path
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                obscene INTEGER,
                negative INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_comments_post
                ON comments(post_id, id);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_comment(row: &SqliteRow) -> Result<Comment, ModerationError> {
        let timestamp_str: String = row.get("timestamp");
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                ModerationError::StoreRead(format!("bad timestamp {:?}: {}", timestamp_str, e))
            })?;

        Ok(Comment {
            id: row.get::<i64, _>("id") as u64,
            post_id: row.get::<i64, _>("post_id") as u64,
            author: row.get("author"),
            content: row.get("content"),
            timestamp,
            obscene: Flag::from_db(row.get("obscene")),
            negative: Flag::from_db(row.get("negative")),
        })
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn create(&self, new: NewComment) -> Result<Comment, ModerationError> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author, content, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.post_id as i64)
        .bind(&new.author)
        .bind(&new.content)
        .bind(new.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StoreWrite(e.to_string()))?;

        Ok(Comment {
            id: result.last_insert_rowid() as u64,
            post_id: new.post_id,
            author: new.author,
            content: new.content,
            timestamp: new.timestamp,
            obscene: Flag::Unclassified,
            negative: Flag::Unclassified,
        })
    }

    async fn update_flags(&self, id: u64, update: FlagUpdate) -> Result<Comment, ModerationError> {
        // COALESCE keeps an already-set flag, which makes flags write-once
        // even when a refresh and a classification race
        let result = sqlx::query(
            r#"
            UPDATE comments SET
                obscene = COALESCE(obscene, ?),
                negative = COALESCE(negative, ?)
            WHERE id = ?
            "#,
        )
        .bind(update.obscene.and_then(Flag::to_db))
        .bind(update.negative.and_then(Flag::to_db))
        .bind(id as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StoreWrite(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ModerationError::NotFound(id));
        }

        self.get(id).await?.ok_or(ModerationError::NotFound(id))
    }

    async fn get(&self, id: u64) -> Result<Option<Comment>, ModerationError> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ModerationError::StoreRead(e.to_string()))?;

        row.as_ref().map(Self::row_to_comment).transpose()
    }

    async fn list_by_post(&self, post_id: u64) -> Result<Vec<Comment>, ModerationError> {
        let rows = sqlx::query("SELECT * FROM comments WHERE post_id = ? ORDER BY id ASC")
            .bind(post_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ModerationError::StoreRead(e.to_string()))?;

        rows.iter().map(Self::row_to_comment).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store() -> (SqliteCommentStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.db");
        let store = SqliteCommentStore::new(path.to_str().unwrap())
            .await
            .unwrap();
        (store, dir)
    }

    fn new_comment(post_id: u64, content: &str) -> NewComment {
        NewComment {
            post_id,
            author: "Alex Chen".to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_in_insertion_order() {
        let (store, _dir) = open_store().await;
        let first = store.create(new_comment(1, "first")).await.unwrap();
        store.create(new_comment(2, "other")).await.unwrap();
        let second = store.create(new_comment(1, "second")).await.unwrap();

        let listed = store.list_by_post(1).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
        assert_eq!(listed[0].obscene, Flag::Unclassified);
        assert_eq!(listed[0].timestamp, first.timestamp);
    }

    #[tokio::test]
    async fn test_flags_are_write_once() {
        let (store, _dir) = open_store().await;
        let created = store.create(new_comment(1, "oh shit")).await.unwrap();

        let updated = store
            .update_flags(
                created.id,
                FlagUpdate {
                    obscene: Some(Flag::Flagged),
                    negative: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.obscene, Flag::Flagged);
        assert_eq!(updated.negative, Flag::Unclassified);

        let again = store
            .update_flags(
                created.id,
                FlagUpdate {
                    obscene: Some(Flag::Clear),
                    negative: Some(Flag::Clear),
                },
            )
            .await
            .unwrap();
        assert_eq!(again.obscene, Flag::Flagged);
        assert_eq!(again.negative, Flag::Clear);
        assert_eq!(again.content, "oh shit");
    }

    #[tokio::test]
    async fn test_update_missing_comment() {
        let (store, _dir) = open_store().await;
        let result = store.update_flags(999, FlagUpdate::default()).await;
        assert!(matches!(result, Err(ModerationError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.db");
        let path = path.to_str().unwrap();

        let created = {
            let store = SqliteCommentStore::new(path).await.unwrap();
            store.create(new_comment(5, "persisted")).await.unwrap()
        };

        let reopened = SqliteCommentStore::new(path).await.unwrap();
        let fetched = reopened.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "persisted");
        assert_eq!(fetched.post_id, 5);
    }
}
