use crate::core::feed::{Post, PostStore, PostStoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Posts persisted as a single JSON array, cached in memory.
pub struct JsonPostStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<u64, Post>>,
}

impl JsonPostStore {
    /// Open the store. A missing file is an empty feed; an unreadable or
    /// corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PostStoreError> {
        let path = path.into();
        let cache = if path.exists() {
            let file = File::open(&path)?;
            let posts: Vec<Post> = serde_json::from_reader(BufReader::new(file))?;
            posts.into_iter().map(|p| (p.id, p)).collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Write `posts` to a sibling temp file, then rename it over the real
    /// one. A failed write leaves the old file intact.
    fn persist(&self, posts: &BTreeMap<u64, Post>) -> Result<(), PostStoreError> {
        let mut tmp_name = self.path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let posts: Vec<&Post> = posts.values().collect();
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer_pretty(&mut writer, &posts)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for JsonPostStore {
    async fn list_posts(&self) -> Result<Vec<Post>, PostStoreError> {
        let cache = self.cache.read().await;
        Ok(cache.values().cloned().collect())
    }

    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, PostStoreError> {
        let cache = self.cache.read().await;
        Ok(cache.get(&post_id).cloned())
    }

    async fn save_post(&self, post: Post) -> Result<(), PostStoreError> {
        let mut cache = self.cache.write().await;
        let mut updated = cache.clone();
        updated.insert(post.id, post);
        // Cache only changes once the file has been written
        self.persist(&updated)?;
        *cache = updated;
        Ok(())
    }
}
