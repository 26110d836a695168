//! File Object Store - 文件系统对象存储
//!
//! 实现 ObjectStorePort trait，用于本地演练（dry run）和测试。
//! key 直接映射为根目录下的相对路径。

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::{public_object_url, ObjectStorePort, StorageError};

pub struct FileObjectStore {
    /// 存储根目录
    root: PathBuf,
    public_base_url: String,
}

impl FileObjectStore {
    pub async fn new(
        root: impl AsRef<Path>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(Self {
            root,
            public_base_url: public_base_url.into(),
        })
    }

    /// key 对应的本地路径；拒绝越出根目录的 key
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::UploadFailed {
                key: key.to_string(),
                reason: "key escapes storage root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorePort for FileObjectStore {
    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?
            {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    keys.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn put_public(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        fs::write(&path, &data)
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            key,
            content_type,
            size = data.len(),
            path = %path.display(),
            "Stored object"
        );

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, key)
    }
}
