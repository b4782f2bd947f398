use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::error::AppError;

/// Хранилище файлов: загрузка по пути, в ответ публичный URL
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, AppError>;
}

/// Файлы в локальном каталоге, отдаются статикой под `public_url`
pub struct LocalObjectStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::Validation(format!("invalid object path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let size = bytes.len();
        tokio::fs::write(&target, bytes).await?;

        tracing::info!(
            "Uploaded {} ({} bytes, {})",
            path,
            size,
            content_type.unwrap_or("application/octet-stream")
        );
        Ok(format!("{}/{}", self.public_url.trim_end_matches('/'), path))
    }
}

/// Имя файла, безопасное для пути в хранилище
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// `<prefix>/<uuid>-<имя файла>`: повторная загрузка файла с тем же именем
/// не перезаписывает предыдущий
pub fn unique_object_path(prefix: &str, file_name: &str) -> String {
    format!("{}/{}-{}", prefix, Uuid::new_v4(), sanitize_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("Team Logo (1).png"), "Team_Logo__1_.png");
        assert_eq!(sanitize_file_name(".."), "file");
    }

    #[test]
    fn test_unique_object_path_keeps_prefix_and_name() {
        let path = unique_object_path("news", "cup.jpg");
        assert!(path.starts_with("news/"));
        assert!(path.ends_with("-cup.jpg"));
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let root = std::env::temp_dir().join(format!("stars-media-{}", Uuid::new_v4()));
        let storage = LocalObjectStorage::new(&root, "/media/");
        let url = storage
            .upload("teams/logo.png", vec![1, 2, 3], Some("image/png"))
            .await
            .unwrap();
        assert_eq!(url, "/media/teams/logo.png");
        assert_eq!(std::fs::read(root.join("teams/logo.png")).unwrap(), vec![1, 2, 3]);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_upload_rejects_escaping_paths() {
        let storage = LocalObjectStorage::new(std::env::temp_dir(), "/media");
        let err = storage.upload("../x", vec![], None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
