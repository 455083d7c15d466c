//! Cover image upload service.

use std::sync::Arc;

use goty_common::{
    AppResult, StorageBackend, UploadPolicy, UploadedFile, generate_storage_key,
};
use tracing::info;

/// Upload service: validate, then store.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn StorageBackend>,
    policy: UploadPolicy,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, policy: UploadPolicy) -> Self {
        Self { storage, policy }
    }

    /// Largest accepted upload in bytes.
    #[must_use]
    pub const fn max_size(&self) -> u64 {
        self.policy.max_size()
    }

    /// Store a cover image uploaded by `user_id`.
    pub async fn upload_cover(
        &self,
        user_id: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<UploadedFile> {
        let extension = self
            .policy
            .validate(file_name, content_type, data.len() as u64)?;

        let key = generate_storage_key(user_id, &extension);
        let file = self.storage.upload(&key, data, content_type).await?;

        info!(user_id = %user_id, key = %file.key, size = file.size, "Stored cover upload");

        Ok(file)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use goty_common::{AppError, LocalStorage};

    const MB: usize = 1024 * 1024;

    fn create_service() -> (UploadService, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("goty-upload-{}", uuid::Uuid::new_v4()));
        let storage = Arc::new(LocalStorage::new(dir.clone(), "/uploads".to_string()));
        (UploadService::new(storage, UploadPolicy::default()), dir)
    }

    #[tokio::test]
    async fn test_png_under_limit_is_stored() {
        let (service, dir) = create_service();
        let data = vec![0u8; 4 * MB];

        let file = service
            .upload_cover("user1", "cover.png", "image/png", &data)
            .await
            .unwrap();

        assert!(file.key.contains("/user1/"));
        assert!(file.key.ends_with(".png"));
        assert_eq!(file.size, (4 * MB) as u64);
        assert!(file.url.starts_with("/uploads/"));
        assert!(dir.join(&file.key).exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_oversized_image_is_not_stored() {
        let (service, dir) = create_service();
        let data = vec![0u8; 6 * MB];

        let result = service
            .upload_cover("user1", "cover.jpg", "image/jpeg", &data)
            .await;

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_gif_is_rejected() {
        let (service, _dir) = create_service();

        let result = service
            .upload_cover("user1", "anim.gif", "image/gif", b"GIF89a")
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
