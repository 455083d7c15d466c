//! Upload policy and storage for user-submitted images.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Extensions accepted for image uploads.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Default upload ceiling (5 MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// Validation rules applied to every upload before it touches storage.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_size: u64,
    allowed_extensions: &'static [&'static str],
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::images(DEFAULT_MAX_UPLOAD_SIZE)
    }
}

impl UploadPolicy {
    /// Image-only policy with the given size ceiling.
    #[must_use]
    pub const fn images(max_size: u64) -> Self {
        Self {
            max_size,
            allowed_extensions: ALLOWED_IMAGE_EXTENSIONS,
        }
    }

    /// Maximum accepted size in bytes.
    #[must_use]
    pub const fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Check a candidate upload and return its normalized extension.
    pub fn validate(&self, file_name: &str, content_type: &str, size: u64) -> AppResult<String> {
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "Only image files are allowed, got {content_type}"
            )));
        }

        let extension = file_extension(file_name)
            .map(str::to_ascii_lowercase)
            .filter(|ext| self.allowed_extensions.contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Unsupported file type, allowed: {}",
                    self.allowed_extensions.join(", ")
                ))
            })?;

        if size == 0 {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }

        if size > self.max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes",
                self.max_size
            )));
        }

        Ok(extension)
    }
}

fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < file_name.len() - 1)
        .map(|pos| &file_name[pos + 1..])
}

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (relative path).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `key`.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Generate a unique storage key for an upload.
#[must_use]
pub fn generate_storage_key(user_id: &str, extension: &str) -> String {
    use chrono::Utc;

    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();
    let timestamp = now.timestamp_millis();

    format!(
        "{}/{}/{}_{}.{}",
        date_path,
        user_id,
        timestamp,
        uuid::Uuid::new_v4(),
        extension
    )
}
