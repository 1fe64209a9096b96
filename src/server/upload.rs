//! Upload Store
//!
//! Stores uploaded images under generated names and lists them back.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Extensions listed by the image index
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Form field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "image";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("이미지 파일이 선택되지 않았습니다.")]
    MissingFile,
    #[error("이미지 파일만 업로드 가능합니다.")]
    NotAnImage,
    #[error("파일 크기는 {limit} 바이트를 넘을 수 없습니다.")]
    TooLarge { limit: usize },
    #[error("이미지를 찾을 수 없습니다: {0}")]
    NotFound(String),
    #[error("잘못된 업로드 요청입니다: {0}")]
    Malformed(String),
    #[error("서버 오류가 발생했습니다.")]
    Io(#[from] std::io::Error),
}

/// Error body shared by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::NotFound(_) => StatusCode::NOT_FOUND,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

/// A freshly stored upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub path: PathBuf,
}

/// Entry of the image index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageEntry {
    pub filename: String,
    pub path: String,
    pub size: u64,
}

/// Upload directory with its limits
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    /// Open the store, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>, max_bytes: usize) -> Result<Self, UploadError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reject anything that is not declared as an image
    pub fn check_content_type(content_type: Option<&str>) -> Result<(), UploadError> {
        match content_type {
            Some(mime) if mime.starts_with("image/") => Ok(()),
            _ => Err(UploadError::NotAnImage),
        }
    }

    /// Fail once `received` bytes exceed the limit
    pub fn check_size(&self, received: usize) -> Result<(), UploadError> {
        if received > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Write an upload under a fresh name
    pub fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StoredImage, UploadError> {
        Self::check_content_type(content_type)?;
        self.check_size(data.len())?;

        let filename = stored_name(original_name);
        let path = self.dir.join(&filename);
        std::fs::write(&path, data)?;
        info!("Stored upload {} as {:?} ({} bytes)", original_name, path, data.len());

        Ok(StoredImage {
            filename,
            original_name: original_name.to_string(),
            size: data.len(),
            path,
        })
    }

    /// Image files currently in the store, sorted by name
    pub fn list(&self) -> Result<Vec<ImageEntry>, UploadError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !is_image_name(&filename) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(ImageEntry {
                path: format!("/uploads/{}", filename),
                filename,
                size: metadata.len(),
            });
        }
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        debug!("Listed {} stored images", entries.len());
        Ok(entries)
    }

    /// Path of a stored image; names with path components are refused
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, UploadError> {
        let plain = Path::new(filename)
            .file_name()
            .map(|name| name == filename)
            .unwrap_or(false);
        if !plain {
            return Err(UploadError::NotFound(filename.to_string()));
        }
        let path = self.dir.join(filename);
        if !path.is_file() {
            return Err(UploadError::NotFound(filename.to_string()));
        }
        Ok(path)
    }
}

/// `image-{unix_millis}-{random below 1e9}{ext}`, keeping the original extension
pub fn stored_name(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = Uuid::new_v4().as_u128() % 1_000_000_000;
    let ext = Path::new(original_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    format!("{}-{}-{}{}", UPLOAD_FIELD, millis, random, ext)
}

fn is_image_name(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(max_bytes: usize) -> (TempDir, UploadStore) {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::open(dir.path().join("uploads"), max_bytes).unwrap();
        (dir, store)
    }

    #[test]
    fn test_stored_name_shape() {
        let name = stored_name("photo.JPG");
        let parts: Vec<&str> = name.trim_end_matches(".JPG").split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "image");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert!(parts[2].parse::<u64>().unwrap() < 1_000_000_000);
        assert!(name.ends_with(".JPG"));

        assert!(!stored_name("noext").contains('.'));
    }

    #[test]
    fn test_save_and_list() {
        let (_dir, store) = store(1024);
        let saved = store.save("beach.png", Some("image/png"), b"fake png").unwrap();
        assert_eq!(saved.size, 8);
        assert_eq!(saved.original_name, "beach.png");
        assert!(saved.path.exists());

        std::fs::write(store.dir().join("notes.txt"), "skip me").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, saved.filename);
        assert_eq!(listed[0].path, format!("/uploads/{}", saved.filename));
        assert_eq!(listed[0].size, 8);
    }

    #[test]
    fn test_rejects_non_image() {
        let (_dir, store) = store(1024);
        let err = store.save("doc.pdf", Some("application/pdf"), b"%PDF").unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(
            store.save("x.png", None, b"x"),
            Err(UploadError::NotAnImage)
        ));
    }

    #[test]
    fn test_rejects_oversize() {
        let (_dir, store) = store(4);
        let err = store.save("big.png", Some("image/png"), b"12345").unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: 4 }));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_refuses_traversal() {
        let (_dir, store) = store(1024);
        let saved = store.save("a.jpg", Some("image/jpeg"), b"jpg").unwrap();

        assert_eq!(store.resolve(&saved.filename).unwrap(), saved.path);
        assert!(matches!(
            store.resolve("../secret.jpg"),
            Err(UploadError::NotFound(_))
        ));
        assert!(matches!(
            store.resolve("missing.jpg"),
            Err(UploadError::NotFound(_))
        ));
    }

    #[test]
    fn test_io_error_is_server_error() {
        let err = UploadError::from(std::io::Error::other("disk full"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
