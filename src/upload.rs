//! Transient storage for uploaded files
//!
//! Each upload is streamed to its own file under the upload directory and
//! owned by a [`TempUpload`]. Dropping the guard deletes the file, so every
//! exit path of a request (success, model failure, early rejection) cleans up.

use crate::error::{AppError, AppResult};
use axum::extract::Multipart;
use axum::extract::multipart::Field;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Content type assumed when the client does not send one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Directory that holds in-flight uploads
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store, creating `dir` if it does not exist yet
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream one multipart field to a freshly named file
    pub async fn persist(&self, mut field: Field<'_>) -> AppResult<TempUpload> {
        let path = self.dir.join(Uuid::new_v4().simple().to_string());
        let mime_type = field
            .content_type()
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let original_name = field.file_name().map(str::to_string);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Upload(format!("could not create {}: {}", path.display(), e)))?;

        // From here on the guard owns the file, partial writes included.
        let mut upload = TempUpload {
            path,
            mime_type,
            original_name,
            size: 0,
        };

        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::Upload(e.to_string()))?;
            upload.size += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        tracing::debug!(
            path = %upload.path.display(),
            mime_type = %upload.mime_type,
            size = upload.size,
            "Stored upload"
        );

        Ok(upload)
    }
}

/// An uploaded file on disk, removed when dropped
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    mime_type: String,
    original_name: Option<String>,
    size: u64,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read the whole file into memory
    pub async fn read(&self) -> AppResult<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::Upload(format!("could not read {}: {}", self.path.display(), e))
        })
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed temporary upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove temporary upload"
            ),
        }
    }
}

/// Fields of an upload form: one file and an optional prompt
#[derive(Debug, Default)]
pub struct MediaForm {
    pub file: Option<TempUpload>,
    pub prompt: Option<String>,
}

impl MediaForm {
    /// Read the whole form, keeping at most one file and only under `file_field`.
    ///
    /// A file under any other name, or a second file, is rejected with
    /// `Unexpected field: <name>`. Text fields other than `prompt` are ignored.
    pub async fn read(
        store: &UploadStore,
        mut multipart: Multipart,
        file_field: &str,
    ) -> AppResult<Self> {
        let mut form = MediaForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if field.file_name().is_some() {
                if name != file_field || form.file.is_some() {
                    return Err(AppError::Validation(format!("Unexpected field: {}", name)));
                }
                form.file = Some(store.persist(field).await?);
            } else if name == "prompt" {
                form.prompt = Some(field.text().await?);
            }
        }

        Ok(form)
    }
}
