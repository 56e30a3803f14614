// FilePayload - files handed to `<input type=file>` elements
//
// A payload carries a name, a MIME type and the file bytes. Files given by
// path are read with tokio and typed from their extension.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// FilePayload represents a file with explicit name, MIME type and contents.
///
/// # Example
///
/// ```ignore
/// # use cdp_bridge::protocol::FilePayload;
/// let file = FilePayload::builder()
///     .name("document.pdf")
///     .buffer(vec![/* PDF bytes */])
///     .build()?;
/// assert_eq!(file.mime_type, "application/pdf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    /// File name
    pub name: String,
    /// MIME type
    pub mime_type: String,
    /// File contents as bytes
    pub buffer: Vec<u8>,
}

impl FilePayload {
    /// Creates a new builder for FilePayload
    pub fn builder() -> FilePayloadBuilder {
        FilePayloadBuilder::default()
    }

    /// Reads a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let buffer = tokio::fs::read(path)
            .await
            .map_err(|e| Error::from(e).context(format!("Failed to read {}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidArgument(format!("{} has no file name", path.display()))
            })?;
        Ok(Self {
            mime_type: mime_type_for(&name).to_string(),
            name,
            buffer,
        })
    }

    /// Shape consumed by the in-page file routine (base64 buffer).
    pub(crate) fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "mimeType": self.mime_type,
            "buffer": BASE64.encode(&self.buffer),
        })
    }
}

/// Builder for FilePayload
#[derive(Debug, Clone, Default)]
pub struct FilePayloadBuilder {
    name: Option<String>,
    mime_type: Option<String>,
    buffer: Option<Vec<u8>>,
}

impl FilePayloadBuilder {
    /// Sets the file name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the MIME type. Guessed from the name when not set.
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Sets the file buffer (contents as bytes)
    pub fn buffer(mut self, buffer: Vec<u8>) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Builds the FilePayload. The name is required.
    pub fn build(self) -> Result<FilePayload> {
        let name = self
            .name
            .ok_or_else(|| Error::InvalidArgument("name is required for FilePayload".into()))?;
        Ok(FilePayload {
            mime_type: self
                .mime_type
                .unwrap_or_else(|| mime_type_for(&name).to_string()),
            name,
            buffer: self.buffer.unwrap_or_default(),
        })
    }
}

/// A file to upload: a path read at upload time, or an in-memory payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFile {
    Path(PathBuf),
    Payload(FilePayload),
}

impl InputFile {
    pub async fn load(&self) -> Result<FilePayload> {
        match self {
            InputFile::Path(path) => FilePayload::from_path(path).await,
            InputFile::Payload(payload) => Ok(payload.clone()),
        }
    }
}

impl From<PathBuf> for InputFile {
    fn from(path: PathBuf) -> Self {
        InputFile::Path(path)
    }
}

impl From<&Path> for InputFile {
    fn from(path: &Path) -> Self {
        InputFile::Path(path.to_path_buf())
    }
}

impl From<FilePayload> for InputFile {
    fn from(payload: FilePayload) -> Self {
        InputFile::Payload(payload)
    }
}

/// MIME type guessed from a file name's extension.
pub fn mime_type_for(name: &str) -> &'static str {
    let Some((_, extension)) = name.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };
    match extension.to_ascii_lowercase().as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_guessing() {
        assert_eq!(mime_type_for("a.PNG"), "image/png");
        assert_eq!(mime_type_for("archive.tar.zip"), "application/zip");
        assert_eq!(mime_type_for("README"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for("data.unknown"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_builder_guesses_mime_type() {
        let payload = FilePayload::builder()
            .name("notes.txt")
            .buffer(b"hi".to_vec())
            .build()
            .unwrap();
        assert_eq!(payload.mime_type, "text/plain");

        let explicit = FilePayload::builder()
            .name("notes.txt")
            .mime_type("text/markdown")
            .build()
            .unwrap();
        assert_eq!(explicit.mime_type, "text/markdown");
        assert!(explicit.buffer.is_empty());
    }

    #[test]
    fn test_builder_requires_name() {
        assert!(matches!(
            FilePayload::builder().buffer(vec![1]).build(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_payload_json_is_base64() {
        let payload = FilePayload::builder()
            .name("a.bin")
            .buffer(vec![0, 1, 2, 255])
            .build()
            .unwrap();
        let json = payload.to_json();
        assert_eq!(json["name"], "a.bin");
        assert_eq!(json["mimeType"], DEFAULT_MIME_TYPE);
        assert_eq!(json["buffer"], "AAEC/w==");
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        tokio::fs::write(&path, b"jpeg bytes").await.unwrap();

        let payload = InputFile::from(path.clone()).load().await.unwrap();
        assert_eq!(payload.name, "photo.jpg");
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.buffer, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = FilePayload::from_path("/definitely/not/here.txt")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
