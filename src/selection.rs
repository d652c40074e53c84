//! Staging an image for analysis: validating what the user picked, building
//! the local preview and producing the base 64 payload

use crate::error::{ClientError, Result};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use serde::Serialize;
use std::fmt::Debug;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::debug;

/// Where the bytes of a picked file live
#[derive(Clone)]
pub enum FileSource {
    /// A file on local disk. Read lazily, every time the bytes are needed
    Path(PathBuf),

    /// Bytes that are already in memory, e.g. an upload body
    Bytes(Vec<u8>),
}

impl Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSource::Path(path) => write!(f, "Path({})", path.display()),
            FileSource::Bytes(bytes) => write!(f, "Bytes(<{} bytes>)", bytes.len()),
        }
    }
}

/// A file that was dropped or picked, not yet validated
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub content_type: Option<String>,
    pub source: FileSource,
}

impl FileInput {
    /// A file on disk. The content type is guessed from its extension
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = ImageFormat::from_path(&path)
            .ok()
            .map(|format| format.to_mime_type().to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        FileInput {
            name,
            content_type,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: String, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        FileInput {
            name,
            content_type,
            source: FileSource::Bytes(bytes),
        }
    }
}

/// True when the top-level MIME type is `image`, e.g. `image/png` or
/// `IMAGE/JPEG; q=1`
pub fn is_image_type(content_type: &str) -> bool {
    match content_type.split_once('/') {
        Some((top, sub)) => top.trim().eq_ignore_ascii_case("image") && !sub.trim().is_empty(),
        None => false,
    }
}

/// The image currently staged for analysis
#[derive(Debug, Clone)]
pub struct SelectedImage {
    name: String,
    mime: String,
    source: FileSource,
}

impl SelectedImage {
    /// Validate a picked file. Fails when nothing was picked or the file is
    /// not an image
    pub fn from_input(input: Option<FileInput>) -> Result<Self> {
        let input = input.ok_or(ClientError::Validation)?;
        let mime = match input.content_type {
            Some(ty) if is_image_type(&ty) => ty,
            _ => return Err(ClientError::Validation),
        };

        Ok(SelectedImage {
            name: input.name,
            mime,
            source: input.source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Read the raw bytes of the file
    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => Ok(tokio::fs::read(path).await?),
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    /// Base 64 encode the file, without any `data:` prefix
    pub async fn encode(&self) -> Result<String> {
        let bytes = self.read().await?;
        debug!("encoding {} ({} bytes)", self.name, bytes.len());
        Ok(general_purpose::STANDARD.encode(bytes))
    }

    /// Build the local preview shown before analysis
    pub async fn preview(&self) -> Result<Preview> {
        let bytes = self.read().await?;

        // Not every image/* type is decodable here. A preview without
        // dimensions is still a preview
        let dimensions = image::io::Reader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok());

        Ok(Preview {
            data_uri: format!(
                "data:{};base64,{}",
                self.mime,
                general_purpose::STANDARD.encode(&bytes)
            ),
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
        })
    }
}

/// What the preview area shows
#[derive(Clone, Serialize, PartialEq)]
pub struct Preview {
    pub data_uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Preview {{ data_uri: <data>, width: {:?}, height: {:?} }}",
            self.width, self.height
        )
    }
}
