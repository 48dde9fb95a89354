use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GenerationError, Result};
use crate::models::MediaKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    TextToImage,
    TextToVideo,
    ImageToImage,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 3] = [
        GenerationMode::TextToImage,
        GenerationMode::TextToVideo,
        GenerationMode::ImageToImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::TextToImage => "text-to-image",
            GenerationMode::TextToVideo => "text-to-video",
            GenerationMode::ImageToImage => "image-to-image",
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        match self {
            GenerationMode::TextToVideo => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }

    /// Image-to-image takes modification instructions rather than a required prompt.
    pub fn requires_prompt(&self) -> bool {
        !matches!(self, GenerationMode::ImageToImage)
    }

    pub fn requires_image(&self) -> bool {
        matches!(self, GenerationMode::ImageToImage)
    }
}

impl Default for GenerationMode {
    fn default() -> Self {
        GenerationMode::TextToImage
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        GenerationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| GenerationError::Validation(format!("Unsupported generation type: {}", s)))
    }
}

/// Video lengths offered by the front end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u32", into = "u32")]
pub enum VideoDuration {
    Ten,
    Twenty,
    Thirty,
    Sixty,
}

impl VideoDuration {
    pub const ALL: [VideoDuration; 4] = [
        VideoDuration::Ten,
        VideoDuration::Twenty,
        VideoDuration::Thirty,
        VideoDuration::Sixty,
    ];

    pub fn seconds(&self) -> u32 {
        match self {
            VideoDuration::Ten => 10,
            VideoDuration::Twenty => 20,
            VideoDuration::Thirty => 30,
            VideoDuration::Sixty => 60,
        }
    }
}

impl Default for VideoDuration {
    fn default() -> Self {
        VideoDuration::Thirty
    }
}

impl TryFrom<u32> for VideoDuration {
    type Error = GenerationError;

    fn try_from(seconds: u32) -> Result<Self> {
        VideoDuration::ALL
            .into_iter()
            .find(|duration| duration.seconds() == seconds)
            .ok_or_else(|| {
                GenerationError::Validation(format!("Unsupported video duration: {}s", seconds))
            })
    }
}

impl From<VideoDuration> for u32 {
    fn from(duration: VideoDuration) -> u32 {
        duration.seconds()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

impl ReferenceImage {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            GenerationError::Validation(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mime_type = mime_from_extension(path).to_string();
        let mut image = Self::new(bytes, mime_type);
        image.file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(String::from);
        Ok(image)
    }

    /// `data:<mime>;base64,<payload>`, keeping the original MIME type.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// One request as received by the adapter. `duration` stays the raw form value.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub mode: String,
    pub prompt: String,
    pub duration: Option<String>,
    pub image: Option<ReferenceImage>,
}

impl GenerationRequest {
    pub fn new(mode: GenerationMode, prompt: impl Into<String>) -> Self {
        Self {
            mode: mode.as_str().to_string(),
            prompt: prompt.into(),
            duration: None,
            image: None,
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_image(mut self, image: ReferenceImage) -> Self {
        self.image = Some(image);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub media_url: String,
}

/// Success body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    pub output: String,
}

impl From<GenerationResult> for GenerateResponse {
    fn from(result: GenerationResult) -> Self {
        GenerateResponse {
            output: result.media_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "text-to-video".parse::<GenerationMode>().unwrap(),
            GenerationMode::TextToVideo
        );
        let err = "image-to-video".parse::<GenerationMode>().unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
        assert_eq!(err.to_string(), "Unsupported generation type: image-to-video");
    }

    #[test]
    fn test_mode_media_kind() {
        assert_eq!(GenerationMode::TextToVideo.media_kind(), MediaKind::Video);
        assert_eq!(GenerationMode::ImageToImage.media_kind(), MediaKind::Image);
        assert!(!GenerationMode::ImageToImage.requires_prompt());
        assert!(GenerationMode::ImageToImage.requires_image());
    }

    #[test]
    fn test_duration_is_enumerated() {
        assert_eq!(VideoDuration::try_from(20).unwrap(), VideoDuration::Twenty);
        assert!(VideoDuration::try_from(45).is_err());
        assert_eq!(VideoDuration::default().seconds(), 30);
    }

    #[test]
    fn test_data_url_keeps_mime_type() {
        let image = ReferenceImage::new(b"abc".to_vec(), "image/webp");
        assert_eq!(image.to_data_url(), "data:image/webp;base64,YWJj");
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a/b.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_reference_image_from_path() {
        let file_name = format!("reference-{}.png", uuid::Uuid::new_v4());
        let path = std::env::temp_dir().join(&file_name);
        tokio::fs::write(&path, b"abc").await.unwrap();

        let image = ReferenceImage::from_path(&path).await;
        tokio::fs::remove_file(&path).await.unwrap();
        let image = image.unwrap();

        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.file_name.as_deref(), Some(file_name.as_str()));
        assert_eq!(image.bytes, b"abc");
        assert_eq!(image.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_reference_image_missing_path() {
        let path = std::env::temp_dir().join(format!("missing-{}.png", uuid::Uuid::new_v4()));
        let err = ReferenceImage::from_path(&path).await.unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
