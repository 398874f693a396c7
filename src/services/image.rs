use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::config::MediaConfig;

/// Sub-directory of the media root that holds recipe pictures.
const RECIPE_IMAGE_DIR: &str = "recipes";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image must be a data URL of the form data:image/<type>;base64,<data>")]
    InvalidDataUrl,

    #[error("Image payload is not valid base64")]
    InvalidBase64,

    #[error("Unsupported image format; expected PNG, JPEG, GIF or WebP")]
    UnsupportedFormat,

    #[error("Image exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// Identify the format from the file signature.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Decode a `data:image/<type>;base64,<payload>` string. The declared type is
/// only checked to be an image; the stored format comes from the bytes.
pub fn decode_data_url(data: &str, max_bytes: usize) -> Result<DecodedImage, ImageError> {
    let (header, payload) = data
        .trim()
        .split_once(";base64,")
        .ok_or(ImageError::InvalidDataUrl)?;

    let (kind, subtype) = header.split_once('/').ok_or(ImageError::InvalidDataUrl)?;
    if !kind.eq_ignore_ascii_case("data:image") || subtype.is_empty() {
        return Err(ImageError::InvalidDataUrl);
    }

    // Reject before allocating when the encoded length already rules it out.
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(ImageError::TooLarge(max_bytes));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| ImageError::InvalidBase64)?;

    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge(max_bytes));
    }

    let format = ImageFormat::sniff(&bytes).ok_or(ImageError::UnsupportedFormat)?;

    Ok(DecodedImage { format, bytes })
}

/// Stores uploaded pictures under the media root and maps stored paths to
/// public URLs.
pub struct ImageService {
    root: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl ImageService {
    #[must_use]
    pub fn new(media: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&media.root),
            url_prefix: media.url_prefix.trim_end_matches('/').to_string(),
            max_bytes: media.max_image_bytes,
        }
    }

    /// Decode and persist a recipe picture. Returns the path relative to the
    /// media root, which is what the recipe row stores.
    pub async fn save_recipe_image(&self, data_url: &str) -> Result<String, ImageError> {
        let image = decode_data_url(data_url, self.max_bytes)?;

        let dir = self.root.join(RECIPE_IMAGE_DIR);
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), image.format.extension());
        let file_path = dir.join(&filename);

        fs::write(&file_path, &image.bytes).await?;
        info!(path = %file_path.display(), bytes = image.bytes.len(), "Stored recipe image");

        Ok(format!("{RECIPE_IMAGE_DIR}/{filename}"))
    }

    /// Best-effort removal of a stored picture.
    pub async fn remove(&self, relative: &str) {
        if relative.is_empty() || relative.contains("..") {
            return;
        }

        let path = self.root.join(relative);
        if let Err(e) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove image");
        }
    }

    #[must_use]
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative.trim_start_matches('/'))
    }
}
