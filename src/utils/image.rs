use std::{fmt, fs, path::Path, sync::LazyLock};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use regex::Regex;

use crate::{AppError, AppResult};

static DATA_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:(.+);base64,(.+)$").unwrap());

/// A user-selected image as a `data:<mime>;base64,<payload>` string.
///
/// This is the form kept on the user's message and shown as an inline
/// preview; providers pull it apart again with [`ImageData::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData(String);

/// MIME type and base64 payload recovered from an [`ImageData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl ImageData {
    /// Wraps an existing data URL without checking it.
    pub fn new(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    pub fn decode(&self) -> Option<InlineImage> {
        let captures = DATA_URL.captures(&self.0)?;

        Some(InlineImage {
            mime_type: captures[1].to_string(),
            data: captures[2].to_string(),
        })
    }

    /// Short label for terminal previews, e.g. `image/png, 12.3 KiB`.
    pub fn summary(&self) -> String {
        let decoded = self
            .decode()
            .and_then(|image| image.bytes().ok().map(|bytes| (image.mime_type, bytes.len())));

        match decoded {
            Some((mime_type, len)) => format!("{}, {:.1} KiB", mime_type, len as f64 / 1024.0),
            None => "unreadable image".to_string(),
        }
    }
}

impl fmt::Display for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl InlineImage {
    pub fn bytes(&self) -> AppResult<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| AppError::UnsupportedImage(format!("invalid base64 payload: {}", e)))
    }
}

pub fn encode_image(bytes: &[u8], mime_type: &str) -> AppResult<ImageData> {
    if !mime_type.starts_with("image/") {
        return Err(AppError::UnsupportedImage(format!(
            "{} is not an image type",
            mime_type
        )));
    }
    if bytes.is_empty() {
        return Err(AppError::UnsupportedImage("file is empty".to_string()));
    }

    Ok(ImageData::new(format!(
        "data:{};base64,{}",
        mime_type,
        BASE64.encode(bytes)
    )))
}

/// Reads an image from disk, guessing its MIME type from the extension.
pub fn load_image(path: &Path) -> AppResult<ImageData> {
    let mime = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .ok_or_else(|| {
            AppError::UnsupportedImage(format!("{} is not a recognised image", path.display()))
        })?;

    log::info!("Loading image {} as {}", path.display(), mime);
    let bytes = fs::read(path)?;
    encode_image(&bytes, mime.essence_str())
}
