//! Single-image upload surface

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extensions accepted by the picker and the drop zone
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["jpeg", "jpg", "png", "gif", "bmp", "webp"];

/// Raster MIME types accepted regardless of file name
pub const ACCEPTED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

/// Size shown in the UI hint; not enforced
pub const SIZE_HINT_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("upload is disabled while a detection run is in progress")]
    Disabled,

    #[error("no file selected")]
    NoFile,

    #[error("only one image can be uploaded at a time (got {0})")]
    TooManyFiles(usize),

    #[error("{0} is not a supported image type")]
    Unsupported(String),
}

/// File metadata available before the contents are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

/// An accepted image, decoded into a data URL for local preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub data_url: String,
}

impl UploadedImage {
    /// Size in megabytes with two decimals, e.g. `1.25 MB`
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }

    pub fn exceeds_size_hint(&self) -> bool {
        self.size > SIZE_HINT_BYTES
    }
}

/// Whether a file looks like a supported raster image
pub fn is_accepted(mime: &str, name: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    if ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
        return true;
    }
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

#[derive(Debug, Clone, Default)]
pub struct UploadSurface {
    preview: Option<UploadedImage>,
    disabled: bool,
}

impl UploadSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> Option<&UploadedImage> {
        self.preview.as_ref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Check a dropped or picked file list before reading it.
    ///
    /// Returns the index of the file to read.
    pub fn validate(&self, files: &[FileCandidate]) -> Result<usize, UploadError> {
        if self.disabled {
            return Err(UploadError::Disabled);
        }
        match files {
            [] => Err(UploadError::NoFile),
            [file] if is_accepted(&file.mime, &file.name) => Ok(0),
            [file] => Err(UploadError::Unsupported(file.name.clone())),
            many => Err(UploadError::TooManyFiles(many.len())),
        }
    }

    /// Install a decoded image as the current preview
    pub fn accept(&mut self, image: UploadedImage) -> Result<&UploadedImage, UploadError> {
        if self.disabled {
            return Err(UploadError::Disabled);
        }
        if !is_accepted(&image.mime, &image.name) {
            return Err(UploadError::Unsupported(image.name));
        }
        if image.exceeds_size_hint() {
            tracing::warn!("{} is {}, above the upload hint", image.name, image.size_label());
        }
        Ok(self.preview.insert(image))
    }

    /// Drop the preview; returns whether there was one
    pub fn clear(&mut self) -> bool {
        self.preview.take().is_some()
    }
}
