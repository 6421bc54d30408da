use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["svg", "png", "jpg", "jpeg", "gif"];

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("File exceeds the maximum size of {}", format_size_limit(*max_bytes))]
    TooLarge { size: u64, max_bytes: u64 },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A picked image encoded as a `data:` URL, usable both as `<img src>` and as
/// the product's image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub file_name: String,
    pub data_url: String,
}

fn format_size_limit(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "svg" => Some("image/svg+xml"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

pub fn load_image_preview(path: &Path, max_bytes: u64) -> Result<ImagePreview, PreviewError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let mime = mime_for_extension(ext).ok_or_else(|| PreviewError::UnsupportedType(ext.to_string()))?;

    let size = std::fs::metadata(path)
        .map_err(|source| PreviewError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > max_bytes {
        return Err(PreviewError::TooLarge {
            size,
            max_bytes,
        });
    }

    let bytes = std::fs::read(path).map_err(|source| PreviewError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();

    Ok(ImagePreview {
        file_name,
        data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
    })
}
