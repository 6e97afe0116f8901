use std::path::PathBuf;

use image::ImageError;

/// Failures from the collaborators around the view geometry: decoding,
/// font lookup, catalog parsing and export.
#[derive(Debug)]
pub enum IwtError {
    Io(std::io::Error),
    Image(ImageError),
    EmptyImage { path: PathBuf },
    Font(String),
    InvalidSize(String),
    Catalog(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IwtError>;

impl std::fmt::Display for IwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IwtError::Io(e) => write!(f, "I/O error: {}", e),
            IwtError::Image(e) => write!(f, "image error: {}", e),
            IwtError::EmptyImage { path } => {
                write!(f, "'{}' decodes to an empty image", path.display())
            }
            IwtError::Font(msg) => write!(f, "font error: {}", msg),
            IwtError::InvalidSize(msg) => write!(f, "invalid size: {}", msg),
            IwtError::Catalog(e) => write!(f, "font catalog error: {}", e),
        }
    }
}

impl std::error::Error for IwtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IwtError::Io(e) => Some(e),
            IwtError::Image(e) => Some(e),
            IwtError::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IwtError {
    fn from(e: std::io::Error) -> Self {
        IwtError::Io(e)
    }
}

impl From<ImageError> for IwtError {
    fn from(e: ImageError) -> Self {
        IwtError::Image(e)
    }
}

impl From<serde_json::Error> for IwtError {
    fn from(e: serde_json::Error) -> Self {
        IwtError::Catalog(e)
    }
}
