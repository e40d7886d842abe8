use std::fmt;

pub type Result<T> = std::result::Result<T, DocError>;

/// Failures that abort a document build. Missing optional fields and images
/// that cannot be embedded are handled inside the build and never show up here.
#[derive(Debug)]
pub enum DocError {
    FontUnavailable(String),
    Encoding { section: String, text: String },
    InvalidInput(String),
    InvalidConfiguration(String),
    Io(std::io::Error),
}

impl DocError {
    /// The script step that failed, when the error carries one.
    pub fn section(&self) -> Option<&str> {
        match self {
            DocError::Encoding { section, .. } => Some(section),
            _ => None,
        }
    }
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocError::FontUnavailable(name) => {
                write!(f, "font is not one of the built-in faces: {}", name)
            }
            DocError::Encoding { section, text } => write!(
                f,
                "text in section '{}' contains characters the built-in fonts cannot encode: {}",
                section, text
            ),
            DocError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            DocError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            DocError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for DocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DocError {
    fn from(value: std::io::Error) -> Self {
        DocError::Io(value)
    }
}

impl From<serde_json::Error> for DocError {
    fn from(value: serde_json::Error) -> Self {
        DocError::InvalidInput(value.to_string())
    }
}
