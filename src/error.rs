//! Error types for the content layer

/// Errors that can occur while loading or managing content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// File could not be read
    IoError(String),
    /// File does not exist
    NotFound(String),
    /// Bytes could not be decoded into the requested kind
    DecodeError(String),
    /// Bundle manifest is malformed
    ManifestError(String),
    /// No loader is registered for a kind
    UnknownKind(String),
    /// Content is currently borrowed and cannot be re-populated
    Busy(String),
    /// Configuration could not be read or parsed
    ConfigError(String),
    /// A listener rejected a notification
    ListenerError(String),
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::NotFound(path) => write!(f, "File not found: {path}"),
            Self::DecodeError(e) => write!(f, "Decode error: {e}"),
            Self::ManifestError(e) => write!(f, "Manifest error: {e}"),
            Self::UnknownKind(kind) => write!(f, "No loader for content kind '{kind}'"),
            Self::Busy(path) => write!(f, "Content '{path}' is borrowed elsewhere"),
            Self::ConfigError(e) => write!(f, "Config error: {e}"),
            Self::ListenerError(e) => write!(f, "Listener error: {e}"),
        }
    }
}

impl std::error::Error for ContentError {}
