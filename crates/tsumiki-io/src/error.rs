use thiserror::Error;

/// Failures reading or writing a scene file.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scene parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scene encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}
