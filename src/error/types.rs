use thiserror::Error;

/// Unified result type for the leveling engine.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Errors surfaced by controller passes.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("pass hook `{name}` failed: {message}")]
    Hook { name: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MatchError {
    /// Build a hook failure from any displayable cause.
    pub fn hook(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Hook {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
