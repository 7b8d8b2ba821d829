use thiserror::Error;

/// Errors surfaced by the core operations (model calls and blueprint
/// publishing). Handlers map these onto user-visible reporting; the
/// operations themselves do no retries and no rollback.
#[derive(Error, Debug)]
pub enum ArchitectError {
    /// An API key or access token was empty.
    #[error("{0} is missing")]
    MissingCredential(&'static str),

    /// The target repository identifier was empty.
    #[error("Repo name is missing")]
    MissingTarget,

    /// The remote service rejected an operation. The message is the
    /// service's own response body, propagated verbatim.
    #[error("Remote service error: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// The request never reached the remote service.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ArchitectError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        ArchitectError::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Whether this failure means the target file does not exist yet.
    /// The HTTP status is authoritative when present; the substring
    /// match covers errors that carry no status.
    pub fn is_not_found(&self) -> bool {
        match self {
            ArchitectError::Remote {
                status: Some(code), ..
            } => *code == 404,
            ArchitectError::Remote {
                status: None,
                message,
            } => {
                let lower = message.to_lowercase();
                lower.contains("404") || lower.contains("not found")
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchitectError>;
