use std::path::PathBuf;
use thiserror::Error;

/// Every way an invocation of `how` can fail.
///
/// `Persist` doubles as the warning raised by best-effort writes; callers on
/// those paths log it and carry on.
#[derive(Debug, Error)]
pub enum HowError {
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Api(String),

    #[error("{0}")]
    Usage(String),

    #[error("could not write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write output: {0}")]
    Output(#[source] std::io::Error),
}

impl HowError {
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    /// Line shown to the user when this error ends the invocation.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(reason) => format!("❌ Authentication Error: {}", reason),
            Self::Usage(reason) => format!("Error: {}", reason),
            Self::Api(_) | Self::Persist { .. } | Self::Output(_) => format!("💥 Error: {}", self),
        }
    }

    pub fn exit_code(&self) -> u8 {
        1
    }
}
