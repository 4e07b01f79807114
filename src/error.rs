use thiserror::Error;

use crate::models::PayloadError;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

/// Which branch of the failure taxonomy an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Status,
    Malformed,
    Other,
}

impl DashboardError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DashboardError::Http(_) => FailureKind::Transport,
            DashboardError::Status { .. } => FailureKind::Status,
            DashboardError::Payload(_) => FailureKind::Malformed,
            DashboardError::Io(_) | DashboardError::Settings(_) | DashboardError::Other(_) => {
                FailureKind::Other
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
