//! Errors for the session orchestration layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("netsync handshake failed: {0}")]
    Handshake(&'static str),

    #[error("netsync frame error: {0:?}")]
    Frame(hotsync_wire::Error),

    #[error("dlp error: {0}")]
    Dlp(#[from] hotsync_dlp::DlpError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<hotsync_wire::Error> for SessionError {
    fn from(e: hotsync_wire::Error) -> Self {
        SessionError::Frame(e)
    }
}

pub type Result<T> = core::result::Result<T, SessionError>;
