//! Error types

use thiserror::Error;

/// Enum to hold various error types
///
/// Only [`CrosslineError::ReadError`], [`CrosslineError::WriteError`],
/// [`CrosslineError::History`] and [`CrosslineError::Platform`] ever
/// reach the caller of
/// [`crate::editor::Editor::readline`]. The remaining variants are
/// raised by the terminal and decoder layers and turned into a
/// [`crate::editor::ReadOutcome`] by the read loop.
#[derive(Debug, Error)]
pub enum CrosslineError {
    /// Escape sequence did not match any known key
    #[error("escape sequence did not match any known key")]
    DecodeAmbiguous,
    /// Terminal did not answer a size or cursor position query
    #[error("terminal did not answer the query")]
    TerminalQueryFailure,
    /// Input stream closed
    #[error("end of input")]
    InputEof,
    /// Read interrupted by the user
    #[error("interrupted")]
    UserAbort,
    /// Input did not match any of the offered choices
    #[error("input did not match any choice")]
    RestrictedChoiceRejected,
    #[error("read error: {0:?}")]
    ReadError(embedded_io::ErrorKind),
    #[error("write error: {0:?}")]
    WriteError(embedded_io::ErrorKind),
    #[error("history file: {0}")]
    History(#[from] std::io::Error),
    /// Raw mode or signal setup failed
    #[error("terminal setup: {0}")]
    Platform(std::io::Error),
}

impl embedded_io::Error for CrosslineError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            CrosslineError::DecodeAmbiguous => embedded_io::ErrorKind::InvalidData,
            CrosslineError::TerminalQueryFailure => embedded_io::ErrorKind::TimedOut,
            CrosslineError::InputEof => embedded_io::ErrorKind::BrokenPipe,
            CrosslineError::UserAbort => embedded_io::ErrorKind::Interrupted,
            CrosslineError::RestrictedChoiceRejected => embedded_io::ErrorKind::InvalidInput,
            CrosslineError::ReadError(kind) | CrosslineError::WriteError(kind) => *kind,
            CrosslineError::History(e) | CrosslineError::Platform(e) => e.kind().into(),
        }
    }
}
