//! Error types for extraction and archive building.
//!
//! Failures are isolated per request: a bad part never aborts its file, and a
//! bad file never aborts a batch. Only the request that hit the error fails.

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the extractor, the archive encoder and the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// No multipart boundary could be found in the header region.
    #[error("No MHTML boundary found")]
    BoundaryNotFound,

    /// A single MIME part could not be decoded. Recovered locally by the
    /// extractor, which drops the part and carries on.
    #[error("Failed to decode part: {reason}")]
    PartDecode { reason: String },

    /// The archive could not be serialized. No partial output is returned.
    #[error("Failed to build archive: {0}")]
    ArchiveBuild(String),

    /// The background engine stopped before answering.
    #[error("Engine is no longer running")]
    EngineClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn part_decode(reason: impl Into<String>) -> Self {
        Error::PartDecode {
            reason: reason.into(),
        }
    }

    pub(crate) fn archive_build(reason: impl Into<String>) -> Self {
        Error::ArchiveBuild(reason.into())
    }

    /// The copyable category carried in engine responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BoundaryNotFound => ErrorKind::BoundaryNotFound,
            Error::PartDecode { .. } => ErrorKind::PartDecodeFailure,
            Error::ArchiveBuild(_) | Error::Io(_) => ErrorKind::ArchiveBuildFailure,
            Error::EngineClosed => ErrorKind::EngineUnavailable,
        }
    }
}

/// Failure category reported to callers alongside a request id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BoundaryNotFound,
    PartDecodeFailure,
    ArchiveBuildFailure,
    EngineUnavailable,
    /// The worker failed while handling the request.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ErrorKind::BoundaryNotFound => "no MHTML boundary found",
            ErrorKind::PartDecodeFailure => "part could not be decoded",
            ErrorKind::ArchiveBuildFailure => "archive could not be built",
            ErrorKind::EngineUnavailable => "engine unavailable",
            ErrorKind::Internal => "internal worker failure",
        };
        f.write_str(text)
    }
}

impl std::error::Error for ErrorKind {}
