//! Error kinds surfaced by the project endpoints.

use thiserror::Error;

/// Why a project operation did not complete.
///
/// Internals work with `anyhow::Result`; the handlers classify failures into
/// one of these kinds so the response status can tell "bad input" apart from
/// "quota" and from "an upstream service broke".
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The downloaded file or path has an extension the loader can't read.
    #[error("Document format is not supported: {0}")]
    UnsupportedFormat(String),

    /// Ingesting would push the project past its page ceiling.
    #[error("Page limit exceeded: {existing} existing + {incoming} new > {limit}")]
    PageLimitExceeded {
        existing: usize,
        incoming: usize,
        limit: usize,
    },

    /// The request is missing something required.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network, SDK, or parsing failure in a collaborator.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ProjectError>;
