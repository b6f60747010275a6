use thiserror::Error;

use crate::readarr_client::ReadarrError;

/// Failure kinds of the primary add flow and the other portal operations.
/// Every orchestration step either succeeds or fails the whole operation
/// with exactly one of these; the post-add side-flow never surfaces here.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PortalError {
    /// Missing or malformed request field; the caller can correct and retry.
    #[error("{0}")]
    InvalidInput(String),

    /// The author lookup returned no candidates. Not retryable here; the
    /// book has to be added from an author Readarr already knows.
    #[error("Could not find author \"{0}\" in Readarr. Try searching for the author first in Readarr.")]
    AuthorNotFound(String),

    /// Readarr has no entries for a required configuration list.
    #[error("{0}")]
    BackendEmpty(&'static str),

    /// Any transport or application failure from Readarr.
    #[error(transparent)]
    Backend(#[from] ReadarrError),
}

impl PortalError {
    pub fn http_status(&self) -> u16 {
        match self {
            PortalError::InvalidInput(_) => 400,
            PortalError::AuthorNotFound(_) => 404,
            PortalError::BackendEmpty(_) => 500,
            PortalError::Backend(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_not_found_names_the_candidate() {
        let e = PortalError::AuthorNotFound("Jane Doe".into());
        assert!(e.to_string().contains("\"Jane Doe\""));
        assert_eq!(e.http_status(), 404);
    }

    #[test]
    fn backend_errors_map_to_500() {
        let e = PortalError::Backend(ReadarrError {
            message: "boom".into(),
            status: Some(503),
        });
        assert_eq!(e.http_status(), 500);
    }
}
