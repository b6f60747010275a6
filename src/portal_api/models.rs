use poem_openapi::{ApiResponse, Object, payload::Json};
use serde_json::Value;

use crate::error::PortalError;

#[derive(Debug, Clone, Object)]
pub struct ErrorDto {
    /// Human-readable error message
    pub error: String,
    /// Status reported by Readarr when the failure came from the backend
    pub status: Option<u16>,
    /// Raw error detail for diagnostics
    pub details: Option<String>,
}

impl ErrorDto {
    pub fn message(error: impl Into<String>) -> Self {
        ErrorDto {
            error: error.into(),
            status: None,
            details: None,
        }
    }
}

impl From<&PortalError> for ErrorDto {
    fn from(e: &PortalError) -> Self {
        let status = match e {
            PortalError::Backend(b) => b.status,
            _ => None,
        };
        ErrorDto {
            error: e.to_string(),
            status,
            details: None,
        }
    }
}

#[derive(ApiResponse)]
pub enum AddBookResponseDto {
    /// The created book record as Readarr returned it
    #[oai(status = 200)]
    Ok(Json<Value>),

    /// Missing title / author info / editions / foreignEditionId
    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    /// Author lookup produced no candidates
    #[oai(status = 404)]
    NotFound(Json<ErrorDto>),

    /// Readarr failure or misconfiguration
    #[oai(status = 500)]
    Internal(Json<ErrorDto>),
}

impl AddBookResponseDto {
    pub fn from_error(e: PortalError) -> Self {
        let dto = ErrorDto::from(&e);
        match e.http_status() {
            400 => AddBookResponseDto::BadRequest(Json(dto)),
            404 => AddBookResponseDto::NotFound(Json(dto)),
            _ => AddBookResponseDto::Internal(Json(dto)),
        }
    }
}

#[derive(ApiResponse)]
pub enum SearchResponseDto {
    /// Readarr lookup results, passed through
    #[oai(status = 200)]
    Ok(Json<Vec<Value>>),

    /// Missing query parameter
    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    /// Readarr failure
    #[oai(status = 500)]
    Internal(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum BooksResponseDto {
    /// The full Readarr book list, passed through
    #[oai(status = 200)]
    Ok(Json<Vec<Value>>),

    /// Readarr failure
    #[oai(status = 500)]
    Internal(Json<ErrorDto>),
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct LibraryStatsDto {
    pub total: u64,
    pub downloaded: u64,
    pub missing: u64,
    pub downloaded_percent: f64,
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct AuthorGroupDto {
    pub author_id: i64,
    pub author_name: String,
    /// Book count for the author before any filter is applied
    pub total_count: u64,
    pub downloaded_count: u64,
    pub books: Vec<Value>,
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct LibraryViewDto {
    pub stats: LibraryStatsDto,
    pub authors: Vec<AuthorGroupDto>,
}

#[derive(ApiResponse)]
pub enum LibraryResponseDto {
    /// Author-grouped library view with download statistics
    #[oai(status = 200)]
    Ok(Json<LibraryViewDto>),

    /// Readarr failure
    #[oai(status = 500)]
    Internal(Json<ErrorDto>),
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct SearchBooksRequestDto {
    pub book_ids: Option<Vec<i64>>,
}

#[derive(ApiResponse)]
pub enum SearchBooksResponseDto {
    /// Readarr's command record, passed through
    #[oai(status = 200)]
    Ok(Json<Value>),

    /// Missing or empty bookIds
    #[oai(status = 400)]
    BadRequest(Json<ErrorDto>),

    /// Readarr failure
    #[oai(status = 500)]
    Internal(Json<ErrorDto>),
}

#[derive(ApiResponse)]
pub enum QueueResponseDto {
    /// Readarr's queue page, passed through
    #[oai(status = 200)]
    Ok(Json<Value>),

    /// Readarr failure
    #[oai(status = 500)]
    Internal(Json<ErrorDto>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readarr_client::ReadarrError;

    #[test]
    fn backend_error_dto_carries_remote_status() {
        let e = PortalError::Backend(ReadarrError {
            message: "Author must have a metadata profile".into(),
            status: Some(400),
        });
        let dto = ErrorDto::from(&e);
        assert_eq!(dto.error, "Author must have a metadata profile");
        assert_eq!(dto.status, Some(400));
    }

    #[test]
    fn invalid_input_dto_has_no_status() {
        let dto = ErrorDto::from(&PortalError::InvalidInput("Book title is required".into()));
        assert_eq!(dto.error, "Book title is required");
        assert_eq!(dto.status, None);
    }
}
