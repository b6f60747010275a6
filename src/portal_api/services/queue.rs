use poem_openapi::payload::Json;

use crate::portal_api::models::{ErrorDto, QueueResponseDto, SearchBooksResponseDto};
use crate::readarr_client::{CommandRequest, ReadarrClient};

pub struct QueueService<'a> {
    pub client: &'a ReadarrClient,
}

impl<'a> QueueService<'a> {
    pub fn new(client: &'a ReadarrClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn queue(&self) -> QueueResponseDto {
        match self.client.queue().await {
            Ok(page) => QueueResponseDto::Ok(Json(page)),
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch queue");
                QueueResponseDto::Internal(Json(ErrorDto::message("Failed to fetch download queue")))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn search_books(&self, book_ids: Vec<i64>) -> SearchBooksResponseDto {
        if book_ids.is_empty() {
            return SearchBooksResponseDto::BadRequest(Json(ErrorDto::message(
                "bookIds array is required",
            )));
        }
        match self
            .client
            .command(&CommandRequest::BookSearch { book_ids })
            .await
        {
            Ok(result) => SearchBooksResponseDto::Ok(Json(result)),
            Err(e) => {
                tracing::error!(error = %e, "failed to trigger book search");
                SearchBooksResponseDto::Internal(Json(ErrorDto::message(
                    "Failed to trigger book search",
                )))
            }
        }
    }
}
