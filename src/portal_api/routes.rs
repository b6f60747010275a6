use std::sync::Arc;

use poem_openapi::{
    OpenApi,
    param::Query,
    payload::{Json, PlainText},
};
use serde_json::Value;

use super::models::{
    AddBookResponseDto, BooksResponseDto, ErrorDto, LibraryResponseDto, QueueResponseDto,
    SearchBooksRequestDto, SearchBooksResponseDto, SearchResponseDto,
};
use super::services::{
    add_book::AddBookService, catalog::CatalogService, health::HealthService, queue::QueueService,
};
use crate::domain::library::DownloadFilter;
use crate::readarr_client::ReadarrClient;

pub struct PortalApi {
    pub client: Arc<ReadarrClient>,
}

#[OpenApi]
impl PortalApi {
    /// Readarr reachability probe
    #[oai(path = "/status", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn status(&self) -> PlainText<String> {
        HealthService::new(&self.client).status_text().await
    }

    /// Search the metadata catalog via Readarr's lookup endpoint
    #[oai(path = "/api/search", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, q))]
    async fn search(
        &self,
        /// Search term, e.g. a title or "author title"
        Query(q): Query<Option<String>>,
    ) -> SearchResponseDto {
        let Some(query) = q.filter(|q| !q.is_empty()) else {
            return SearchResponseDto::BadRequest(Json(ErrorDto::message(
                "Query parameter 'q' is required",
            )));
        };
        CatalogService::new(&self.client).search(&query).await
    }

    /// The full Readarr book list
    #[oai(path = "/api/books", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn books(&self) -> BooksResponseDto {
        CatalogService::new(&self.client).books().await
    }

    /// Library view grouped by author, with download statistics
    #[oai(path = "/api/library", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, filter))]
    async fn library(
        &self,
        /// "all" (default), "downloaded" or "missing"
        Query(filter): Query<Option<String>>,
    ) -> LibraryResponseDto {
        let filter = DownloadFilter::parse(filter.as_deref());
        CatalogService::new(&self.client).library_view(filter).await
    }

    /// Request a book: resolves the author, fills in editions and defaults,
    /// submits the add command and schedules the follow-up search
    #[oai(path = "/api/books/add", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn add_book(&self, body: Json<Value>) -> AddBookResponseDto {
        AddBookService::new(&self.client).add(body.0).await
    }

    /// Trigger one batched search for the given book ids
    #[oai(path = "/api/command/search-books", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn search_books(&self, body: Json<SearchBooksRequestDto>) -> SearchBooksResponseDto {
        QueueService::new(&self.client)
            .search_books(body.0.book_ids.unwrap_or_default())
            .await
    }

    /// Download queue passthrough
    #[oai(path = "/api/queue", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn queue(&self) -> QueueResponseDto {
        QueueService::new(&self.client).queue().await
    }
}
