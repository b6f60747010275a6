use poem_openapi::payload::Json;
use serde_json::Value;

use crate::domain::library::{DownloadFilter, LibraryStats, group_by_author};
use crate::portal_api::models::{
    AuthorGroupDto, BooksResponseDto, ErrorDto, LibraryResponseDto, LibraryStatsDto,
    LibraryViewDto, SearchResponseDto,
};
use crate::readarr_client::{Book, ReadarrClient};

pub struct CatalogService<'a> {
    pub client: &'a ReadarrClient,
}

impl<'a> CatalogService<'a> {
    pub fn new(client: &'a ReadarrClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn search(&self, query: &str) -> SearchResponseDto {
        match self.client.lookup_books(query).await {
            Ok(books) => SearchResponseDto::Ok(Json(to_values(books))),
            Err(e) => {
                tracing::error!(error = %e, query, "book lookup failed");
                SearchResponseDto::Internal(Json(ErrorDto::from(&e.into())))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn books(&self) -> BooksResponseDto {
        match self.client.books().await {
            Ok(books) => BooksResponseDto::Ok(Json(to_values(books))),
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch book list");
                BooksResponseDto::Internal(Json(ErrorDto::from(&e.into())))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn library_view(&self, filter: DownloadFilter) -> LibraryResponseDto {
        let books = match self.client.books().await {
            Ok(books) => books,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch book list");
                return LibraryResponseDto::Internal(Json(ErrorDto::from(&e.into())));
            }
        };

        let stats = LibraryStats::of(&books);
        // group counts reflect the whole library; the filter only prunes
        // the listed books, and groups it empties disappear
        let authors = group_by_author(&books)
            .into_iter()
            .filter_map(|group| {
                let total_count = group.books.len() as u64;
                let downloaded_count = group.downloaded_count as u64;
                let books: Vec<Value> = group
                    .books
                    .into_iter()
                    .filter(|b| filter.matches(b))
                    .filter_map(|b| serde_json::to_value(b).ok())
                    .collect();
                if books.is_empty() {
                    return None;
                }
                Some(AuthorGroupDto {
                    author_id: group.author_id,
                    author_name: group.author_name,
                    total_count,
                    downloaded_count,
                    books,
                })
            })
            .collect();

        LibraryResponseDto::Ok(Json(LibraryViewDto {
            stats: LibraryStatsDto {
                total: stats.total as u64,
                downloaded: stats.downloaded as u64,
                missing: stats.missing as u64,
                downloaded_percent: stats.downloaded_percent,
            },
            authors,
        }))
    }
}

fn to_values(books: Vec<Book>) -> Vec<Value> {
    books
        .into_iter()
        .filter_map(|b| serde_json::to_value(b).ok())
        .collect()
}
