use std::sync::Arc;
use std::time::Duration;

use poem_openapi::payload::Json;
use serde_json::Value;

use crate::domain::author::derive_author_name;
use crate::domain::editions::ensure_editions;
use crate::domain::library::is_downloaded;
use crate::error::PortalError;
use crate::portal_api::models::{AddBookResponseDto, ErrorDto};
use crate::portal_api::services::author::AuthorResolver;
use crate::readarr_client::{
    AddBookPayload, AddOptions, Author, Book, CommandRequest, Edition, ReadarrClient, ReadarrError,
};

/// Orchestrates a book add end to end: validate the input, resolve or accept
/// the author, make sure editions exist, default profile and root folder,
/// submit to Readarr, then kick off the detached refresh-and-search flow.
///
/// Each step either succeeds or fails the whole operation with one specific
/// error kind. Nothing is retried; resubmitting an add risks duplicates.
pub struct AddBookService<'a> {
    pub client: &'a Arc<ReadarrClient>,
}

impl<'a> AddBookService<'a> {
    pub fn new(client: &'a Arc<ReadarrClient>) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self, body))]
    pub async fn add(&self, body: Value) -> AddBookResponseDto {
        let book: Book = match serde_json::from_value(body) {
            Ok(book) => book,
            Err(e) => {
                return AddBookResponseDto::BadRequest(Json(ErrorDto {
                    error: "Invalid book payload".to_string(),
                    status: None,
                    details: Some(e.to_string()),
                }));
            }
        };

        match self.orchestrate(book).await {
            Ok(added) => {
                if let Some(author_id) = added.author_id {
                    // Detached on purpose: the response must not wait for the
                    // refresh flow, and its failures must not reach the caller.
                    tokio::spawn(run_post_add_flow(Arc::clone(self.client), author_id));
                } else {
                    tracing::debug!("created record has no author id, skipping post-add flow");
                }
                AddBookResponseDto::Ok(Json(added.record))
            }
            Err(e) => {
                tracing::error!(error = %e, "book add failed");
                AddBookResponseDto::from_error(e)
            }
        }
    }

    async fn orchestrate(&self, mut book: Book) -> Result<AddedBook, PortalError> {
        let title = book
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PortalError::InvalidInput("Book title is required".to_string()))?;

        // Lookup results carry no structured author, only the composite
        // authorTitle string; Readarr rejects an add whose author has no
        // foreignAuthorId, so a lookup round-trip is mandatory here.
        if book.author.is_none() {
            if let Some(author_title) = book.author_title.clone() {
                let candidate = derive_author_name(&author_title, &title);
                tracing::debug!(%candidate, %author_title, "resolving author from authorTitle");
                let author = AuthorResolver::new(self.client).resolve(&candidate).await?;
                book.author = Some(author);
            }
        }

        let editions = ensure_editions(&book)?;

        let mut author = book.author.take().ok_or_else(|| {
            PortalError::InvalidInput(
                "Book author information is required but could not be constructed".to_string(),
            )
        })?;

        let quality_profile_id = match book.quality_profile_id.filter(|id| *id != 0) {
            Some(id) => id,
            None => {
                let profiles = self.client.quality_profiles().await?;
                profiles
                    .first()
                    .map(|p| p.id)
                    .ok_or(PortalError::BackendEmpty("No quality profiles found in Readarr"))?
            }
        };

        let root_folder_path = match book.root_folder_path.clone().filter(|p| !p.is_empty()) {
            Some(path) => path,
            None => {
                let folders = self.client.root_folders().await?;
                folders
                    .first()
                    .map(|f| f.path.clone())
                    .ok_or(PortalError::BackendEmpty("No root folders found in Readarr"))?
            }
        };

        author.monitored = Some(true);
        author.monitor_new_items = Some("all".to_string());

        let payload = assemble_payload(
            &book,
            title,
            author,
            editions,
            quality_profile_id,
            root_folder_path,
        );
        tracing::info!(
            title = %payload.title,
            foreign_book_id = ?payload.foreign_book_id,
            quality_profile_id = payload.quality_profile_id,
            "submitting add command to Readarr"
        );

        let record = self.client.add_book(&payload).await?;
        let author_id =
            created_author_id(&record).or(payload.author.id.filter(|id| *id != 0));
        Ok(AddedBook { record, author_id })
    }
}

struct AddedBook {
    record: Value,
    author_id: Option<i64>,
}

/// Readarr uses 0 for "no profile assigned"; absent and zero both count as
/// unset.
pub(crate) fn unset_id(id: Option<i64>) -> bool {
    id.unwrap_or(0) == 0
}

fn assemble_payload(
    book: &Book,
    title: String,
    author: Author,
    editions: Vec<Edition>,
    quality_profile_id: i64,
    root_folder_path: String,
) -> AddBookPayload {
    AddBookPayload {
        title,
        title_slug: book.title_slug.clone(),
        monitored: true,
        any_edition_ok: book.any_edition_ok.unwrap_or(true),
        author_id: book.author_id.unwrap_or(0),
        foreign_book_id: book.foreign_book_id.clone(),
        quality_profile_id,
        metadata_profile_id: author.metadata_profile_id.filter(|id| *id != 0).unwrap_or(1),
        root_folder_path,
        editions,
        author,
        add_options: AddOptions::default(),
    }
}

fn created_author_id(record: &Value) -> Option<i64> {
    record
        .get("author")
        .and_then(|a| a.get("id"))
        .and_then(Value::as_i64)
        .filter(|id| *id != 0)
}

const REFRESH_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Best-effort follow-up after a successful add: refresh the author so
/// Readarr syncs their full catalog, then queue one batched search for every
/// book of theirs that still has no file. Runs detached from the request;
/// failures are logged and swallowed.
pub(crate) async fn run_post_add_flow(client: Arc<ReadarrClient>, author_id: i64) {
    if let Err(e) = post_add_flow(&client, author_id).await {
        tracing::warn!(error = %e, author_id, "post-add refresh flow failed");
    }
}

async fn post_add_flow(client: &ReadarrClient, author_id: i64) -> Result<(), ReadarrError> {
    client
        .command(&CommandRequest::RefreshAuthor { author_id })
        .await?;

    // RefreshAuthor is asynchronous and its completion is not signalled to
    // us; give Readarr a fixed window to finish syncing before sweeping.
    tokio::time::sleep(REFRESH_SETTLE_DELAY).await;

    let books = client.books().await?;
    let missing = missing_book_ids(&books, author_id);
    tracing::info!(author_id, missing = missing.len(), "post-add missing-book sweep");
    if !missing.is_empty() {
        client
            .command(&CommandRequest::BookSearch { book_ids: missing })
            .await?;
    }
    Ok(())
}

fn missing_book_ids(books: &[Book], author_id: i64) -> Vec<i64> {
    books
        .iter()
        .filter(|b| {
            b.author.as_ref().and_then(|a| a.id) == Some(author_id)
                || b.author_id == Some(author_id)
        })
        .filter(|b| !is_downloaded(b))
        .filter_map(|b| b.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_id_treats_zero_as_unset() {
        assert!(unset_id(None));
        assert!(unset_id(Some(0)));
        assert!(!unset_id(Some(7)));
    }

    #[test]
    fn assembles_the_dune_add_command() {
        let book: Book = serde_json::from_value(json!({
            "title": "Dune",
            "authorTitle": "Herbert, Frank Dune",
            "titleSlug": "fb1-dune",
            "foreignBookId": "fb1",
            "foreignEditionId": "fe1"
        }))
        .unwrap();

        // the resolver's output for the one lookup match, profile list
        // [{id: 7}] and root folder list [{path: "/books"}]
        let mut author: Author = serde_json::from_value(json!({
            "id": 0,
            "authorName": "Frank Herbert",
            "foreignAuthorId": "fa1",
            "qualityProfileId": 7,
            "path": "/books/Frank Herbert"
        }))
        .unwrap();
        author.monitored = Some(true);
        author.monitor_new_items = Some("all".to_string());

        let editions = ensure_editions(&book).unwrap();
        let payload = assemble_payload(
            &book,
            "Dune".to_string(),
            author,
            editions,
            7,
            "/books".to_string(),
        );

        assert_eq!(payload.quality_profile_id, 7);
        assert_eq!(payload.root_folder_path, "/books");
        assert_eq!(payload.metadata_profile_id, 1);
        assert!(payload.monitored);
        assert!(payload.any_edition_ok);
        assert_eq!(payload.author.monitored, Some(true));
        assert_eq!(payload.author.foreign_author_id.as_deref(), Some("fa1"));
        assert_eq!(payload.editions.len(), 1);
        assert_eq!(payload.editions[0].foreign_edition_id, "fe1");
        assert!(payload.editions[0].monitored);

        let wire = serde_json::to_value(&payload).unwrap();
        assert_eq!(wire["foreignBookId"], "fb1");
        assert_eq!(wire["authorId"], 0);
        assert_eq!(
            wire["addOptions"],
            json!({"monitor": "all", "searchForNewBook": true, "searchForMissingBook": false})
        );
    }

    #[test]
    fn explicit_quality_profile_is_kept_verbatim() {
        // Some(7) means DEFAULT_PROFILE_AND_PATH never fetches the list
        assert!(!unset_id(Some(7)));
        let book: Book = serde_json::from_value(json!({
            "title": "Dune",
            "foreignEditionId": "fe1",
            "qualityProfileId": 7
        }))
        .unwrap();
        assert_eq!(book.quality_profile_id.filter(|id| *id != 0), Some(7));
    }

    #[test]
    fn created_author_id_reads_the_nested_record() {
        assert_eq!(
            created_author_id(&json!({"id": 5, "author": {"id": 42}})),
            Some(42)
        );
        assert_eq!(created_author_id(&json!({"id": 5, "author": {"id": 0}})), None);
        assert_eq!(created_author_id(&json!({"id": 5})), None);
    }

    #[test]
    fn missing_sweep_selects_the_authors_fileless_books() {
        let books: Vec<Book> = serde_json::from_value(json!([
            {"id": 1, "authorId": 42},
            {"id": 2, "authorId": 42, "statistics": {"bookFileCount": 0}},
            {"id": 3, "authorId": 42, "statistics": {"bookFileCount": 1}},
            {"id": 4, "author": {"id": 42, "authorName": "Frank Herbert"}},
            {"id": 5, "authorId": 7},
            {"authorId": 42}
        ]))
        .unwrap();

        assert_eq!(missing_book_ids(&books, 42), vec![1, 2, 4]);
    }
}
