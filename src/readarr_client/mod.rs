use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// One error type for everything the Readarr API can throw at us. `status`
/// is the remote HTTP status when the failure came from Readarr itself;
/// `None` means we never got a usable response (DNS, refused, timeout,
/// unparseable body).
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ReadarrError {
    pub message: String,
    pub status: Option<u16>,
}

impl ReadarrError {
    fn connect(cause: impl std::fmt::Display) -> Self {
        ReadarrError {
            message: format!("Failed to connect to Readarr: {}", cause),
            status: None,
        }
    }

    /// Readarr error bodies are either `{"message": "..."}`, a bare JSON
    /// string, or something else entirely (HTML, validation arrays).
    fn from_response(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<Value>(body) {
            Ok(Value::String(s)) => s,
            Ok(v) => v
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "Readarr API error: {}",
                        status.canonical_reason().unwrap_or("unknown")
                    )
                }),
            Err(_) => format!(
                "Readarr API error: {}",
                status.canonical_reason().unwrap_or("unknown")
            ),
        };
        ReadarrError {
            message,
            status: Some(status.as_u16()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReadarrClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ReadarrClient {
    /// Create a new client for the given Readarr instance
    /// (e.g. "http://localhost:8787").
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating ReadarrClient");
        Ok(ReadarrClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ReadarrError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET readarr");
        let resp = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(ReadarrError::connect)?;
        self.decode(resp).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ReadarrError> {
        let url = self.url(path);
        tracing::debug!(%url, "POST readarr");
        let resp = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(ReadarrError::connect)?;
        self.decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ReadarrError> {
        let status = resp.status();
        let body = resp.text().await.map_err(ReadarrError::connect)?;
        if !status.is_success() {
            return Err(ReadarrError::from_response(status, &body));
        }
        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                let snippet: String = body.chars().take(2000).collect();
                tracing::error!(error = %e, body_snippet = %snippet, "failed to parse Readarr response");
                Err(ReadarrError::connect(e))
            }
        }
    }

    /// GET /api/v1/book/lookup?term=
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn lookup_books(&self, term: &str) -> Result<Vec<Book>, ReadarrError> {
        self.get_json("/api/v1/book/lookup", &[("term", term)]).await
    }

    /// GET /api/v1/book (the full library list)
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn books(&self) -> Result<Vec<Book>, ReadarrError> {
        self.get_json("/api/v1/book", &[]).await
    }

    /// POST /api/v1/book; returns the created record as Readarr sent it.
    #[tracing::instrument(level = "debug", skip(self, payload))]
    pub async fn add_book(&self, payload: &AddBookPayload) -> Result<Value, ReadarrError> {
        self.post_json("/api/v1/book", payload).await
    }

    /// GET /api/v1/author/lookup?term=
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn lookup_authors(&self, term: &str) -> Result<Vec<Author>, ReadarrError> {
        self.get_json("/api/v1/author/lookup", &[("term", term)]).await
    }

    /// GET /api/v1/qualityprofile
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn quality_profiles(&self) -> Result<Vec<QualityProfile>, ReadarrError> {
        self.get_json("/api/v1/qualityprofile", &[]).await
    }

    /// GET /api/v1/rootfolder
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn root_folders(&self) -> Result<Vec<RootFolder>, ReadarrError> {
        self.get_json("/api/v1/rootfolder", &[]).await
    }

    /// GET /api/v1/bookfile?bookId=
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn book_files(&self, book_id: i64) -> Result<Vec<BookFile>, ReadarrError> {
        self.get_json("/api/v1/bookfile", &[("bookId", &book_id.to_string())])
            .await
    }

    /// POST /api/v1/command
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn command(&self, cmd: &CommandRequest) -> Result<Value, ReadarrError> {
        self.post_json("/api/v1/command", cmd).await
    }

    /// GET /api/v1/queue?includeBook=true, shape passed through as-is.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn queue(&self) -> Result<Value, ReadarrError> {
        self.get_json("/api/v1/queue", &[("includeBook", "true")]).await
    }

    /// GET /api/v1/system/status
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn system_status(&self) -> Result<SystemStatus, ReadarrError> {
        self.get_json("/api/v1/system/status", &[]).await
    }
}

// ============ Wire models ============
//
// Only the fields the portal actually reads or rewrites are typed; everything
// else rides along in the flattened `extra` map so list/lookup passthroughs
// keep Readarr's full records intact.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Composite "Lastname, Firstname Title" string; the only author hint
    /// lookup results carry when no structured author is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_book_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_edition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<BookStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editions: Option<Vec<Edition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitored: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_edition_ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_profile_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStatistics {
    #[serde(default)]
    pub book_file_count: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_profile_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_profile_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitored: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor_new_items: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub foreign_edition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_slug: Option<String>,
    #[serde(default)]
    pub isbn13: String,
    #[serde(default)]
    pub asin: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub is_ebook: bool,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub page_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub images: Vec<Value>,
    #[serde(default)]
    pub links: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Value>,
    #[serde(default)]
    pub monitored: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootFolder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub app_name: Option<String>,
}

/// The fully-assembled add command submitted to Readarr. Write-once; built
/// by the add orchestrator and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBookPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_slug: Option<String>,
    pub author: Author,
    pub editions: Vec<Edition>,
    pub monitored: bool,
    pub any_edition_ok: bool,
    pub author_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_book_id: Option<String>,
    pub quality_profile_id: i64,
    pub metadata_profile_id: i64,
    pub root_folder_path: String,
    pub add_options: AddOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOptions {
    pub monitor: String,
    pub search_for_new_book: bool,
    pub search_for_missing_book: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        AddOptions {
            monitor: "all".to_string(),
            search_for_new_book: true,
            search_for_missing_book: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name")]
pub enum CommandRequest {
    RefreshAuthor {
        #[serde(rename = "authorId")]
        author_id: i64,
    },
    BookSearch {
        #[serde(rename = "bookIds")]
        book_ids: Vec<i64>,
    },
}
