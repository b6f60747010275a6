// File download endpoint. Streaming a file with a per-extension content
// type doesn't fit the OpenAPI payload model, so this is a plain poem
// handler registered next to the API service in main.

use std::sync::Arc;

use poem::http::StatusCode;
use poem::web::{Data, Path};
use poem::{Body, Response, handler};
use serde_json::json;

use crate::config::Config;
use crate::readarr_client::ReadarrClient;

/// Readarr reports paths from inside its own container; the portal sees the
/// same library under `books_path`. Ordered longest-first so "/data/books"
/// wins over "/data".
const PATH_PREFIXES: [&str; 5] = ["/data/books", "/data", "/books", "/media/books", "/media"];

pub(crate) fn translate_path(readarr_path: &str, books_path: &str) -> String {
    for prefix in PATH_PREFIXES {
        if readarr_path.starts_with(prefix) {
            return format!("{}{}", books_path, &readarr_path[prefix.len()..]);
        }
    }
    readarr_path.to_string()
}

pub(crate) fn mime_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "epub" => "application/epub+zip",
        "pdf" => "application/pdf",
        "mobi" => "application/x-mobipocket-ebook",
        "azw" | "azw3" => "application/vnd.amazon.ebook",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

#[handler]
pub async fn download_book(
    Path(book_id): Path<i64>,
    client: Data<&Arc<ReadarrClient>>,
    config: Data<&Arc<Config>>,
) -> Response {
    let files = match client.book_files(book_id).await {
        Ok(files) => files,
        Err(e) => {
            tracing::error!(error = %e, book_id, "failed to fetch book files");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.message, "status": e.status}),
            );
        }
    };

    // first file is the common case; Readarr orders by quality weight
    let Some(file) = files.first() else {
        return json_error(
            StatusCode::NOT_FOUND,
            json!({"error": "No files found for this book"}),
        );
    };

    let local_path = translate_path(&file.path, &config.books_path.to_string_lossy());
    let meta = match tokio::fs::metadata(&local_path).await {
        Ok(meta) => meta,
        Err(_) => {
            tracing::error!(%local_path, readarr_path = %file.path, "book file missing on disk");
            return json_error(
                StatusCode::NOT_FOUND,
                json!({"error": "File not found on server", "path": file.path}),
            );
        }
    };

    let file_name = std::path::Path::new(&local_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());
    let mime = mime_for(&file_name);

    match tokio::fs::File::open(&local_path).await {
        Ok(f) => Response::builder()
            .header("Content-Type", mime)
            .header("Content-Length", meta.len())
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", file_name),
            )
            .body(Body::from_async_read(f)),
        Err(e) => {
            tracing::error!(error = %e, %local_path, "failed to open book file");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "An unexpected error occurred during download"}),
            )
        }
    }
}

fn json_error(status: StatusCode, body: serde_json::Value) -> Response {
    Response::builder()
        .status(status)
        .content_type("application/json")
        .body(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_the_longest_matching_prefix() {
        assert_eq!(
            translate_path("/data/books/Dune/dune.epub", "/library"),
            "/library/Dune/dune.epub"
        );
        assert_eq!(
            translate_path("/data/other/dune.epub", "/library"),
            "/library/other/dune.epub"
        );
        assert_eq!(
            translate_path("/media/books/dune.epub", "/library"),
            "/library/dune.epub"
        );
    }

    #[test]
    fn unknown_prefixes_pass_through() {
        assert_eq!(
            translate_path("/srv/dune.epub", "/library"),
            "/srv/dune.epub"
        );
    }

    #[test]
    fn mime_table_covers_book_formats() {
        assert_eq!(mime_for("dune.epub"), "application/epub+zip");
        assert_eq!(mime_for("dune.EPUB"), "application/epub+zip");
        assert_eq!(mime_for("dune.pdf"), "application/pdf");
        assert_eq!(mime_for("dune.azw3"), "application/vnd.amazon.ebook");
        assert_eq!(mime_for("notes.txt"), "text/plain");
        assert_eq!(mime_for("dune.cbz"), "application/octet-stream");
        assert_eq!(mime_for("no-extension"), "application/octet-stream");
    }
}
