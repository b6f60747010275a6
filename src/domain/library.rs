// Library read-models: author grouping and downloaded/missing aggregation
// over the backend's book list. Pure mapping, no Readarr calls.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::author::derive_author_name;
use crate::readarr_client::Book;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFilter {
    All,
    Downloaded,
    Missing,
}

impl DownloadFilter {
    /// Unknown or absent filter values fall back to `All`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("downloaded") => DownloadFilter::Downloaded,
            Some("missing") => DownloadFilter::Missing,
            _ => DownloadFilter::All,
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        match self {
            DownloadFilter::All => true,
            DownloadFilter::Downloaded => is_downloaded(book),
            DownloadFilter::Missing => !is_downloaded(book),
        }
    }
}

/// "Downloaded" is a proxy: the backend reported at least one book file.
pub fn is_downloaded(book: &Book) -> bool {
    book.statistics
        .as_ref()
        .is_some_and(|s| s.book_file_count > 0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryStats {
    pub total: usize,
    pub downloaded: usize,
    pub missing: usize,
    pub downloaded_percent: f64,
}

impl LibraryStats {
    pub fn of(books: &[Book]) -> Self {
        let total = books.len();
        let downloaded = books.iter().filter(|b| is_downloaded(b)).count();
        let downloaded_percent = if total > 0 {
            downloaded as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        LibraryStats {
            total,
            downloaded,
            missing: total - downloaded,
            downloaded_percent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorGroup {
    /// Numeric Readarr author id; `0` is the bucket for books with no
    /// resolvable author identity.
    pub author_id: i64,
    pub author_name: String,
    pub books: Vec<Book>,
    pub downloaded_count: usize,
}

/// Group books by author identity, sorted alphabetically with the unknown
/// bucket last. The display name is fixed by the first book seen per group.
pub fn group_by_author(books: &[Book]) -> Vec<AuthorGroup> {
    let mut groups: Vec<AuthorGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for book in books {
        let author_id = book
            .author
            .as_ref()
            .and_then(|a| a.id)
            .filter(|id| *id != 0)
            .or(book.author_id.filter(|id| *id != 0))
            .unwrap_or(0);

        let slot = *index.entry(author_id).or_insert_with(|| {
            groups.push(AuthorGroup {
                author_id,
                author_name: display_author_name(book),
                books: Vec::new(),
                downloaded_count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.books.push(book.clone());
        if is_downloaded(book) {
            group.downloaded_count += 1;
        }
    }

    groups.sort_by(|a, b| match (a.author_id == 0, b.author_id == 0) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a
            .author_name
            .to_lowercase()
            .cmp(&b.author_name.to_lowercase()),
    });
    groups
}

fn display_author_name(book: &Book) -> String {
    if let Some(author) = &book.author {
        if !author.author_name.is_empty() {
            return author.author_name.clone();
        }
    }
    if let Some(author_title) = &book.author_title {
        let derived = derive_author_name(author_title, book.title.as_deref().unwrap_or(""));
        if !derived.is_empty() {
            return derived;
        }
    }
    match book.author_id {
        Some(id) if id != 0 => format!("Author ID: {}", id),
        _ => "Unknown Author".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book(v: serde_json::Value) -> Book {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn empty_library_percent_is_zero() {
        let stats = LibraryStats::of(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.downloaded_percent, 0.0);
        assert!(stats.downloaded_percent.is_finite());
    }

    #[test]
    fn stats_count_files_as_downloaded() {
        let books = vec![
            book(json!({"title": "A", "statistics": {"bookFileCount": 1}})),
            book(json!({"title": "B", "statistics": {"bookFileCount": 0}})),
            book(json!({"title": "C"})),
            book(json!({"title": "D", "statistics": {"bookFileCount": 2}})),
        ];
        let stats = LibraryStats::of(&books);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.downloaded, 2);
        assert_eq!(stats.missing, 2);
        assert_eq!(stats.downloaded_percent, 50.0);
    }

    #[test]
    fn filter_partitions_on_book_files() {
        let downloaded = book(json!({"title": "A", "statistics": {"bookFileCount": 1}}));
        let missing = book(json!({"title": "B"}));
        assert!(DownloadFilter::Downloaded.matches(&downloaded));
        assert!(!DownloadFilter::Downloaded.matches(&missing));
        assert!(DownloadFilter::Missing.matches(&missing));
        assert!(DownloadFilter::All.matches(&missing));
        assert_eq!(DownloadFilter::parse(Some("bogus")), DownloadFilter::All);
        assert_eq!(DownloadFilter::parse(None), DownloadFilter::All);
    }

    #[test]
    fn groups_by_author_identity_with_unknown_last() {
        let books = vec![
            book(json!({"title": "Z", "author": {"id": 2, "authorName": "Zadie Smith"}})),
            book(json!({"title": "Dune", "authorId": 1, "author": {"id": 1, "authorName": "Frank Herbert"}, "statistics": {"bookFileCount": 1}})),
            book(json!({"title": "Messiah", "authorId": 1, "author": {"id": 1, "authorName": "Frank Herbert"}})),
            book(json!({"title": "Orphan"})),
        ];
        let groups = group_by_author(&books);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].author_name, "Frank Herbert");
        assert_eq!(groups[0].books.len(), 2);
        assert_eq!(groups[0].downloaded_count, 1);
        assert_eq!(groups[1].author_name, "Zadie Smith");
        assert_eq!(groups[2].author_id, 0);
        assert_eq!(groups[2].author_name, "Unknown Author");
    }

    #[test]
    fn group_name_falls_back_to_author_title_parse() {
        let books = vec![book(
            json!({"title": "Dune", "authorTitle": "Herbert, Frank Dune"}),
        )];
        let groups = group_by_author(&books);
        assert_eq!(groups[0].author_name, "Frank Herbert");
        assert_eq!(groups[0].author_id, 0);
    }

    #[test]
    fn group_name_uses_numeric_id_when_nothing_else() {
        let books = vec![book(json!({"title": "Dune", "authorId": 9}))];
        let groups = group_by_author(&books);
        assert_eq!(groups[0].author_id, 9);
        assert_eq!(groups[0].author_name, "Author ID: 9");
    }
}
