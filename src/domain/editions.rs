// Edition synthesis for lookup results that carry no edition records.
// Readarr rejects an add command without at least one edition.

use crate::error::PortalError;
use crate::readarr_client::{Book, Edition};

/// Return the editions to submit for `book`, all forced to monitored.
///
/// A book that already carries editions passes through unchanged apart from
/// the monitored flag. Otherwise a single edition is synthesized from the
/// book's own fields; the ISBN/ASIN/publisher/format placeholders stay empty
/// for Readarr to fill in after acquisition. Idempotent.
pub fn ensure_editions(book: &Book) -> Result<Vec<Edition>, PortalError> {
    if let Some(editions) = &book.editions {
        if !editions.is_empty() {
            return Ok(editions
                .iter()
                .cloned()
                .map(|mut e| {
                    e.monitored = true;
                    e
                })
                .collect());
        }
    }

    let foreign_edition_id = book
        .foreign_edition_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            PortalError::InvalidInput(
                "Book must have a foreignEditionId to create an edition".to_string(),
            )
        })?;

    Ok(vec![Edition {
        foreign_edition_id,
        title_slug: book.title_slug.clone(),
        isbn13: String::new(),
        asin: String::new(),
        title: book.title.clone().unwrap_or_default(),
        overview: String::new(),
        format: String::new(),
        is_ebook: false,
        publisher: String::new(),
        page_count: book.page_count.unwrap_or(0),
        release_date: book.release_date,
        images: book.images.clone().unwrap_or_default(),
        links: book.links.clone().unwrap_or_default(),
        ratings: book.ratings.clone(),
        monitored: true,
        extra: serde_json::Map::new(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup_book() -> Book {
        serde_json::from_value(json!({
            "title": "Dune",
            "titleSlug": "fb1-dune",
            "foreignBookId": "fb1",
            "foreignEditionId": "fe1",
            "pageCount": 412,
            "images": [{"url": "/cover.jpg", "coverType": "cover"}],
            "ratings": {"votes": 100, "value": 4.3}
        }))
        .unwrap()
    }

    #[test]
    fn synthesizes_one_edition_from_the_book() {
        let editions = ensure_editions(&lookup_book()).unwrap();
        assert_eq!(editions.len(), 1);
        let e = &editions[0];
        assert_eq!(e.foreign_edition_id, "fe1");
        assert_eq!(e.title_slug.as_deref(), Some("fb1-dune"));
        assert_eq!(e.title, "Dune");
        assert_eq!(e.page_count, 412);
        assert_eq!(e.images.len(), 1);
        assert!(e.monitored);
        assert_eq!(e.isbn13, "");
        assert_eq!(e.publisher, "");
    }

    #[test]
    fn synthesis_is_idempotent() {
        let mut book = lookup_book();
        let first = ensure_editions(&book).unwrap();
        book.editions = Some(first.clone());
        let second = ensure_editions(&book).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
        assert!(second[0].monitored);
    }

    #[test]
    fn existing_editions_pass_through_monitored() {
        let mut book = lookup_book();
        book.editions = Some(vec![Edition {
            monitored: false,
            ..ensure_editions(&book).unwrap().remove(0)
        }]);
        let editions = ensure_editions(&book).unwrap();
        assert_eq!(editions.len(), 1);
        assert!(editions[0].monitored);
    }

    #[test]
    fn missing_foreign_edition_id_is_invalid_input() {
        let mut book = lookup_book();
        book.foreign_edition_id = None;
        let err = ensure_editions(&book).unwrap_err();
        assert!(matches!(err, PortalError::InvalidInput(_)));
        assert!(err.to_string().contains("foreignEditionId"));
    }

    #[test]
    fn empty_foreign_edition_id_is_invalid_input() {
        let mut book = lookup_book();
        book.foreign_edition_id = Some(String::new());
        assert!(ensure_editions(&book).is_err());
    }
}
