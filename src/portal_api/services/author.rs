use crate::error::PortalError;
use crate::portal_api::services::add_book::unset_id;
use crate::readarr_client::{Author, ReadarrClient};

/// Resolves a candidate author name against Readarr's author lookup and
/// returns a record fit for an add command: identity from the catalog,
/// profile and path defaulted, monitoring forced on.
pub struct AuthorResolver<'a> {
    pub client: &'a ReadarrClient,
}

impl<'a> AuthorResolver<'a> {
    pub fn new(client: &'a ReadarrClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, candidate: &str) -> Result<Author, PortalError> {
        let results = self.client.lookup_authors(candidate).await?;
        let mut author = pick_match(results, candidate)?;
        tracing::debug!(
            author = %author.author_name,
            foreign_author_id = ?author.foreign_author_id,
            "matched author"
        );

        if unset_id(author.quality_profile_id) {
            let profiles = self.client.quality_profiles().await?;
            author.quality_profile_id = Some(profiles.first().map(|p| p.id).unwrap_or(1));
        }

        if author.path.as_deref().unwrap_or("").is_empty() {
            let folders = self.client.root_folders().await?;
            let root = folders.first().map(|f| f.path.as_str()).unwrap_or("/books");
            author.path = Some(format!("{}/{}", root, author.author_name));
        }

        // Once an author enters via a book add, all their future catalog
        // items are monitored.
        author.monitored = Some(true);
        author.monitor_new_items = Some("all".to_string());
        Ok(author)
    }
}

/// Readarr's relevance ordering is trusted as-is: the first candidate wins.
/// No local scoring.
fn pick_match(results: Vec<Author>, candidate: &str) -> Result<Author, PortalError> {
    results
        .into_iter()
        .next()
        .ok_or_else(|| PortalError::AuthorNotFound(candidate.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup_result(v: serde_json::Value) -> Author {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn no_candidates_is_author_not_found() {
        let err = pick_match(vec![], "Jane Doe").unwrap_err();
        assert_eq!(err, PortalError::AuthorNotFound("Jane Doe".into()));
    }

    #[test]
    fn first_candidate_wins() {
        let results = vec![
            lookup_result(json!({"authorName": "Frank Herbert", "foreignAuthorId": "fa1"})),
            lookup_result(json!({"authorName": "Frank Herbert Jr.", "foreignAuthorId": "fa2"})),
        ];
        let picked = pick_match(results, "Frank Herbert").unwrap();
        assert_eq!(picked.foreign_author_id.as_deref(), Some("fa1"));
    }
}
