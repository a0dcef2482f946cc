//! Port for content item existence checks.
//!
//! Content items are owned by another part of the system; this layer only
//! needs to know whether a referenced item exists.

use async_trait::async_trait;

use crate::domain::ContentId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by content repository adapters.
    pub enum ContentRepositoryError for "content repository" {}
}

/// Read-only view of content items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Whether a content item with this id exists.
    async fn exists(&self, content_id: ContentId) -> Result<bool, ContentRepositoryError>;
}

/// Fixture implementation reporting every content item as present.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureContentRepository;

#[async_trait]
impl ContentRepository for FixtureContentRepository {
    async fn exists(&self, _content_id: ContentId) -> Result<bool, ContentRepositoryError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_reports_content_present() {
        let repo = FixtureContentRepository;
        let present = repo
            .exists(ContentId::new(42))
            .await
            .expect("fixture lookup should succeed");
        assert!(present);
    }

    #[test]
    fn errors_format_messages() {
        let err = ContentRepositoryError::query("syntax error");
        assert!(err.to_string().contains("syntax error"));
    }
}
