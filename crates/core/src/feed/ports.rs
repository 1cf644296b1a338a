//! Port interfaces for feed pagination

use async_trait::async_trait;
use twikey_domain::{FeedPage, Result};

/// One resource's feed endpoint.
///
/// Implementations issue a single page request and parse the page into typed
/// items, reading the resumption cursor from the response headers.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Typed item the page is parsed into.
    type Item: Send;

    /// Short feed name used in logs (`"document"`, `"invoice"`, ...).
    fn name(&self) -> &'static str;

    /// Fetch the next page.
    ///
    /// `resume_after` seeds the server-side position and is only passed on
    /// the first fetch of a drain.
    async fn fetch_page(&self, resume_after: Option<&str>) -> Result<FeedPage<Self::Item>>;
}
