use async_trait::async_trait;

use crate::error::Result;
use crate::models::Listing;

/// Anything that can hand the search pipeline its full, unfiltered
/// collection: the public endpoints, the admin endpoints, or a fixture.
#[async_trait]
pub trait ListingSource<L: Listing>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<L>>;

    /// Name used in logs
    fn source_name(&self) -> &'static str;
}
