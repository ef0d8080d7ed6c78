//! Listing search: fetch once, then filter, sort and paginate in memory.
//!
//! The same generic pipeline serves rooms and hostels. The differences
//! (category matching, field names) live behind the [`Listing`] trait.
//!
//! [`Listing`]: crate::models::Listing

use std::time::Duration;

pub mod fetcher;
pub mod filter;
pub mod paginator;
pub mod search;
pub mod sort;

pub use fetcher::{fetch_listings, view_lifetime, FetchOutcome, Lifetime, LoadingFlag, Teardown};
pub use filter::{location_matches, FilterParams, FilterSet, Predicate};
pub use paginator::{Paginator, PaginatorState};
pub use search::{HostelSearch, RenderState, RoomSearch, SearchPage};
pub use sort::{sort_listings, SortKey};

/// Records revealed per page.
pub const PAGE_SIZE: usize = 6;

/// Fraction of the sentinel that must be on screen to load more.
pub const SENTINEL_THRESHOLD: f64 = 0.1;

/// Cosmetic pause before revealing the next page.
pub const LOAD_MORE_DELAY: Duration = Duration::from_millis(300);
