use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::fetcher::{fetch_listings, FetchOutcome, Lifetime, LoadingFlag};
use super::filter::{FilterParams, FilterSet, Predicate};
use super::paginator::Paginator;
use super::sort::{sort_listings, SortKey};
use super::{LOAD_MORE_DELAY, SENTINEL_THRESHOLD};
use crate::api::ListingSource;
use crate::error::{Error, Result};
use crate::models::{Hostel, Listing, Room};
use crate::notify::Notifier;

pub type RoomSearch = SearchPage<Room>;
pub type HostelSearch = SearchPage<Hostel>;

#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    NotLoaded,
    Loaded,
    Failed(String),
}

/// What the page should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Loading,
    /// The fetch failed. Nothing to show, and the user was already told.
    Failed(String),
    /// Loaded fine, but no record passes the filters.
    Empty,
    Results {
        shown: usize,
        total: usize,
        exhausted: bool,
    },
}

/// One search page: the fetched collection plus the filter, sort and
/// pagination state derived from it.
///
/// Every parameter change re-derives the result order from the full
/// collection and puts the paginator back on its first page before
/// returning.
pub struct SearchPage<L: Listing> {
    listings: Vec<L>,
    load: LoadState,
    loading: LoadingFlag,
    filters: FilterParams,
    extra: Vec<Arc<dyn Predicate<L>>>,
    sort: SortKey,
    /// Indices into `listings`, filtered and sorted.
    order: Vec<usize>,
    paginator: Paginator,
    load_more_delay: Duration,
}

impl<L: Listing> Default for SearchPage<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Listing> SearchPage<L> {
    pub fn new() -> Self {
        Self {
            listings: Vec::new(),
            load: LoadState::NotLoaded,
            loading: LoadingFlag::default(),
            filters: FilterParams::default(),
            extra: Vec::new(),
            sort: SortKey::default(),
            order: Vec::new(),
            paginator: Paginator::new(0),
            load_more_delay: LOAD_MORE_DELAY,
        }
    }

    pub fn with_load_more_delay(mut self, delay: Duration) -> Self {
        self.load_more_delay = delay;
        self
    }

    /// Predicate applied on top of the filter parameters, e.g. an admin
    /// status tab.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Predicate<L> + 'static,
    {
        self.extra.push(Arc::new(predicate));
        self.recompute();
        self
    }

    /// Fetch the collection once. Fetch failures are recorded on the page
    /// (see [`RenderState::Failed`]), not returned. Only a torn-down view
    /// yields an error, and then the page is left untouched.
    pub async fn mount<S>(
        &mut self,
        source: &S,
        lifetime: &Lifetime,
        notifier: &dyn Notifier,
    ) -> Result<()>
    where
        S: ListingSource<L> + ?Sized,
    {
        let loading = self.loading.clone();
        match fetch_listings(source, lifetime, notifier, &loading).await {
            FetchOutcome::Loaded(listings) => {
                self.load = LoadState::Loaded;
                self.listings = listings;
            }
            FetchOutcome::Failed(message) => {
                self.load = LoadState::Failed(message);
                self.listings.clear();
            }
            FetchOutcome::Cancelled => return Err(Error::Cancelled),
        }
        self.recompute();
        Ok(())
    }

    /// Replace the collection directly, as if fetched.
    pub fn set_listings(&mut self, listings: Vec<L>) {
        self.listings = listings;
        self.load = LoadState::Loaded;
        self.recompute();
    }

    pub fn filters(&self) -> &FilterParams {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterParams) {
        self.filters = filters;
        self.recompute();
    }

    pub fn update_filters(&mut self, edit: impl FnOnce(&mut FilterParams)) {
        edit(&mut self.filters);
        self.recompute();
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.recompute();
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Every record that passes the filters, sorted.
    pub fn results(&self) -> Vec<&L> {
        self.order.iter().map(|&i| &self.listings[i]).collect()
    }

    /// The visible prefix of [`results`](Self::results).
    pub fn visible(&self) -> Vec<&L> {
        self.paginator
            .window(&self.order)
            .iter()
            .map(|&i| &self.listings[i])
            .collect()
    }

    /// Length of the filtered, sorted sequence.
    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// Size of the fetched collection, before filtering.
    pub fn fetched(&self) -> usize {
        self.listings.len()
    }

    /// Manual "load more", without the cosmetic delay.
    pub fn advance(&mut self) -> bool {
        self.paginator.advance()
    }

    /// Reveal the next page after the load-more delay. Does nothing if a
    /// load is already pending or everything is visible.
    pub async fn load_more(&mut self) -> bool {
        if !self.paginator.begin_advance() {
            return false;
        }
        if !self.load_more_delay.is_zero() {
            tokio::time::sleep(self.load_more_delay).await;
        }
        self.paginator.complete_advance();
        true
    }

    /// Sentinel visibility callback.
    pub async fn on_sentinel_visible(&mut self, ratio: f64) -> bool {
        ratio >= SENTINEL_THRESHOLD && self.load_more().await
    }

    pub fn render_state(&self) -> RenderState {
        if self.loading.is_loading() {
            return RenderState::Loading;
        }
        match &self.load {
            LoadState::NotLoaded => RenderState::Loading,
            LoadState::Failed(message) => RenderState::Failed(message.clone()),
            LoadState::Loaded if self.order.is_empty() => RenderState::Empty,
            LoadState::Loaded => RenderState::Results {
                shown: self.paginator.visible_count(),
                total: self.order.len(),
                exhausted: self.paginator.is_exhausted(),
            },
        }
    }

    fn recompute(&mut self) {
        let mut filter = FilterSet::from_params(&self.filters);
        for predicate in &self.extra {
            filter.push_shared(Arc::clone(predicate));
        }

        let matched = filter.apply(&self.listings);
        let sorted = sort_listings(&matched, self.sort);
        self.order = sorted
            .into_iter()
            .map(|listing| index_in(&self.listings, listing))
            .collect();
        self.paginator.reset(self.order.len());
        debug!(
            "{} of {} {} match, sorted by {}",
            self.order.len(),
            self.listings.len(),
            L::KIND.path(),
            self.sort
        );
    }
}

/// Position of `item` in `items`. `item` must borrow from `items`.
fn index_in<T>(items: &[T], item: &T) -> usize {
    let offset = item as *const T as usize - items.as_ptr() as usize;
    offset / std::mem::size_of::<T>().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::ListingStatus;
    use crate::notify::Notifications;
    use crate::pipeline::fixtures::{hostel, room, FailingSource, StaticSource};
    use crate::pipeline::PaginatorState;

    fn ids<L: Listing>(listings: &[&L]) -> Vec<String> {
        listings.iter().map(|l| l.id().to_string()).collect()
    }

    fn rooms(n: usize) -> Vec<Room> {
        (0..n)
            .map(|i| room(&format!("r{i}"), 1000 * (i as i64 + 1)).build())
            .collect()
    }

    fn page(listings: Vec<Room>) -> RoomSearch {
        let mut page = RoomSearch::new().with_load_more_delay(Duration::ZERO);
        page.set_listings(listings);
        page
    }

    #[test]
    fn before_mount_renders_loading() {
        assert_eq!(RoomSearch::new().render_state(), RenderState::Loading);
    }

    #[tokio::test]
    async fn mount_loads_and_shows_first_page() {
        let source = StaticSource(rooms(14));
        let mut page = RoomSearch::new();
        page.mount(&source, &Lifetime::detached(), &Notifications::new())
            .await
            .unwrap();

        assert_eq!(page.visible().len(), 6);
        assert_eq!(
            page.render_state(),
            RenderState::Results {
                shown: 6,
                total: 14,
                exhausted: false
            }
        );
    }

    #[tokio::test]
    async fn failed_mount_is_distinct_from_empty() {
        let source = FailingSource(|| Error::Server {
            status: 502,
            message: String::new(),
        });
        let notes = Notifications::new();
        let mut page = RoomSearch::new();
        page.mount(&source, &Lifetime::detached(), &notes).await.unwrap();

        assert_eq!(page.total(), 0);
        assert!(matches!(page.render_state(), RenderState::Failed(_)));
        assert_eq!(notes.drain().len(), 1);
    }

    #[tokio::test]
    async fn torn_down_mount_leaves_page_untouched() {
        let (teardown, lifetime) = crate::pipeline::view_lifetime();
        teardown.cancel();

        let mut page = page(rooms(3));
        let err = page
            .mount(&StaticSource(rooms(10)), &lifetime, &Notifications::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(page.fetched(), 3);
    }

    #[test]
    fn all_pending_with_available_only_renders_empty() {
        let pending: Vec<Room> = (0..10)
            .map(|i| room(&format!("p{i}"), 5000).status(ListingStatus::Pending).build())
            .collect();
        let mut page = page(pending);
        page.update_filters(|f| f.available_only = true);

        assert!(page.visible().is_empty());
        assert_eq!(page.render_state(), RenderState::Empty);
    }

    #[tokio::test]
    async fn pagination_advances_and_clamps() {
        let mut page = page(rooms(14));
        assert_eq!(page.visible().len(), 6);

        assert!(page.on_sentinel_visible(0.5).await);
        assert_eq!(page.visible().len(), 12);

        assert!(page.load_more().await);
        assert_eq!(page.visible().len(), 14);
        assert_eq!(page.paginator().state(), PaginatorState::Exhausted);

        assert!(!page.load_more().await);
        assert_eq!(page.visible().len(), 14);
        assert_eq!(
            page.render_state(),
            RenderState::Results {
                shown: 14,
                total: 14,
                exhausted: true
            }
        );
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut page = page(rooms(20));
        page.advance();
        page.advance();
        assert_eq!(page.visible().len(), 18);

        page.update_filters(|f| f.max_price = Some(15000));
        assert_eq!(page.total(), 15);
        assert_eq!(page.visible().len(), 6);
        assert_eq!(page.paginator().state(), PaginatorState::Idle);

        page.advance();
        page.set_sort(SortKey::PriceHighToLow);
        assert_eq!(page.visible().len(), 6);
        assert_eq!(page.visible()[0].id, "r14");
    }

    #[test]
    fn visible_is_always_a_prefix_of_results() {
        let mut page = page(rooms(17));
        page.set_sort(SortKey::PriceHighToLow);
        loop {
            let results = ids(&page.results());
            let visible = ids(&page.visible());
            assert_eq!(&results[..visible.len()], &visible[..]);
            if !page.advance() {
                break;
            }
        }
        assert_eq!(page.visible().len(), 17);
    }

    #[test]
    fn results_are_filtered_then_sorted() {
        let listings = vec![
            room("a", 3000).city("Indore").build(),
            room("b", 9000).build(),
            room("c", 1000).build(),
            room("d", 5000).build(),
        ];
        let mut page = page(listings.clone());
        page.update_filters(|f| f.query = Some("bhopal".into()));
        page.set_sort(SortKey::PriceLowToHigh);

        let filter = FilterSet::from_params(page.filters());
        let expected = sort_listings(&filter.apply(&listings), SortKey::PriceLowToHigh);
        assert_eq!(ids(&page.results()), ids(&expected));
        assert_eq!(ids(&page.results()), vec!["c", "d", "b"]);
    }

    #[test]
    fn refiltering_uses_full_collection() {
        let mut page = page(rooms(10));
        page.update_filters(|f| f.max_price = Some(2000));
        assert_eq!(page.total(), 2);

        page.update_filters(|f| f.max_price = None);
        assert_eq!(page.total(), 10);
    }

    #[test]
    fn extra_predicates_combine_with_filters() {
        let listings = vec![
            room("a", 3000).status(ListingStatus::Pending).build(),
            room("b", 9000).status(ListingStatus::Pending).build(),
            room("c", 3000).build(),
        ];
        let mut page = RoomSearch::new()
            .with_predicate(|r: &Room| r.status == ListingStatus::Pending);
        page.set_listings(listings);
        page.update_filters(|f| f.max_price = Some(5000));

        assert_eq!(ids(&page.visible()), vec!["a"]);
    }

    #[test]
    fn same_pipeline_serves_hostels() {
        let mut page: HostelSearch = HostelSearch::new();
        page.set_listings(vec![
            hostel("h1", 5000).hostel_type("Boys").build(),
            hostel("h2", 3000).hostel_type("Girls").build(),
            hostel("h3", 4000).hostel_type("Girls").build(),
        ]);
        page.update_filters(|f| f.category = Some("Girls".into()));
        page.set_sort(SortKey::PriceLowToHigh);

        assert_eq!(ids(&page.visible()), vec!["h2", "h3"]);
    }
}
