use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ListingSource;
use crate::models::Listing;
use crate::notify::{Notification, Notifier};

/// Spinner flag shared with the render layer.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag until the returned guard is dropped.
    pub fn start(&self) -> LoadingGuard {
        self.0.store(true, Ordering::Release);
        LoadingGuard(self.clone())
    }
}

#[must_use = "the loading flag drops as soon as the guard does"]
pub struct LoadingGuard(LoadingFlag);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}

/// Owner side of a view's lifetime. Dropping it, or calling
/// [`Teardown::cancel`], cancels every operation bound to the paired
/// [`Lifetime`].
#[derive(Debug)]
pub struct Teardown(watch::Sender<bool>);

impl Teardown {
    pub fn cancel(self) {
        let _ = self.0.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct Lifetime(Option<watch::Receiver<bool>>);

impl Lifetime {
    /// A lifetime nobody can cancel.
    pub fn detached() -> Self {
        Self(None)
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.0 {
            Some(rx) => *rx.borrow() || rx.has_changed().is_err(),
            None => false,
        }
    }

    /// Resolves once the view is torn down.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.0 else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// A fresh teardown/lifetime pair for one view.
pub fn view_lifetime() -> (Teardown, Lifetime) {
    let (tx, rx) = watch::channel(false);
    (Teardown(tx), Lifetime(Some(rx)))
}

#[derive(Debug)]
pub enum FetchOutcome<L> {
    Loaded(Vec<L>),
    /// Already reported to the user. The collection is empty.
    Failed(String),
    Cancelled,
}

/// One fetch of the full collection. Errors are reported through `notifier`
/// rather than returned. The loading flag is up for exactly the duration of
/// the call.
pub async fn fetch_listings<L, S>(
    source: &S,
    lifetime: &Lifetime,
    notifier: &dyn Notifier,
    loading: &LoadingFlag,
) -> FetchOutcome<L>
where
    L: Listing,
    S: ListingSource<L> + ?Sized,
{
    let _guard = loading.start();
    debug!("Fetching {}", source.source_name());

    tokio::select! {
        biased;

        _ = lifetime.cancelled() => {
            debug!("View gone, dropping {} fetch", source.source_name());
            FetchOutcome::Cancelled
        }

        result = source.fetch_all() => match result {
            Ok(listings) => {
                info!("Fetched {} {}", listings.len(), source.source_name());
                FetchOutcome::Loaded(listings)
            }
            Err(e) => {
                warn!("Failed to fetch {}: {e}", source.source_name());
                let message = e.user_message();
                notifier.notify(Notification::error(message.clone()));
                FetchOutcome::Failed(message)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Room;
    use crate::notify::{Level, Notifications, TracingNotifier};
    use crate::pipeline::fixtures::{room, FailingSource, SlowSource, StaticSource};

    #[tokio::test]
    async fn success_returns_all_and_clears_flag() {
        let source = StaticSource(vec![room("a", 1).build(), room("b", 2).build()]);
        let notes = Notifications::new();
        let loading = LoadingFlag::default();

        let outcome =
            fetch_listings::<Room, _>(&source, &Lifetime::detached(), &notes, &loading).await;

        assert!(matches!(outcome, FetchOutcome::Loaded(ref v) if v.len() == 2));
        assert!(!loading.is_loading());
        assert!(notes.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failure_notifies_and_clears_flag() {
        let source = FailingSource(|| Error::Server {
            status: 500,
            message: "Database unavailable".into(),
        });
        let notes = Notifications::new();
        let loading = LoadingFlag::default();

        let outcome =
            fetch_listings::<Room, _>(&source, &Lifetime::detached(), &notes, &loading).await;

        assert!(matches!(outcome, FetchOutcome::Failed(ref m) if m == "Database unavailable"));
        assert!(!loading.is_loading());
        let sent = notes.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].level, Level::Error);
    }

    #[tokio::test]
    async fn teardown_cancels_in_flight_fetch() {
        let source = SlowSource(vec![room("a", 1).build()]);
        let notes = Notifications::new();
        let loading = LoadingFlag::default();
        let (teardown, lifetime) = view_lifetime();

        let fetch = fetch_listings::<Room, _>(&source, &lifetime, &notes, &loading);
        let cancel = async move {
            tokio::task::yield_now().await;
            drop(teardown);
        };
        let (outcome, ()) = tokio::join!(fetch, cancel);

        assert!(matches!(outcome, FetchOutcome::Cancelled));
        assert!(lifetime.is_cancelled());
        assert!(!loading.is_loading());
    }

    #[tokio::test]
    async fn already_cancelled_lifetime_skips_fetch() {
        let source = StaticSource(vec![room("a", 1).build()]);
        let (teardown, lifetime) = view_lifetime();
        teardown.cancel();

        let outcome = fetch_listings::<Room, _>(
            &source,
            &lifetime,
            &Notifications::new(),
            &LoadingFlag::default(),
        )
        .await;
        assert!(matches!(outcome, FetchOutcome::Cancelled));
    }

    #[tokio::test]
    async fn failure_can_be_reported_to_the_log() {
        let source = FailingSource(|| Error::Unauthenticated);
        let outcome = fetch_listings::<Room, _>(
            &source,
            &Lifetime::detached(),
            &TracingNotifier,
            &LoadingFlag::default(),
        )
        .await;
        assert!(matches!(outcome, FetchOutcome::Failed(ref m) if m == "you need to sign in first"));
    }

    #[test]
    fn guard_lowers_flag_on_drop() {
        let flag = LoadingFlag::default();
        {
            let _guard = flag.start();
            assert!(flag.is_loading());
        }
        assert!(!flag.is_loading());
    }
}
