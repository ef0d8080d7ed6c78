use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Address, Listing, ListingStatus};

/// Token dropped from both sides on the second location attempt, so that
/// "Minal" and "Minal Residency" are treated as the same place.
const LOCATION_NOISE: &str = "residency";

/// Filter values as entered on a search page. Empty means "not applied".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub available_only: bool,
    pub category: Option<String>,
    pub amenities: Vec<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub query: Option<String>,
}

impl FilterParams {
    /// True when these parameters would keep every record.
    pub fn is_empty(&self) -> bool {
        !self.available_only
            && non_blank(self.category.as_deref()).is_none()
            && self.amenities.iter().all(|a| a.trim().is_empty())
            && self.min_price.is_none()
            && self.max_price.is_none()
            && non_blank(self.query.as_deref()).is_none()
    }
}

/// A single keep/drop test over a listing.
pub trait Predicate<L>: Send + Sync {
    fn matches(&self, listing: &L) -> bool;
}

impl<L, F> Predicate<L> for F
where
    F: Fn(&L) -> bool + Send + Sync,
{
    fn matches(&self, listing: &L) -> bool {
        self(listing)
    }
}

pub struct AvailableOnly;

impl<L: Listing> Predicate<L> for AvailableOnly {
    fn matches(&self, listing: &L) -> bool {
        listing.status() == ListingStatus::Available
    }
}

pub struct CategoryIs(pub String);

impl<L: Listing> Predicate<L> for CategoryIs {
    fn matches(&self, listing: &L) -> bool {
        listing.category_matches(&self.0)
    }
}

/// Every wanted amenity must appear, case-insensitively, inside one of the
/// listing's amenity labels ("wifi" matches "Free WiFi Included").
pub struct HasAmenities(Vec<String>);

impl HasAmenities {
    pub fn new(wanted: &[String]) -> Self {
        Self(wanted.iter().map(|a| a.trim().to_lowercase()).collect())
    }
}

impl<L: Listing> Predicate<L> for HasAmenities {
    fn matches(&self, listing: &L) -> bool {
        let have: Vec<String> = listing.amenities().iter().map(|a| a.to_lowercase()).collect();
        self.0
            .iter()
            .all(|wanted| have.iter().any(|label| label.contains(wanted.as_str())))
    }
}

pub struct PriceAtLeast(pub i64);

impl<L: Listing> Predicate<L> for PriceAtLeast {
    fn matches(&self, listing: &L) -> bool {
        listing.price() >= self.0
    }
}

pub struct PriceAtMost(pub i64);

impl<L: Listing> Predicate<L> for PriceAtMost {
    fn matches(&self, listing: &L) -> bool {
        listing.price() <= self.0
    }
}

pub struct LocationMatches(pub String);

impl<L: Listing> Predicate<L> for LocationMatches {
    fn matches(&self, listing: &L) -> bool {
        location_matches(&self.0, listing.address())
    }
}

/// Case-folded substring match against city, street address or state, with
/// a second attempt after dropping the "residency" token. A heuristic, not a
/// tokenizer.
pub fn location_matches(query: &str, address: &Address) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    let targets: Vec<String> = address.fields().iter().map(|f| f.to_lowercase()).collect();
    if targets.iter().any(|t| t.contains(&query)) {
        return true;
    }

    let stripped = strip_noise(&query);
    if stripped.is_empty() {
        return false;
    }
    targets.iter().any(|t| strip_noise(t).contains(&stripped))
}

fn strip_noise(text: &str) -> String {
    text.replace(LOCATION_NOISE, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Conjunction of predicates. Order of insertion never changes the result.
pub struct FilterSet<L> {
    predicates: Vec<Arc<dyn Predicate<L>>>,
}

impl<L> Default for FilterSet<L> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

impl<L> Clone for FilterSet<L> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

impl<L: Listing> FilterSet<L> {
    pub fn from_params(params: &FilterParams) -> Self {
        let mut set = Self::default();

        if params.available_only {
            set.push(AvailableOnly);
        }
        if let Some(category) = non_blank(params.category.as_deref()) {
            set.push(CategoryIs(category.to_string()));
        }
        let amenities: Vec<String> = params
            .amenities
            .iter()
            .filter(|a| !a.trim().is_empty())
            .cloned()
            .collect();
        if !amenities.is_empty() {
            set.push(HasAmenities::new(&amenities));
        }
        if let Some(min) = params.min_price {
            set.push(PriceAtLeast(min));
        }
        if let Some(max) = params.max_price {
            set.push(PriceAtMost(max));
        }
        if let Some(query) = non_blank(params.query.as_deref()) {
            set.push(LocationMatches(query.to_string()));
        }

        set
    }
}

impl<L> FilterSet<L> {
    pub fn push<P>(&mut self, predicate: P)
    where
        P: Predicate<L> + 'static,
    {
        self.predicates.push(Arc::new(predicate));
    }

    pub fn push_shared(&mut self, predicate: Arc<dyn Predicate<L>>) {
        self.predicates.push(predicate);
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, listing: &L) -> bool {
        self.predicates.iter().all(|p| p.matches(listing))
    }

    /// Matching records, in input order.
    pub fn apply<'a>(&self, listings: &'a [L]) -> Vec<&'a L> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
