use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Listing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Fetch order, untouched.
    #[default]
    Recommended,
    PriceLowToHigh,
    PriceHighToLow,
    Newest,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Recommended,
        SortKey::PriceLowToHigh,
        SortKey::PriceHighToLow,
        SortKey::Newest,
    ];

    pub fn compare<L: Listing>(self, a: &L, b: &L) -> Ordering {
        match self {
            SortKey::Recommended => Ordering::Equal,
            SortKey::PriceLowToHigh => a.price().cmp(&b.price()),
            SortKey::PriceHighToLow => b.price().cmp(&a.price()),
            // `None < Some`, so undated records end up last
            SortKey::Newest => b.created_at().cmp(&a.created_at()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortKey::Recommended => "Recommended",
            SortKey::PriceLowToHigh => "Price: Low to High",
            SortKey::PriceHighToLow => "Price: High to Low",
            SortKey::Newest => "Newest",
        };
        f.write_str(label)
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recommended" => Ok(SortKey::Recommended),
            "price-asc" | "price-low-to-high" => Ok(SortKey::PriceLowToHigh),
            "price-desc" | "price-high-to-low" => Ok(SortKey::PriceHighToLow),
            "newest" => Ok(SortKey::Newest),
            other => Err(format!(
                "unknown sort {other:?}, expected recommended, price-asc, price-desc or newest"
            )),
        }
    }
}

/// Sorted copy of `listings`. Stable: ties keep their input order.
pub fn sort_listings<'a, L: Listing>(listings: &[&'a L], key: SortKey) -> Vec<&'a L> {
    let mut sorted = listings.to_vec();
    if key != SortKey::Recommended {
        sorted.sort_by(|a, b| key.compare(*a, *b));
    }
    sorted
}
