use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_amount, Address, Coordinates, Listing, ListingKind, ListingStatus};

/// A rentable room
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-form label such as "2 BHK".
    #[serde(default)]
    pub bhk: String,
    #[serde(flatten)]
    pub address: Address,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(deserialize_with = "de_amount")]
    pub price: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub status: ListingStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Lower-case and drop all whitespace so "2 BHK" and "2bhk" compare equal.
pub fn normalize_bhk(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Listing for Room {
    const KIND: ListingKind = ListingKind::Room;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> ListingStatus {
        self.status
    }

    fn price(&self) -> i64 {
        self.price
    }

    fn amenities(&self) -> &[String] {
        &self.amenities
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn images(&self) -> &[String] {
        &self.images
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn category(&self) -> &str {
        &self.bhk
    }

    fn category_matches(&self, selected: &str) -> bool {
        normalize_bhk(&self.bhk) == normalize_bhk(selected)
    }
}
