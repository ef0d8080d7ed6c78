use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

mod hostel;
mod room;
mod user;

pub use hostel::Hostel;
pub use room::Room;
pub use user::{Role, User};

/// Which collection a listing belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Room,
    Hostel,
}

impl ListingKind {
    /// Collection segment used in endpoint paths.
    pub fn path(self) -> &'static str {
        match self {
            ListingKind::Room => "rooms",
            ListingKind::Hostel => "hostels",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKind::Room => f.write_str("room"),
            ListingKind::Hostel => f.write_str("hostel"),
        }
    }
}

impl FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "room" | "rooms" => Ok(ListingKind::Room),
            "hostel" | "hostels" => Ok(ListingKind::Hostel),
            other => Err(format!("unknown listing kind: {other}")),
        }
    }
}

/// Lifecycle status of a listing. Set by the backend or an admin only.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    #[default]
    Pending,
    Rejected,
    Booked,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 4] = [
        ListingStatus::Available,
        ListingStatus::Pending,
        ListingStatus::Rejected,
        ListingStatus::Booked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Pending => "pending",
            ListingStatus::Rejected => "rejected",
            ListingStatus::Booked => "booked",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ListingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown status: {wanted}"))
    }
}

/// Street address. Only used for text matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

impl Address {
    pub fn fields(&self) -> [&str; 3] {
        [self.city.as_str(), self.address.as_str(), self.state.as_str()]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.address, &self.city, &self.state]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Common view over rooms and hostels, consumed by the search pipeline.
pub trait Listing: fmt::Debug + Clone + Send + Sync + DeserializeOwned + 'static {
    const KIND: ListingKind;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn status(&self) -> ListingStatus;
    fn price(&self) -> i64;
    fn amenities(&self) -> &[String];
    fn address(&self) -> &Address;
    fn images(&self) -> &[String];
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Raw category label (`bhk` or `hostelType`).
    fn category(&self) -> &str;

    fn category_matches(&self, selected: &str) -> bool {
        self.category() == selected
    }

    fn cover_image(&self) -> Option<&str> {
        self.images().first().map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accepts `7000`, `7000.0` or `"7000"`.
pub(crate) fn de_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberLike::deserialize(deserializer)? {
        NumberLike::Int(n) => Ok(n),
        NumberLike::Float(f) => Ok(f.round() as i64),
        NumberLike::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.round() as i64)
            .map_err(|_| D::Error::custom(format!("not a number: {s:?}"))),
    }
}

pub(crate) fn de_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = de_amount(deserializer)?;
    u32::try_from(n).map_err(|_| D::Error::custom(format!("count out of range: {n}")))
}
