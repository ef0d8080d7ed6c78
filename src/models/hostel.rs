use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_amount, de_count, Address, Coordinates, Listing, ListingKind, ListingStatus};

/// A hostel with bookable beds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hostel {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// e.g. "Boys", "Girls", "Co-ed"
    #[serde(default)]
    pub hostel_type: String,
    #[serde(flatten)]
    pub address: Address,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(deserialize_with = "de_amount")]
    pub price: i64,
    #[serde(default, deserialize_with = "de_count")]
    pub total_beds: u32,
    #[serde(default, deserialize_with = "de_count")]
    pub available_beds: u32,
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

impl Listing for Hostel {
    const KIND: ListingKind = ListingKind::Hostel;

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
        &self.hostel_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bed_counts() {
        let raw = r#"{
            "id": "h1",
            "title": "Minal Boys Hostel",
            "hostelType": "Boys",
            "city": "Bhopal",
            "price": 4000,
            "totalBeds": "20",
            "availableBeds": 5,
            "status": "pending"
        }"#;

        let hostel: Hostel = serde_json::from_str(raw).unwrap();
        assert_eq!(hostel.id, "h1");
        assert_eq!(hostel.total_beds, 20);
        assert_eq!(hostel.available_beds, 5);
        assert_eq!(hostel.status, ListingStatus::Pending);
        assert!(hostel.cover_image().is_none());
    }

    #[test]
    fn hostel_type_match_is_exact() {
        let hostel = Hostel {
            hostel_type: "Girls".into(),
            ..Hostel::default()
        };
        assert!(hostel.category_matches("Girls"));
        assert!(!hostel.category_matches("girls"));
    }
}
