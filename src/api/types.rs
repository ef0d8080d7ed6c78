use serde::{Deserialize, Serialize};

use crate::models::{ListingKind, ListingStatus, User};

/// List responses come either bare or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Items(Vec<T>),
    Wrapped {
        #[serde(alias = "rooms", alias = "hostels", alias = "bookmarks")]
        data: Vec<T>,
    },
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Items(items) | ListEnvelope::Wrapped { data: items } => items,
        }
    }
}

/// Single-record responses, bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemEnvelope<T> {
    Wrapped {
        #[serde(alias = "room", alias = "hostel")]
        data: T,
    },
    Item(T),
}

impl<T> ItemEnvelope<T> {
    pub fn into_item(self) -> T {
        match self {
            ItemEnvelope::Item(item) | ItemEnvelope::Wrapped { data: item } => item,
        }
    }
}

/// Body of any non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> String {
        self.message.or(self.error).unwrap_or_default()
    }
}

/// Acknowledgement of a mutation. All fields optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub status: ListingStatus,
}

/// Admin field edits. Unset fields are left alone by the backend.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_beds: Option<u32>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.amenities.is_none()
            && self.available_beds.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryRequest<'a> {
    pub listing_id: &'a str,
    pub listing_type: ListingKind,
    pub user_id: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAction<'a> {
    pub listing_id: &'a str,
    pub listing_type: ListingKind,
    pub user_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub listing_id: String,
    pub listing_type: ListingKind,
    #[serde(default)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Room;

    #[test]
    fn list_envelope_accepts_bare_and_wrapped() {
        let bare: ListEnvelope<u32> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(bare.into_items(), vec![1, 2, 3]);

        let wrapped: ListEnvelope<u32> = serde_json::from_str(r#"{"rooms":[4]}"#).unwrap();
        assert_eq!(wrapped.into_items(), vec![4]);

        let data: ListEnvelope<u32> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(data.into_items().is_empty());
    }

    #[test]
    fn item_envelope_unwraps_room() {
        let raw = r#"{"room":{"_id":"r9","title":"Attic","price":4500,"status":"available"}}"#;
        let room: Room = serde_json::from_str::<ItemEnvelope<Room>>(raw)
            .unwrap()
            .into_item();
        assert_eq!(room.id, "r9");

        let bare = r#"{"_id":"r9","title":"Attic","price":4500,"status":"available"}"#;
        let room: Room = serde_json::from_str::<ItemEnvelope<Room>>(bare)
            .unwrap()
            .into_item();
        assert_eq!(room.price, 4500);
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Room not found","error":"E404"}"#).unwrap();
        assert_eq!(body.into_message(), "Room not found");

        let body: ErrorBody = serde_json::from_str(r#"{"error":"Invalid token"}"#).unwrap();
        assert_eq!(body.into_message(), "Invalid token");
    }

    #[test]
    fn listing_update_omits_unset_fields() {
        let update = ListingUpdate {
            price: Some(8000),
            available_beds: Some(3),
            ..ListingUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "price": 8000, "availableBeds": 3 }));
        assert!(ListingUpdate::default().is_empty());
    }

    #[test]
    fn action_bodies_use_camel_case() {
        let body = ListingAction {
            listing_id: "r1",
            listing_type: ListingKind::Hostel,
            user_id: "u1",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "listingId": "r1", "listingType": "hostel", "userId": "u1" })
        );
    }
}
