use reqwest::Method;

use crate::api::client::ApiClient;
use crate::api::types::{Ack, Bookmark, EnquiryRequest, ListEnvelope, ListingAction};
use crate::error::{Error, Result};
use crate::models::{ListingKind, User};
use crate::session::AuthScope;

/// Things a signed-in user does to a listing.
#[derive(Clone)]
pub struct ActionsApi {
    client: ApiClient,
}

impl ActionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn user(&self) -> Result<User> {
        self.client
            .session()
            .current_user()
            .ok_or(Error::Unauthenticated)
    }

    pub async fn enquire(&self, kind: ListingKind, listing_id: &str, message: &str) -> Result<Ack> {
        if message.trim().is_empty() {
            return Err(Error::validation("message", "Please write a message"));
        }
        let user = self.user()?;
        let body = EnquiryRequest {
            listing_id,
            listing_type: kind,
            user_id: &user.id,
            message: message.trim(),
        };
        self.client
            .mutate(Method::POST, &["enquiries"], Some(&body), AuthScope::User)
            .await
    }

    pub async fn express_interest(&self, kind: ListingKind, listing_id: &str) -> Result<Ack> {
        let user = self.user()?;
        let body = ListingAction {
            listing_id,
            listing_type: kind,
            user_id: &user.id,
        };
        self.client
            .mutate(Method::POST, &["interests"], Some(&body), AuthScope::User)
            .await
    }

    pub async fn withdraw_interest(&self, listing_id: &str) -> Result<Ack> {
        let user = self.user()?;
        let request = self
            .client
            .request(Method::DELETE, &["interests", listing_id], AuthScope::User)
            .query(&[("userId", &user.id)]);
        self.client.send_ack(request).await
    }

    pub async fn bookmark(&self, kind: ListingKind, listing_id: &str) -> Result<Ack> {
        let user = self.user()?;
        let body = ListingAction {
            listing_id,
            listing_type: kind,
            user_id: &user.id,
        };
        self.client
            .mutate(Method::POST, &["bookmarks"], Some(&body), AuthScope::User)
            .await
    }

    pub async fn remove_bookmark(&self, listing_id: &str) -> Result<Ack> {
        let user = self.user()?;
        let request = self
            .client
            .request(Method::DELETE, &["bookmarks", listing_id], AuthScope::User)
            .query(&[("userId", &user.id)]);
        self.client.send_ack(request).await
    }

    pub async fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        let user = self.user()?;
        let envelope: ListEnvelope<Bookmark> = self
            .client
            .get(&["bookmarks", user.id.as_str()], AuthScope::User)
            .await?;
        Ok(envelope.into_items())
    }
}
