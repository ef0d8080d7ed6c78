use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use crate::api::client::ApiClient;
use crate::api::traits::ListingSource;
use crate::api::types::{Ack, ListEnvelope, ListingUpdate, StatusUpdate};
use crate::error::{Error, Result};
use crate::models::{Listing, ListingKind, ListingStatus};
use crate::session::AuthScope;

/// Status changes an admin can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Approve,
    Reject,
    Book,
    Unbook,
}

impl StatusTransition {
    pub fn target(self) -> ListingStatus {
        match self {
            StatusTransition::Approve | StatusTransition::Unbook => ListingStatus::Available,
            StatusTransition::Reject => ListingStatus::Rejected,
            StatusTransition::Book => ListingStatus::Booked,
        }
    }

    /// Hostels have no booked state.
    pub fn applies_to(self, kind: ListingKind) -> bool {
        match self {
            StatusTransition::Book | StatusTransition::Unbook => kind == ListingKind::Room,
            StatusTransition::Approve | StatusTransition::Reject => true,
        }
    }
}

impl fmt::Display for StatusTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            StatusTransition::Approve => "approve",
            StatusTransition::Reject => "reject",
            StatusTransition::Book => "book",
            StatusTransition::Unbook => "unbook",
        };
        f.write_str(verb)
    }
}

impl FromStr for StatusTransition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(StatusTransition::Approve),
            "reject" => Ok(StatusTransition::Reject),
            "book" => Ok(StatusTransition::Book),
            "unbook" => Ok(StatusTransition::Unbook),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Per-status totals for the dashboard header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCounts(BTreeMap<ListingStatus, usize>);

impl StatusCounts {
    pub fn tally<L: Listing>(listings: &[L]) -> Self {
        let mut counts = BTreeMap::new();
        for listing in listings {
            *counts.entry(listing.status()).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn get(&self, status: ListingStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = ListingStatus::ALL
            .iter()
            .map(|s| format!("{s}: {}", self.get(*s)))
            .collect();
        write!(f, "{} total ({})", self.total(), parts.join(", "))
    }
}

/// Admin back-office endpoints. Every call carries the admin token.
#[derive(Clone)]
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn ensure_admin(&self) -> Result<()> {
        if self.client.session().is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthenticated)
        }
    }

    /// Every record of one type, whatever its status.
    pub async fn list_all<L: Listing>(&self) -> Result<Vec<L>> {
        self.ensure_admin()?;
        let envelope: ListEnvelope<L> = self
            .client
            .get(&["admin", L::KIND.path()], AuthScope::Admin)
            .await?;
        Ok(envelope.into_items())
    }

    pub async fn transition(
        &self,
        kind: ListingKind,
        id: &str,
        transition: StatusTransition,
    ) -> Result<Ack> {
        if !transition.applies_to(kind) {
            return Err(Error::validation(
                "status",
                format!("cannot {transition} a {kind}"),
            ));
        }
        self.ensure_admin()?;

        let body = StatusUpdate {
            status: transition.target(),
        };
        let ack = self
            .client
            .mutate(
                Method::PUT,
                &["admin", kind.path(), id, "status"],
                Some(&body),
                AuthScope::Admin,
            )
            .await?;
        info!("{kind} {id} -> {}", body.status);
        Ok(ack)
    }

    pub async fn update(&self, kind: ListingKind, id: &str, update: &ListingUpdate) -> Result<Ack> {
        if update.is_empty() {
            return Err(Error::validation("update", "Nothing to update"));
        }
        self.ensure_admin()?;

        self.client
            .mutate(
                Method::PUT,
                &["admin", kind.path(), id],
                Some(update),
                AuthScope::Admin,
            )
            .await
    }

    pub async fn delete(&self, kind: ListingKind, id: &str) -> Result<Ack> {
        self.ensure_admin()?;
        let ack = self
            .client
            .mutate::<()>(
                Method::DELETE,
                &["admin", kind.path(), id],
                None,
                AuthScope::Admin,
            )
            .await?;
        info!("Deleted {kind} {id}");
        Ok(ack)
    }
}

#[async_trait]
impl<L: Listing> ListingSource<L> for AdminApi {
    async fn fetch_all(&self) -> Result<Vec<L>> {
        self.list_all::<L>().await
    }

    fn source_name(&self) -> &'static str {
        "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Room;
    use crate::pipeline::fixtures::room;

    #[test]
    fn transitions_map_to_statuses() {
        assert_eq!(StatusTransition::Approve.target(), ListingStatus::Available);
        assert_eq!(StatusTransition::Reject.target(), ListingStatus::Rejected);
        assert_eq!(StatusTransition::Book.target(), ListingStatus::Booked);
        assert_eq!(StatusTransition::Unbook.target(), ListingStatus::Available);
    }

    #[test]
    fn hostels_cannot_be_booked() {
        assert!(!StatusTransition::Book.applies_to(ListingKind::Hostel));
        assert!(!StatusTransition::Unbook.applies_to(ListingKind::Hostel));
        assert!(StatusTransition::Approve.applies_to(ListingKind::Hostel));
        assert!(StatusTransition::Book.applies_to(ListingKind::Room));
    }

    #[test]
    fn counts_by_status() {
        let rooms: Vec<Room> = vec![
            room("a", 1).build(),
            room("b", 1).status(ListingStatus::Pending).build(),
            room("c", 1).status(ListingStatus::Pending).build(),
            room("d", 1).status(ListingStatus::Booked).build(),
        ];
        let counts = StatusCounts::tally(&rooms);
        assert_eq!(counts.get(ListingStatus::Pending), 2);
        assert_eq!(counts.get(ListingStatus::Rejected), 0);
        assert_eq!(counts.total(), 4);
        assert_eq!(
            counts.to_string(),
            "4 total (available: 1, pending: 2, rejected: 0, booked: 1)"
        );
    }
}
