pub mod actions;
pub mod admin;
pub mod auth;
pub mod client;
pub mod listings;
pub mod traits;
pub mod types;

pub use actions::ActionsApi;
pub use admin::{AdminApi, StatusCounts, StatusTransition};
pub use auth::AuthApi;
pub use client::ApiClient;
pub use listings::ListingsApi;
pub use traits::ListingSource;
pub use types::{Ack, Bookmark, ListingUpdate};
