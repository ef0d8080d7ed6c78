//! Client for the Rumin room and hostel rental marketplace.
//!
//! - [`api`]: typed REST client and endpoint groups
//! - [`pipeline`]: fetch, filter, sort and paginate listings
//! - [`session`]: who is signed in, persisted between runs
//! - [`validation`]: form checks that run before any request

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod session;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
