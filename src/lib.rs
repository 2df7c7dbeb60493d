//! Generic Rust client engine for the Telerivet REST API.
//!
//! Every API resource is a bag of named fields addressed by a canonical
//! path. The crate is built from four pieces: a typed transport with retry
//! and error mapping ([`TelerivetClient::request`]), a dirty-tracked
//! [`Entity`], a lazy paginated [`Cursor`] and thin typed facades in
//! [`resources`].
//!
//! ```rust,no_run
//! use telerivet::{ApiKey, FilterOp, Query, ResourceId, TelerivetClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), telerivet::TelerivetError> {
//!     let client = TelerivetClient::new(ApiKey::new("...")?);
//!     let project = client.project(ResourceId::new("PJ...")?)?;
//!
//!     let mut contacts = project.contacts(
//!         Query::new().filter_op("name", FilterOp::Prefix, "A"),
//!     );
//!     contacts.limit(100)?;
//!     while let Some(mut contact) = contacts.next().await? {
//!         contact.set_var("greeted", true)?;
//!         contact.save().await?;
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod cursor;
pub mod domain;
pub mod entity;
pub mod resources;
mod transport;

pub use client::{RetryPolicy, TelerivetClient, TelerivetClientBuilder, TelerivetError};
pub use cursor::Cursor;
pub use domain::{
    ApiErrorCode, ApiKey, DEFAULT_PAGE_SIZE, FilterOp, HttpMethod, KnownApiErrorCode,
    MAX_PAGE_SIZE, Query, ResourceId, ResourceKind, SortDir, ValidationError,
};
pub use entity::{Entity, VARS_FIELD};
pub use resources::{Contact, Message, Project};
