//! In-memory vehicle catalog for Armory.
//!
//! The catalog is the only mutable state of the service: one collection per
//! vehicle category (nation → ordered records) plus the read-only nations
//! list, loaded once from a [`DocumentStore`](armory_store::DocumentStore) and
//! written back after every mutation.
//!
//! # Operations
//!
//! Per category, scoped to a nation:
//!
//! - **list** -- flattened across nations, with search and pagination
//! - **list by nation**, **get** -- dual-key lookup via [`Identifier`](armory_types::Identifier)
//! - **create** -- validation, duplicate check, fresh per-nation id
//! - **update** -- partial merge; `id`, `nation` and the id-field are immutable
//! - **delete**
//!
//! A mutation that fails to persist is rolled back in memory before the error
//! is returned, so callers observe either the full effect or none of it.
//!
//! # Modules
//!
//! - [`catalog`] -- [`Catalog`] and the document codec
//! - [`validation`] -- create/update field rules
//! - [`query`] -- search and pagination
//! - [`overview`] -- per-category and per-group summaries
//! - [`error`] -- [`CatalogError`]

pub mod catalog;
pub mod error;
pub mod overview;
pub mod query;
pub mod validation;

pub use catalog::{decode_collection, encode_collection, Catalog, Collection, NATIONS_PATH};
pub use error::{CatalogError, CatalogResult};
pub use overview::{CatalogOverview, CategoryOverview, GroupOverview, LoadStatus};
pub use query::{paginate, ListQuery, Page, PageLimits};
pub use validation::{validate_create, validate_update, Violation};
