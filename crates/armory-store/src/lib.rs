//! JSON document storage for Armory.
//!
//! Armory keeps its whole dataset as a handful of JSON documents (one for the
//! nations list and one per vehicle category). This crate loads them at
//! startup and writes them back after every mutation.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`JsonFileStore`] -- files under a data directory, written with a
//!   write-temp-then-rename sequence
//! - [`InMemoryDocumentStore`] -- `HashMap`-based store for tests, with
//!   switchable write failures
//!
//! # Design Rules
//!
//! 1. A document is replaced whole or not at all.
//! 2. Loading never fails the caller: an unreadable document is logged and
//!    reported as absent.
//! 3. Writing always reports failure, so callers can roll back.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::JsonFileStore;
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
