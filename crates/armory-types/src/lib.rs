//! Foundation types for Armory.
//!
//! Armory serves reference data about nations and military vehicles. This
//! crate holds the types every other Armory crate shares.
//!
//! # Key Types
//!
//! - [`Category`] / [`Group`] -- the static category registry ([`CategorySpec`])
//! - [`Nation`] -- read-only nation entries
//! - [`VehicleRecord`] -- typed core fields plus an open attribute map
//! - [`Identifier`] -- parsed dual-key (human-readable or numeric) identifier

pub mod category;
pub mod error;
pub mod identifier;
pub mod nation;
pub mod record;

pub use category::{Category, CategorySpec, Group};
pub use error::TypeError;
pub use identifier::Identifier;
pub use nation::Nation;
pub use record::VehicleRecord;
