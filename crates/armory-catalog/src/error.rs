//! Error types for catalog operations.

use armory_store::StoreError;
use armory_types::Category;
use thiserror::Error;

use crate::validation::Violation;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing document failed to load at startup.
    #[error("{dataset} data is not loaded")]
    NotLoaded { dataset: &'static str },

    /// The nation has no list in this category.
    #[error("nation `{nation}` not found in {category}")]
    NationNotFound {
        category: Category,
        nation: String,
        /// Nations that do have data for the category.
        available_nations: Vec<String>,
    },

    /// The nation is not in the nations list.
    #[error("nation `{nation}` not found")]
    UnknownNation { nation: String },

    /// The identifier matched no record in the nation's list.
    #[error("{category} `{identifier}` not found for nation `{nation}`")]
    RecordNotFound {
        category: Category,
        nation: String,
        identifier: String,
    },

    /// One or more validation rules failed. All violations are reported.
    #[error("validation failed: {}", summarize(.violations))]
    Validation { violations: Vec<Violation> },

    /// A record with the same id-field value already exists in the nation.
    #[error("{category} with {field} `{value}` already exists for nation `{nation}`")]
    Conflict {
        category: Category,
        nation: String,
        field: &'static str,
        value: String,
    },

    /// Writing the document failed; the in-memory state was rolled back.
    #[error("failed to persist {category}: {source}")]
    Persistence {
        category: Category,
        #[source]
        source: StoreError,
    },

    /// A writer panicked while holding the category lock.
    #[error("{category} lock poisoned")]
    LockPoisoned { category: Category },
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
