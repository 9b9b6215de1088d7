//! Summary views over the loaded catalog.

use std::collections::BTreeMap;

use armory_types::{Category, Group};
use serde::Serialize;

/// Load state and record counts for one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryOverview {
    pub category: Category,
    pub group: Group,
    pub id_field: &'static str,
    pub loaded: bool,
    pub total: usize,
    /// Record count per nation key.
    pub nations: BTreeMap<String, usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupOverview {
    pub group: Group,
    pub total: usize,
    pub categories: Vec<CategoryOverview>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogOverview {
    /// Number of entries in the nations list (0 when it failed to load).
    pub nations: usize,
    pub total: usize,
    pub groups: Vec<GroupOverview>,
}

/// Outcome of loading one document at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadStatus {
    pub dataset: &'static str,
    pub path: &'static str,
    pub loaded: bool,
    /// Nation lists for a category, or entries for the nations document.
    pub groups: usize,
    pub records: usize,
}
