use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A nation entry. Read-only at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nation {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub flag: String,
}

impl Nation {
    /// Decode the nations document (a JSON array of nations).
    pub fn list_from_document(document: serde_json::Value) -> Result<Vec<Nation>, TypeError> {
        serde_json::from_value(document).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}
