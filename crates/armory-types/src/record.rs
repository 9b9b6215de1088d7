//! Vehicle records: a typed core plus an open attribute map.
//!
//! Documents on disk are schema-less JSON objects. The engine depends on a
//! handful of fields (`id`, `nation`, the category id-field, `name`, `rank`,
//! `br`, `crew`); those are lifted into typed fields and everything else is
//! kept verbatim in [`VehicleRecord::extra`]. Because the id-field name differs
//! per category, conversion always goes through a [`Category`].
//!
//! Optional attributes (`rank`, `br`, `crew`) are only lifted when they have
//! the expected type; anything else stays in `extra` untouched, so encoding
//! always writes back exactly what was read.

use serde_json::{Map, Number, Value};

use crate::category::Category;
use crate::error::TypeError;

pub const FIELD_ID: &str = "id";
pub const FIELD_NATION: &str = "nation";
pub const FIELD_NAME: &str = "name";
pub const FIELD_RANK: &str = "rank";
pub const FIELD_BR: &str = "br";
pub const FIELD_CREW: &str = "crew";

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRecord {
    /// Numeric surrogate key, unique within one (category, nation).
    pub id: u64,
    /// Value of the category id-field.
    pub key: String,
    pub nation: String,
    pub name: String,
    pub rank: Option<u32>,
    /// Kept as the stored number so `4` is not rewritten as `4.0`.
    pub br: Option<Number>,
    pub crew: Option<u32>,
    /// Every attribute not listed above.
    pub extra: Map<String, Value>,
}

impl VehicleRecord {
    /// Decode a record document. A record without a `nation` inherits
    /// `default_nation` (the key of the list it was stored under).
    pub fn from_document(
        category: Category,
        default_nation: &str,
        document: Value,
    ) -> Result<Self, TypeError> {
        match document {
            Value::Object(map) => Self::from_map(category, default_nation, map),
            other => Err(TypeError::InvalidRecord(format!(
                "expected a JSON object, found {}",
                json_type(&other)
            ))),
        }
    }

    pub fn from_map(
        category: Category,
        default_nation: &str,
        mut map: Map<String, Value>,
    ) -> Result<Self, TypeError> {
        let id_field = category.id_field();

        let id = match map.remove(FIELD_ID) {
            Some(value) => value
                .as_u64()
                .ok_or_else(|| invalid(FIELD_ID, "a non-negative integer"))?,
            None => return Err(missing(FIELD_ID)),
        };
        let key = match map.remove(id_field) {
            Some(Value::String(key)) => key,
            Some(_) => return Err(invalid(id_field, "a string")),
            None => return Err(missing(id_field)),
        };
        let nation = match map.remove(FIELD_NATION) {
            Some(Value::String(nation)) => nation,
            None | Some(Value::Null) => default_nation.to_string(),
            Some(_) => return Err(invalid(FIELD_NATION, "a string")),
        };
        let name = match map.remove(FIELD_NAME) {
            Some(Value::String(name)) => name,
            Some(_) => return Err(invalid(FIELD_NAME, "a string")),
            None => return Err(missing(FIELD_NAME)),
        };
        let rank = take_if(&mut map, FIELD_RANK, as_u32);
        let br = take_if(&mut map, FIELD_BR, |value| match value {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        });
        let crew = take_if(&mut map, FIELD_CREW, as_u32);

        Ok(Self {
            id,
            key,
            nation,
            name,
            rank,
            br,
            crew,
            extra: map,
        })
    }

    /// Encode back into a document keyed by the category's id-field.
    pub fn to_map(&self, category: Category) -> Map<String, Value> {
        let mut map = self.extra.clone();
        map.insert(FIELD_ID.into(), Value::from(self.id));
        map.insert(category.id_field().into(), Value::String(self.key.clone()));
        map.insert(FIELD_NATION.into(), Value::String(self.nation.clone()));
        map.insert(FIELD_NAME.into(), Value::String(self.name.clone()));
        if let Some(rank) = self.rank {
            map.insert(FIELD_RANK.into(), Value::from(rank));
        }
        if let Some(br) = &self.br {
            map.insert(FIELD_BR.into(), Value::Number(br.clone()));
        }
        if let Some(crew) = self.crew {
            map.insert(FIELD_CREW.into(), Value::from(crew));
        }
        map
    }

    pub fn to_document(&self, category: Category) -> Value {
        Value::Object(self.to_map(category))
    }

    pub fn br_value(&self) -> Option<f64> {
        self.br.as_ref().and_then(Number::as_f64)
    }

    /// Case-insensitive substring match over name, id-field, and nation.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.key.to_lowercase().contains(needle)
            || self.nation.to_lowercase().contains(needle)
    }
}

/// Remove and convert `field` when it has the expected type; otherwise leave
/// it in the map as an ordinary attribute.
fn take_if<T>(
    map: &mut Map<String, Value>,
    field: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = convert(map.get(field)?)?;
    map.remove(field);
    Some(value)
}

fn as_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

fn missing(field: &str) -> TypeError {
    TypeError::InvalidRecord(format!("missing field `{field}`"))
}

fn invalid(field: &str, expected: &str) -> TypeError {
    TypeError::InvalidRecord(format!("field `{field}` must be {expected}"))
}

/// Human-readable JSON type name, used in error messages.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
