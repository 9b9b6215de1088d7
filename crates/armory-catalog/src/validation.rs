//! Field validation for create and update requests.
//!
//! Every rule is checked and every violation collected; callers get the full
//! list rather than the first failure.

use std::fmt;
use std::ops::RangeInclusive;

use armory_types::record::{json_type, FIELD_BR, FIELD_CREW, FIELD_NAME, FIELD_RANK};
use armory_types::Category;
use serde::Serialize;
use serde_json::{Map, Value};

pub const RANK_RANGE: RangeInclusive<u64> = 1..=8;
pub const CREW_RANGE: RangeInclusive<u64> = 1..=5000;
pub const BR_MIN: f64 = 1.0;
pub const BR_MAX: f64 = 15.0;

/// A single failed rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Rules for a create body: the id-field and `name` are required non-blank
/// strings; optional typed fields must be in range when present.
pub fn validate_create(category: Category, body: &Map<String, Value>) -> Vec<Violation> {
    let mut violations = Vec::new();
    required_string(body, category.id_field(), &mut violations);
    required_string(body, FIELD_NAME, &mut violations);
    optional_fields(body, &mut violations);
    violations
}

/// Rules for a partial update: only fields present in the body are checked.
/// The id-field, `id` and `nation` are never updated, so they are not checked.
pub fn validate_update(body: &Map<String, Value>) -> Vec<Violation> {
    let mut violations = Vec::new();
    if body.contains_key(FIELD_NAME) {
        required_string(body, FIELD_NAME, &mut violations);
    }
    optional_fields(body, &mut violations);
    violations
}

fn required_string(body: &Map<String, Value>, field: &str, out: &mut Vec<Violation>) {
    match body.get(field) {
        None | Some(Value::Null) => out.push(Violation::new(field, "is required")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            out.push(Violation::new(field, "must not be blank"))
        }
        Some(Value::String(_)) => {}
        Some(other) => out.push(Violation::new(
            field,
            format!("must be a string, found {}", json_type(other)),
        )),
    }
}

fn optional_fields(body: &Map<String, Value>, out: &mut Vec<Violation>) {
    integer_in_range(body, FIELD_RANK, RANK_RANGE, out);
    integer_in_range(body, FIELD_CREW, CREW_RANGE, out);
    match body.get(FIELD_BR) {
        None | Some(Value::Null) => {}
        Some(value) => match value.as_f64() {
            Some(br) if (BR_MIN..=BR_MAX).contains(&br) => {}
            _ => out.push(Violation::new(
                FIELD_BR,
                format!("must be a number between {BR_MIN:.1} and {BR_MAX:.1}"),
            )),
        },
    }
}

fn integer_in_range(
    body: &Map<String, Value>,
    field: &str,
    range: RangeInclusive<u64>,
    out: &mut Vec<Violation>,
) {
    match body.get(field) {
        None | Some(Value::Null) => {}
        Some(value) => match value.as_u64() {
            Some(n) if range.contains(&n) => {}
            _ => out.push(Violation::new(
                field,
                format!(
                    "must be an integer between {} and {}",
                    range.start(),
                    range.end()
                ),
            )),
        },
    }
}
