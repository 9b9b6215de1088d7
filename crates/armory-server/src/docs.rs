//! Self-describing API index served at `GET /api`.

use armory_types::{Category, Group};
use axum::response::Json;
use serde_json::{json, Value};

const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/api", "This document"),
    ("GET", "/api/health", "Load state of every dataset"),
    ("GET", "/api/nations", "All nations"),
    ("GET", "/api/nations/:id", "One nation"),
    ("GET", "/api/vehicles", "Record counts across all groups"),
    ("GET", "/api/vehicles/:group", "Record counts for one group"),
    (
        "GET",
        "/api/vehicles/:group/:category",
        "Paginated listing across nations; query parameters q, page, limit",
    ),
    ("GET", "/api/vehicles/:group/:category/:nation", "All records of one nation"),
    ("POST", "/api/vehicles/:group/:category/:nation", "Create a record"),
    (
        "GET",
        "/api/vehicles/:group/:category/:nation/:identifier",
        "One record, by id-field value or numeric id",
    ),
    (
        "PATCH",
        "/api/vehicles/:group/:category/:nation/:identifier",
        "Merge attributes into a record; null removes an attribute",
    ),
    (
        "DELETE",
        "/api/vehicles/:group/:category/:nation/:identifier",
        "Delete a record",
    ),
];

pub fn api_document() -> Value {
    let endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|(method, path, description)| {
            json!({ "method": method, "path": path, "description": description })
        })
        .collect();

    let groups: Vec<Value> = Group::ALL
        .into_iter()
        .map(|group| {
            let categories: Vec<Value> = group
                .categories()
                .map(|category: Category| {
                    json!({
                        "category": category,
                        "id_field": category.id_field(),
                        "route": format!("/api/vehicles/{group}/{category}"),
                    })
                })
                .collect();
            json!({ "group": group, "categories": categories })
        })
        .collect();

    json!({
        "name": "armory",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
        "groups": groups,
        "error_format": { "error": { "message": "string", "details": "any" } },
    })
}

pub async fn api_docs() -> Json<Value> {
    Json(api_document())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_category_route() {
        let doc = api_document();
        let routes: Vec<&str> = doc["groups"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|g| g["categories"].as_array().unwrap())
            .map(|c| c["route"].as_str().unwrap())
            .collect();
        assert_eq!(routes.len(), Category::COUNT);
        assert!(routes.contains(&"/api/vehicles/naval/coastal"));
        assert_eq!(doc["groups"][0]["categories"][0]["id_field"], "aircraftid");
    }
}
