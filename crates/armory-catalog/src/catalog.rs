//! The in-memory catalog and its nation-scoped CRUD operations.
//!
//! Each category's collection (nation → ordered records) sits behind its own
//! `RwLock`. A mutation holds the write lock across the whole
//! validate → apply → persist sequence and rolls the in-memory change back if
//! the document write fails, so readers only ever see persisted state and two
//! writers to the same category never interleave.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use armory_store::{DocumentStore, StoreError};
use armory_types::record::{FIELD_ID, FIELD_NATION};
use armory_types::{Category, Group, Identifier, Nation, TypeError, VehicleRecord};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::overview::{CatalogOverview, CategoryOverview, GroupOverview, LoadStatus};
use crate::query::{paginate, ListQuery, Page, PageLimits};
use crate::validation::{self, Violation};

/// Document path of the nations list.
pub const NATIONS_PATH: &str = "nations.json";

/// Nation key → records, in insertion order.
pub type Collection = BTreeMap<String, Vec<VehicleRecord>>;

type Slot = RwLock<Option<Collection>>;

/// Loaded reference data plus the store it is written back to.
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
    nations: Option<Vec<Nation>>,
    /// Indexed by `Category as usize`; `None` when the document did not load.
    slots: [Slot; Category::COUNT],
}

impl Catalog {
    /// Load the nations list and every category document from `store`.
    ///
    /// Documents that are missing or malformed are logged and left unloaded;
    /// operations on them report [`CatalogError::NotLoaded`].
    pub fn load(store: Arc<dyn DocumentStore>) -> Self {
        let nations = store
            .load(NATIONS_PATH)
            .and_then(|doc| match Nation::list_from_document(doc) {
                Ok(nations) => Some(nations),
                Err(e) => {
                    warn!(path = NATIONS_PATH, error = %e, "invalid nations document");
                    None
                }
            });

        let slots = Category::ALL.map(|category| {
            let collection = store.load(category.path()).and_then(|doc| {
                match decode_collection(category, doc) {
                    Ok(collection) => Some(collection),
                    Err(e) => {
                        warn!(path = category.path(), error = %e, "invalid category document");
                        None
                    }
                }
            });
            RwLock::new(collection)
        });

        let catalog = Self {
            store,
            nations,
            slots,
        };
        for status in catalog.load_report() {
            if status.loaded {
                info!(
                    dataset = status.dataset,
                    records = status.records,
                    "dataset loaded"
                );
            } else {
                warn!(dataset = status.dataset, path = status.path, "dataset not loaded");
            }
        }
        catalog
    }

    // ---- Nations ----

    pub fn nations(&self) -> CatalogResult<&[Nation]> {
        self.nations
            .as_deref()
            .ok_or(CatalogError::NotLoaded { dataset: "nations" })
    }

    pub fn nation(&self, id: &str) -> CatalogResult<&Nation> {
        self.nations()?
            .iter()
            .find(|nation| nation.id == id)
            .ok_or_else(|| CatalogError::UnknownNation {
                nation: id.to_string(),
            })
    }

    // ---- Reads ----

    pub fn is_loaded(&self, category: Category) -> bool {
        self.read(category).map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Flattened listing across nations (nation keys in sorted order, records
    /// in list order), filtered and paginated.
    pub fn list(
        &self,
        category: Category,
        query: &ListQuery,
        limits: PageLimits,
    ) -> CatalogResult<Page<VehicleRecord>> {
        let guard = self.read(category)?;
        let collection = loaded(category, &guard)?;
        let needle = query.needle();
        let matching: Vec<VehicleRecord> = collection
            .values()
            .flatten()
            .filter(|record| needle.as_deref().map_or(true, |n| record.matches_search(n)))
            .cloned()
            .collect();
        let (page, limit) = query.normalize(limits);
        Ok(paginate(matching, page, limit))
    }

    /// All records of one nation. An initialised but empty list is a valid,
    /// empty result; only a missing nation key is `NationNotFound`.
    pub fn list_by_nation(&self, category: Category, nation: &str) -> CatalogResult<Vec<VehicleRecord>> {
        let guard = self.read(category)?;
        let collection = loaded(category, &guard)?;
        collection
            .get(nation)
            .cloned()
            .ok_or_else(|| nation_not_found(category, nation, collection))
    }

    pub fn get(
        &self,
        category: Category,
        nation: &str,
        identifier: &Identifier,
    ) -> CatalogResult<VehicleRecord> {
        let guard = self.read(category)?;
        let collection = loaded(category, &guard)?;
        let records = collection
            .get(nation)
            .ok_or_else(|| nation_not_found(category, nation, collection))?;
        identifier
            .position_in(records)
            .map(|index| records[index].clone())
            .ok_or_else(|| record_not_found(category, nation, identifier))
    }

    /// Copy of a category's whole collection.
    pub fn snapshot(&self, category: Category) -> CatalogResult<Collection> {
        let guard = self.read(category)?;
        let collection = loaded(category, &guard)?;
        Ok(collection.clone())
    }

    // ---- Mutations ----

    /// Append a new record to `nation`, creating the nation list if needed.
    ///
    /// `id` and `nation` in the body are ignored: the nation comes from the
    /// caller and the id is one more than the largest id in that nation.
    pub fn create(
        &self,
        category: Category,
        nation: &str,
        mut body: Map<String, Value>,
    ) -> CatalogResult<VehicleRecord> {
        let mut guard = self.write(category)?;
        let collection = loaded_mut(category, &mut guard)?;

        let violations = validation::validate_create(category, &body);
        if !violations.is_empty() {
            return Err(CatalogError::Validation { violations });
        }

        let id_field = category.id_field();
        let key = body
            .get(id_field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let existing = collection.get(nation);
        if existing.is_some_and(|records| records.iter().any(|r| r.key == key)) {
            return Err(CatalogError::Conflict {
                category,
                nation: nation.to_string(),
                field: id_field,
                value: key,
            });
        }
        let id = existing
            .and_then(|records| records.iter().map(|r| r.id).max())
            .map_or(1, |max| max.saturating_add(1));

        body.retain(|_, value| !value.is_null());
        body.insert(FIELD_ID.into(), Value::from(id));
        body.insert(FIELD_NATION.into(), Value::String(nation.to_string()));
        let record = VehicleRecord::from_map(category, nation, body).map_err(invalid_body)?;

        let initialised = !collection.contains_key(nation);
        collection
            .entry(nation.to_string())
            .or_default()
            .push(record.clone());

        if let Err(source) = self.persist(category, collection) {
            if initialised {
                collection.remove(nation);
            } else if let Some(records) = collection.get_mut(nation) {
                records.pop();
            }
            return Err(rolled_back(category, nation, "create", source));
        }

        debug!(%category, nation, id, key = %record.key, "record created");
        Ok(record)
    }

    /// Merge `patch` over an existing record. `id`, `nation` and the id-field
    /// keep their stored values whatever the patch says; a `null` value
    /// removes the attribute.
    pub fn update(
        &self,
        category: Category,
        nation: &str,
        identifier: &Identifier,
        patch: Map<String, Value>,
    ) -> CatalogResult<VehicleRecord> {
        let mut guard = self.write(category)?;
        let collection = loaded_mut(category, &mut guard)?;
        let records = records_mut(category, nation, collection)?;
        let index = identifier
            .position_in(records)
            .ok_or_else(|| record_not_found(category, nation, identifier))?;

        let violations = validation::validate_update(&patch);
        if !violations.is_empty() {
            return Err(CatalogError::Validation { violations });
        }

        let previous = records[index].clone();
        let updated = merge(category, &previous, patch)?;
        records[index] = updated.clone();

        if let Err(source) = self.persist(category, collection) {
            if let Some(records) = collection.get_mut(nation) {
                records[index] = previous;
            }
            return Err(rolled_back(category, nation, "update", source));
        }

        debug!(%category, nation, id = updated.id, key = %updated.key, "record updated");
        Ok(updated)
    }

    /// Remove a record and return it.
    pub fn delete(
        &self,
        category: Category,
        nation: &str,
        identifier: &Identifier,
    ) -> CatalogResult<VehicleRecord> {
        let mut guard = self.write(category)?;
        let collection = loaded_mut(category, &mut guard)?;
        let records = records_mut(category, nation, collection)?;
        let index = identifier
            .position_in(records)
            .ok_or_else(|| record_not_found(category, nation, identifier))?;
        let removed = records.remove(index);

        if let Err(source) = self.persist(category, collection) {
            if let Some(records) = collection.get_mut(nation) {
                records.insert(index, removed);
            }
            return Err(rolled_back(category, nation, "delete", source));
        }

        debug!(%category, nation, id = removed.id, key = %removed.key, "record deleted");
        Ok(removed)
    }

    // ---- Overviews ----

    pub fn category_overview(&self, category: Category) -> CatalogResult<CategoryOverview> {
        let guard = self.read(category)?;
        let nations: BTreeMap<String, usize> = guard
            .as_ref()
            .map(|collection| {
                collection
                    .iter()
                    .map(|(nation, records)| (nation.clone(), records.len()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(CategoryOverview {
            category,
            group: category.group(),
            id_field: category.id_field(),
            loaded: guard.is_some(),
            total: nations.values().sum(),
            nations,
        })
    }

    pub fn group_overview(&self, group: Group) -> CatalogResult<GroupOverview> {
        let categories = group
            .categories()
            .map(|category| self.category_overview(category))
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(GroupOverview {
            group,
            total: categories.iter().map(|c| c.total).sum(),
            categories,
        })
    }

    pub fn overview(&self) -> CatalogResult<CatalogOverview> {
        let groups = Group::ALL
            .into_iter()
            .map(|group| self.group_overview(group))
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(CatalogOverview {
            nations: self.nations.as_ref().map_or(0, Vec::len),
            total: groups.iter().map(|g| g.total).sum(),
            groups,
        })
    }

    /// Load outcome of every document, nations first.
    pub fn load_report(&self) -> Vec<LoadStatus> {
        let mut report = vec![LoadStatus {
            dataset: "nations",
            path: NATIONS_PATH,
            loaded: self.nations.is_some(),
            groups: self.nations.as_ref().map_or(0, Vec::len),
            records: self.nations.as_ref().map_or(0, Vec::len),
        }];
        for category in Category::ALL {
            let (loaded, groups, records) = match self.read(category) {
                Ok(guard) => match guard.as_ref() {
                    Some(collection) => (
                        true,
                        collection.len(),
                        collection.values().map(Vec::len).sum(),
                    ),
                    None => (false, 0, 0),
                },
                Err(_) => (false, 0, 0),
            };
            report.push(LoadStatus {
                dataset: category.as_str(),
                path: category.path(),
                loaded,
                groups,
                records,
            });
        }
        report
    }

    // ---- Internals ----

    fn read(&self, category: Category) -> CatalogResult<RwLockReadGuard<'_, Option<Collection>>> {
        self.slots[category as usize]
            .read()
            .map_err(|_| CatalogError::LockPoisoned { category })
    }

    fn write(&self, category: Category) -> CatalogResult<RwLockWriteGuard<'_, Option<Collection>>> {
        self.slots[category as usize]
            .write()
            .map_err(|_| CatalogError::LockPoisoned { category })
    }

    fn persist(&self, category: Category, collection: &Collection) -> Result<(), StoreError> {
        self.store
            .write_document(category.path(), &encode_collection(category, collection))
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded: Vec<&str> = self
            .load_report()
            .into_iter()
            .filter(|status| status.loaded)
            .map(|status| status.dataset)
            .collect();
        f.debug_struct("Catalog").field("loaded", &loaded).finish()
    }
}

/// Decode a category document: `{ "<nation>": [record, ...], ... }`.
pub fn decode_collection(category: Category, document: Value) -> Result<Collection, TypeError> {
    let Value::Object(map) = document else {
        return Err(TypeError::InvalidRecord(format!(
            "{category} document must be an object keyed by nation"
        )));
    };
    map.into_iter()
        .map(|(nation, records)| {
            let Value::Array(records) = records else {
                return Err(TypeError::InvalidRecord(format!(
                    "{category} entry for `{nation}` must be an array"
                )));
            };
            let records = records
                .into_iter()
                .enumerate()
                .map(|(i, record)| {
                    VehicleRecord::from_document(category, &nation, record)
                        .map_err(|e| TypeError::InvalidRecord(format!("{nation}[{i}]: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((nation, records))
        })
        .collect()
}

pub fn encode_collection(category: Category, collection: &Collection) -> Value {
    Value::Object(
        collection
            .iter()
            .map(|(nation, records)| {
                let records = records.iter().map(|r| r.to_document(category)).collect();
                (nation.clone(), Value::Array(records))
            })
            .collect(),
    )
}

fn loaded(category: Category, slot: &Option<Collection>) -> CatalogResult<&Collection> {
    slot.as_ref().ok_or(CatalogError::NotLoaded {
        dataset: category.as_str(),
    })
}

fn loaded_mut(category: Category, slot: &mut Option<Collection>) -> CatalogResult<&mut Collection> {
    slot.as_mut().ok_or(CatalogError::NotLoaded {
        dataset: category.as_str(),
    })
}

fn records_mut<'a>(
    category: Category,
    nation: &str,
    collection: &'a mut Collection,
) -> CatalogResult<&'a mut Vec<VehicleRecord>> {
    if !collection.contains_key(nation) {
        return Err(nation_not_found(category, nation, collection));
    }
    Ok(collection.entry(nation.to_string()).or_default())
}

fn merge(
    category: Category,
    previous: &VehicleRecord,
    patch: Map<String, Value>,
) -> CatalogResult<VehicleRecord> {
    let id_field = category.id_field();
    let mut merged = previous.to_map(category);
    for (field, value) in patch {
        if field == FIELD_ID || field == FIELD_NATION || field == id_field {
            continue;
        }
        if value.is_null() {
            merged.remove(&field);
        } else {
            merged.insert(field, value);
        }
    }
    let mut updated =
        VehicleRecord::from_map(category, &previous.nation, merged).map_err(invalid_body)?;
    updated.id = previous.id;
    updated.nation = previous.nation.clone();
    updated.key = previous.key.clone();
    Ok(updated)
}

fn nation_not_found(category: Category, nation: &str, collection: &Collection) -> CatalogError {
    CatalogError::NationNotFound {
        category,
        nation: nation.to_string(),
        available_nations: collection.keys().cloned().collect(),
    }
}

fn record_not_found(category: Category, nation: &str, identifier: &Identifier) -> CatalogError {
    CatalogError::RecordNotFound {
        category,
        nation: nation.to_string(),
        identifier: identifier.raw().to_string(),
    }
}

fn invalid_body(e: TypeError) -> CatalogError {
    CatalogError::Validation {
        violations: vec![Violation::new("body", e.to_string())],
    }
}

fn rolled_back(category: Category, nation: &str, op: &str, source: StoreError) -> CatalogError {
    warn!(%category, nation, op, error = %source, "persist failed; in-memory change rolled back");
    CatalogError::Persistence { category, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_store::{InMemoryDocumentStore, JsonFileStore};
    use serde_json::json;
    use std::thread;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    fn fixture_store() -> Arc<InMemoryDocumentStore> {
        Arc::new(InMemoryDocumentStore::with_documents([
            (
                NATIONS_PATH,
                json!([
                    {"id": "usa", "name": "USA", "fullName": "United States of America", "flag": "usa.png"},
                    {"id": "germany", "name": "Germany", "fullName": "Federal Republic of Germany", "flag": "germany.png"}
                ]),
            ),
            (
                "aviation/aircraft.json",
                json!({
                    "usa": [
                        {"id": 1, "aircraftid": "p-51d", "nation": "usa", "name": "P-51D Mustang", "rank": 2, "br": 3.7},
                        {"id": 2, "aircraftid": "f-16a", "nation": "usa", "name": "F-16A", "rank": 7, "br": 12.0}
                    ],
                    "germany": [
                        {"id": 1, "aircraftid": "bf-109-f4", "nation": "germany", "name": "Bf 109 F-4", "rank": 2}
                    ],
                    "sweden": []
                }),
            ),
            (
                "ground/tanks.json",
                json!({
                    "germany": [{"id": 4, "vehicleid": "tiger-h1", "name": "Tiger H1", "crew": 5}]
                }),
            ),
        ]))
    }

    fn fixture() -> (Arc<InMemoryDocumentStore>, Catalog) {
        let store = fixture_store();
        let catalog = Catalog::load(store.clone());
        (store, catalog)
    }

    fn raptor() -> Map<String, Value> {
        body(json!({"aircraftid": "f-22-raptor", "name": "F-22 Raptor", "rank": 8, "br": 13.0}))
    }

    #[test]
    fn load_marks_missing_documents_unloaded() {
        let (_store, catalog) = fixture();
        assert!(catalog.is_loaded(Category::Aircraft));
        assert!(catalog.is_loaded(Category::Tanks));
        assert!(!catalog.is_loaded(Category::Helicopters));
        assert!(matches!(
            catalog.list_by_nation(Category::Helicopters, "usa"),
            Err(CatalogError::NotLoaded { dataset: "helicopters" })
        ));
        assert!(matches!(
            catalog.create(Category::Coastal, "usa", raptor()),
            Err(CatalogError::NotLoaded { dataset: "coastal" })
        ));
    }

    #[test]
    fn malformed_category_document_is_not_loaded() {
        let store = Arc::new(InMemoryDocumentStore::with_documents([(
            "aviation/aircraft.json",
            json!({"usa": [{"id": "one", "aircraftid": "x", "name": "X"}]}),
        )]));
        let catalog = Catalog::load(store);
        assert!(!catalog.is_loaded(Category::Aircraft));
        assert!(matches!(
            catalog.nations(),
            Err(CatalogError::NotLoaded { dataset: "nations" })
        ));
    }

    #[test]
    fn nations_lookup() {
        let (_store, catalog) = fixture();
        assert_eq!(catalog.nations().unwrap().len(), 2);
        assert_eq!(catalog.nation("germany").unwrap().name, "Germany");
        assert!(matches!(
            catalog.nation("atlantis"),
            Err(CatalogError::UnknownNation { nation }) if nation == "atlantis"
        ));
    }

    #[test]
    fn list_by_nation_distinguishes_missing_from_empty() {
        let (_store, catalog) = fixture();
        assert!(catalog.list_by_nation(Category::Aircraft, "sweden").unwrap().is_empty());
        match catalog.list_by_nation(Category::Aircraft, "atlantis") {
            Err(CatalogError::NationNotFound { available_nations, .. }) => {
                assert_eq!(available_nations, vec!["germany", "sweden", "usa"]);
            }
            other => panic!("expected NationNotFound, got {other:?}"),
        }
    }

    #[test]
    fn create_then_get_by_both_keys() {
        let (_store, catalog) = fixture();
        let created = catalog.create(Category::Aircraft, "usa", raptor()).unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.nation, "usa");

        let by_key = catalog
            .get(Category::Aircraft, "usa", &Identifier::parse("f-22-raptor"))
            .unwrap();
        let by_id = catalog
            .get(Category::Aircraft, "usa", &Identifier::parse("3"))
            .unwrap();
        assert_eq!(by_key, created);
        assert_eq!(by_id, created);
    }

    #[test]
    fn create_ignores_body_id_and_nation() {
        let (_store, catalog) = fixture();
        let mut b = raptor();
        b.insert("id".into(), json!(999));
        b.insert("nation".into(), json!("ussr"));
        let created = catalog.create(Category::Aircraft, "usa", b).unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.nation, "usa");
    }

    #[test]
    fn ids_are_scoped_per_nation() {
        let (_store, catalog) = fixture();
        let created = catalog
            .create(
                Category::Aircraft,
                "germany",
                body(json!({"aircraftid": "me-262", "name": "Me 262 A-1a"})),
            )
            .unwrap();
        assert_eq!(created.id, 2);

        let first = catalog
            .create(
                Category::Aircraft,
                "sweden",
                body(json!({"aircraftid": "j29a", "name": "J29A"})),
            )
            .unwrap();
        assert_eq!(first.id, 1);
    }

    #[test]
    fn create_into_new_nation_initialises_list() {
        let (store, catalog) = fixture();
        let created = catalog
            .create(
                Category::Aircraft,
                "japan",
                body(json!({"aircraftid": "a6m2", "name": "A6M2"})),
            )
            .unwrap();
        assert_eq!(created.id, 1);
        let doc = store.snapshot("aviation/aircraft.json").unwrap();
        assert_eq!(doc["japan"][0]["aircraftid"], "a6m2");
        assert_eq!(doc["japan"][0]["nation"], "japan");
    }

    #[test]
    fn duplicate_key_conflicts_only_within_nation() {
        let (_store, catalog) = fixture();
        catalog.create(Category::Aircraft, "usa", raptor()).unwrap();
        assert!(matches!(
            catalog.create(Category::Aircraft, "usa", raptor()),
            Err(CatalogError::Conflict { field: "aircraftid", .. })
        ));
        catalog.create(Category::Aircraft, "germany", raptor()).unwrap();
    }

    #[test]
    fn create_validation_reports_all_violations() {
        let (store, catalog) = fixture();
        let err = catalog
            .create(Category::Aircraft, "usa", body(json!({"name": " ", "rank": 12})))
            .unwrap_err();
        match err {
            CatalogError::Validation { violations } => assert_eq!(violations.len(), 3),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn create_rolls_back_on_persist_failure() {
        let (store, catalog) = fixture();
        let before = catalog.snapshot(Category::Aircraft).unwrap();
        let doc_before = store.snapshot("aviation/aircraft.json");
        store.set_fail_writes(true);

        let err = catalog.create(Category::Aircraft, "usa", raptor()).unwrap_err();
        assert!(matches!(err, CatalogError::Persistence { category: Category::Aircraft, .. }));
        assert_eq!(catalog.snapshot(Category::Aircraft).unwrap(), before);
        assert_eq!(store.snapshot("aviation/aircraft.json"), doc_before);

        // The auto-initialised nation list is removed too.
        let err = catalog
            .create(Category::Aircraft, "italy", body(json!({"aircraftid": "g-91", "name": "G.91"})))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Persistence { .. }));
        assert_eq!(catalog.snapshot(Category::Aircraft).unwrap(), before);
    }

    #[test]
    fn update_merges_and_keeps_key_fields() {
        let (_store, catalog) = fixture();
        let updated = catalog
            .update(
                Category::Aircraft,
                "usa",
                &Identifier::parse("f-16a"),
                body(json!({
                    "br": 12.3,
                    "id": 77,
                    "nation": "france",
                    "aircraftid": "renamed",
                    "role": "multirole"
                })),
            )
            .unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.nation, "usa");
        assert_eq!(updated.key, "f-16a");
        assert_eq!(updated.br_value(), Some(12.3));
        assert_eq!(updated.rank, Some(7));
        assert_eq!(updated.name, "F-16A");
        assert_eq!(updated.extra["role"], "multirole");

        let stored = catalog
            .get(Category::Aircraft, "usa", &Identifier::parse("2"))
            .unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn update_null_clears_optional_attributes() {
        let (_store, catalog) = fixture();
        let updated = catalog
            .update(
                Category::Aircraft,
                "usa",
                &Identifier::parse("p-51d"),
                body(json!({"rank": null, "br": null})),
            )
            .unwrap();
        assert_eq!(updated.rank, None);
        assert_eq!(updated.br, None);
    }

    #[test]
    fn update_preserves_sibling_order() {
        let (_store, catalog) = fixture();
        catalog
            .update(
                Category::Aircraft,
                "usa",
                &Identifier::parse("1"),
                body(json!({"name": "P-51D-30"})),
            )
            .unwrap();
        let keys: Vec<_> = catalog
            .list_by_nation(Category::Aircraft, "usa")
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["p-51d", "f-16a"]);
    }

    #[test]
    fn update_resolution_and_validation_errors() {
        let (_store, catalog) = fixture();
        assert!(matches!(
            catalog.update(Category::Aircraft, "usa", &Identifier::parse("nope"), Map::new()),
            Err(CatalogError::RecordNotFound { .. })
        ));
        assert!(matches!(
            catalog.update(Category::Aircraft, "atlantis", &Identifier::parse("1"), Map::new()),
            Err(CatalogError::NationNotFound { .. })
        ));
        assert!(matches!(
            catalog.update(
                Category::Aircraft,
                "usa",
                &Identifier::parse("1"),
                body(json!({"br": 40}))
            ),
            Err(CatalogError::Validation { .. })
        ));
    }

    #[test]
    fn update_rolls_back_on_persist_failure() {
        let (store, catalog) = fixture();
        let before = catalog.snapshot(Category::Aircraft).unwrap();
        store.set_fail_writes(true);
        let err = catalog
            .update(
                Category::Aircraft,
                "usa",
                &Identifier::parse("f-16a"),
                body(json!({"br": 11.0, "name": "F-16C"})),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::Persistence { .. }));
        assert_eq!(catalog.snapshot(Category::Aircraft).unwrap(), before);
    }

    #[test]
    fn delete_then_lookup_fails() {
        let (store, catalog) = fixture();
        let removed = catalog
            .delete(Category::Aircraft, "usa", &Identifier::parse("p-51d"))
            .unwrap();
        assert_eq!(removed.id, 1);
        assert!(matches!(
            catalog.get(Category::Aircraft, "usa", &Identifier::parse("p-51d")),
            Err(CatalogError::RecordNotFound { .. })
        ));
        let doc = store.snapshot("aviation/aircraft.json").unwrap();
        assert_eq!(doc["usa"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn delete_rolls_back_to_original_index() {
        let (store, catalog) = fixture();
        let before = catalog.snapshot(Category::Aircraft).unwrap();
        store.set_fail_writes(true);
        let err = catalog
            .delete(Category::Aircraft, "usa", &Identifier::parse("1"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Persistence { .. }));
        assert_eq!(catalog.snapshot(Category::Aircraft).unwrap(), before);
    }

    #[test]
    fn list_filters_and_paginates() {
        let (_store, catalog) = fixture();
        let limits = PageLimits { default_limit: 2, max_limit: 2 };

        let all = catalog.list(Category::Aircraft, &ListQuery::default(), limits).unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.total_pages, 2);
        // Nation keys sorted: germany before usa.
        assert_eq!(all.items[0].key, "bf-109-f4");

        let query = ListQuery { search: Some("MUSTANG".into()), ..Default::default() };
        let found = catalog.list(Category::Aircraft, &query, limits).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].key, "p-51d");

        let query = ListQuery { search: Some("germ".into()), ..Default::default() };
        assert_eq!(catalog.list(Category::Aircraft, &query, limits).unwrap().total, 1);
    }

    #[test]
    fn overviews_count_records() {
        let (_store, catalog) = fixture();
        let aviation = catalog.group_overview(Group::Aviation).unwrap();
        assert_eq!(aviation.total, 3);
        assert_eq!(aviation.categories.len(), 2);
        assert!(!aviation.categories[1].loaded);
        assert_eq!(aviation.categories[0].nations["sweden"], 0);

        let all = catalog.overview().unwrap();
        assert_eq!(all.nations, 2);
        assert_eq!(all.total, 4);
    }

    #[test]
    fn load_report_lists_every_document() {
        let (_store, catalog) = fixture();
        let report = catalog.load_report();
        assert_eq!(report.len(), 1 + Category::ALL.len());
        assert_eq!(report[0].dataset, "nations");
        let aircraft = report.iter().find(|s| s.dataset == "aircraft").unwrap();
        assert!(aircraft.loaded);
        assert_eq!(aircraft.groups, 3);
        assert_eq!(aircraft.records, 3);
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let (store, catalog) = fixture();
        let catalog = Arc::new(catalog);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || {
                    catalog
                        .create(
                            Category::Tanks,
                            "usa",
                            body(json!({"vehicleid": format!("m{i}"), "name": format!("M{i}")})),
                        )
                        .unwrap()
                        .id
                })
            })
            .collect();
        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
        let doc = store.snapshot("ground/tanks.json").unwrap();
        assert_eq!(doc["usa"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn concurrent_updates_to_one_record_all_apply() {
        let (store, catalog) = fixture();
        let catalog = Arc::new(catalog);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || {
                    let mut patch = Map::new();
                    patch.insert(format!("note{i}"), json!(i));
                    catalog
                        .update(Category::Aircraft, "usa", &Identifier::parse("f-16a"), patch)
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = catalog
            .get(Category::Aircraft, "usa", &Identifier::parse("f-16a"))
            .unwrap();
        for i in 0..8 {
            assert_eq!(record.extra[&format!("note{i}")], i);
        }
        let doc = store.snapshot("aviation/aircraft.json").unwrap();
        assert_eq!(doc["usa"][1], record.to_document(Category::Aircraft));
    }

    #[test]
    fn create_leaves_untouched_records_byte_identical() {
        let store = Arc::new(InMemoryDocumentStore::with_documents([(
            "ground/tanks.json",
            json!({"usa": [{"id": 1, "vehicleid": "m4", "nation": "usa", "name": "M4", "br": 4}]}),
        )]));
        let catalog = Catalog::load(store.clone());
        catalog
            .create(Category::Tanks, "usa", body(json!({"vehicleid": "m26", "name": "M26"})))
            .unwrap();
        let doc = store.snapshot("ground/tanks.json").unwrap();
        assert_eq!(
            doc["usa"][0],
            json!({"id": 1, "vehicleid": "m4", "nation": "usa", "name": "M4", "br": 4})
        );
        assert!(doc["usa"][0]["br"].is_u64());
    }

    #[test]
    fn mistyped_optional_attribute_does_not_unload_category() {
        let store = Arc::new(InMemoryDocumentStore::with_documents([(
            "ground/tanks.json",
            json!({"usa": [{"id": 1, "vehicleid": "m4", "name": "M4", "rank": 2.5, "br": "5.7"}]}),
        )]));
        let catalog = Catalog::load(store.clone());
        assert!(catalog.is_loaded(Category::Tanks));

        catalog
            .update(Category::Tanks, "usa", &Identifier::parse("m4"), body(json!({"rank": 3})))
            .unwrap();
        let doc = store.snapshot("ground/tanks.json").unwrap();
        assert_eq!(doc["usa"][0]["rank"], 3);
        assert_eq!(doc["usa"][0]["br"], "5.7");
    }

    #[test]
    fn file_store_and_memory_agree_after_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let files = JsonFileStore::new(dir.path());
        files
            .write_document("aviation/aircraft.json", &json!({"usa": []}))
            .unwrap();
        let files = Arc::new(files);
        let catalog = Catalog::load(files.clone());

        catalog.create(Category::Aircraft, "usa", raptor()).unwrap();
        catalog
            .update(
                Category::Aircraft,
                "usa",
                &Identifier::parse("f-22-raptor"),
                body(json!({"br": 13.3})),
            )
            .unwrap();

        let on_disk = files.read_document("aviation/aircraft.json").unwrap();
        let in_memory = encode_collection(Category::Aircraft, &catalog.snapshot(Category::Aircraft).unwrap());
        assert_eq!(on_disk, in_memory);

        let reloaded = Catalog::load(files);
        assert_eq!(
            reloaded.snapshot(Category::Aircraft).unwrap(),
            catalog.snapshot(Category::Aircraft).unwrap()
        );
    }

    #[test]
    fn repeated_reads_serialize_identically() {
        let (_store, catalog) = fixture();
        let id = Identifier::parse("f-16a");
        let first = serde_json::to_vec(&catalog.get(Category::Aircraft, "usa", &id).unwrap().to_document(Category::Aircraft)).unwrap();
        let second = serde_json::to_vec(&catalog.get(Category::Aircraft, "usa", &id).unwrap().to_document(Category::Aircraft)).unwrap();
        assert_eq!(first, second);
    }
}
