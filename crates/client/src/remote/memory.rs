//! In-process document store for tests, fixtures and the CLI.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, Direction, Document, DocumentStore, Query, Snapshot, StoreError};

/// A `DocumentStore` held entirely in memory.
///
/// Documents within a collection are kept in identifier order, which is also
/// the order unordered queries return them in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn add(&self, collection: Collection, data: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        data: Document,
    ) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.to_owned(), data);
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        doc.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.collections.write().await.get_mut(&collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let collections = self.collections.read().await;
        let mut results: Vec<Snapshot> = collections
            .get(&query.collection)
            .into_iter()
            .flat_map(BTreeMap::iter)
            .filter(|(_, doc)| query.filters.iter().all(|f| f.matches(doc)))
            .map(|(id, doc)| Snapshot {
                id: id.clone(),
                data: doc.clone(),
            })
            .collect();
        drop(collections);

        if let Some((field, direction)) = &query.order_by {
            results.sort_by(|a, b| order_field(a.data.get(field), b.data.get(field), *direction));
        }
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    async fn array_union(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        let entry = doc
            .entry(field.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        if let Value::Array(values) = entry
            && !values.contains(&value)
        {
            values.push(value);
        }
        Ok(())
    }

    async fn array_remove(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        if let Some(Value::Array(values)) = doc.get_mut(field) {
            values.retain(|v| *v != value);
        }
        Ok(())
    }
}

/// Order two field values. Missing values sort last in either direction.
fn order_field(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = compare_values(a, b);
            match direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => {
            match (
                a.parse::<DateTime<Utc>>().ok(),
                b.parse::<DateTime<Utc>>().ok(),
            ) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => Document::new(),
        }
    }

    #[tokio::test]
    async fn test_add_generates_unique_ids() {
        let store = MemoryStore::new();
        let a = store
            .add(Collection::Items, doc(json!({"name": "a"})))
            .await
            .unwrap();
        let b = store
            .add(Collection::Items, doc(json!({"name": "b"})))
            .await
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(Collection::Items).await, 2);
        assert_eq!(
            store.get(Collection::Items, &a).await.unwrap().unwrap()["name"],
            "a"
        );
    }

    #[tokio::test]
    async fn test_update_merges_and_requires_existing() {
        let store = MemoryStore::new();
        store
            .set(Collection::Users, "u1", doc(json!({"email": "a@b.co", "bio": "hi"})))
            .await
            .unwrap();
        store
            .update(Collection::Users, "u1", doc(json!({"bio": "updated"})))
            .await
            .unwrap();
        let user = store.get(Collection::Users, "u1").await.unwrap().unwrap();
        assert_eq!(user["email"], "a@b.co");
        assert_eq!(user["bio"], "updated");

        let err = store
            .update(Collection::Users, "missing", Document::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = MemoryStore::new();
        store.delete(Collection::Stores, "nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_query_orders_timestamps_with_missing_last() {
        let store = MemoryStore::new();
        for (id, ts) in [
            ("a", json!("2024-01-01T10:00:00Z")),
            ("b", Value::Null),
            ("c", json!("2024-03-01T10:00:00+00:00")),
        ] {
            store
                .set(
                    Collection::Items,
                    id,
                    doc(json!({"storeId": "s1", "lastUpdated": ts})),
                )
                .await
                .unwrap();
        }
        store
            .set(Collection::Items, "d", doc(json!({"storeId": "s2"})))
            .await
            .unwrap();

        let query = Query::new(Collection::Items)
            .where_eq("storeId", "s1")
            .order_by("lastUpdated", Direction::Descending);
        let ids: Vec<String> = store
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);

        let limited = store.query(&query.limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_array_union_and_remove() {
        let store = MemoryStore::new();
        store
            .set(Collection::Stores, "s1", doc(json!({"followers": "corrupt"})))
            .await
            .unwrap();
        store
            .array_union(Collection::Stores, "s1", "followers", json!("u1"))
            .await
            .unwrap();
        store
            .array_union(Collection::Stores, "s1", "followers", json!("u1"))
            .await
            .unwrap();
        let s = store.get(Collection::Stores, "s1").await.unwrap().unwrap();
        assert_eq!(s["followers"], json!(["u1"]));

        store
            .array_remove(Collection::Stores, "s1", "followers", json!("u1"))
            .await
            .unwrap();
        let s = store.get(Collection::Stores, "s1").await.unwrap().unwrap();
        assert_eq!(s["followers"], json!([]));
    }
}
