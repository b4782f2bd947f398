//! Контракт хранилища документов.
//!
//! Коллекция хранит JSON-объекты, адресуемые строковым ключом. Единственный
//! вид выборки списка — упорядоченный диапазон по одному полю с лимитом и
//! необязательным маркером "начать после".

use std::cmp::Ordering;

use async_trait::async_trait;
use contracts::shared::pagination::SortOrder;
use serde_json::{Map, Value};

use crate::shared::error::AppError;
use crate::shared::pagination::CursorMarker;

/// Документ коллекции: ключ и поля
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Поля вместе с `id` одним объектом (так документ уходит клиенту)
    pub fn into_json(self) -> Value {
        let mut object = self.fields;
        object.insert("id".to_string(), Value::String(self.id));
        Value::Object(object)
    }
}

/// Упорядоченная выборка диапазона
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub collection: String,
    pub sort_field: String,
    pub order: SortOrder,
    pub limit: usize,
    /// Вернуть только документы строго после этой позиции в порядке `order`
    pub start_after: Option<CursorMarker>,
}

/// Хранилище документов
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Документы с заполненным `sort_field`, упорядоченные по `(значение, id)`
    async fn query_range(&self, query: &RangeQuery) -> Result<Vec<StoredDocument>, AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, AppError>;

    async fn insert(&self, collection: &str, document: StoredDocument) -> Result<(), AppError>;

    /// Слить `patch` с полями документа. `false`, если документа нет.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<bool, AppError>;

    /// `false`, если документа нет
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError>;
}

/// Рекурсивное слияние: вложенные объекты сливаются, остальное заменяется
pub fn merge_fields(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_fields(existing, nested)
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Порядок значений ключа сортировки.
///
/// Значения разных типов упорядочены по типу: null, bool, number, string,
/// остальное.
pub fn compare_keys(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_fields_merges_nested_objects() {
        let mut target = object(json!({
            "status": "upcoming",
            "scores": { "home": 0, "away": 0 }
        }));
        merge_fields(
            &mut target,
            object(json!({ "scores": { "home": 2 }, "status": "full-time" })),
        );
        assert_eq!(
            Value::Object(target),
            json!({ "status": "full-time", "scores": { "home": 2, "away": 0 } })
        );
    }

    #[test]
    fn test_merge_fields_replaces_scalars_with_objects() {
        let mut target = object(json!({ "scores": null }));
        merge_fields(&mut target, object(json!({ "scores": { "home": 1 } })));
        assert_eq!(target["scores"], json!({ "home": 1 }));
    }

    #[test]
    fn test_compare_keys() {
        assert_eq!(compare_keys(&json!(3), &json!(10)), Ordering::Less);
        assert_eq!(compare_keys(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(compare_keys(&json!("Aba"), &json!("Abb")), Ordering::Less);
        assert_eq!(compare_keys(&json!(99), &json!("1")), Ordering::Less);
    }

    #[test]
    fn test_into_json_carries_id() {
        let doc = StoredDocument::new("x1", object(json!({ "name": "Gor Mahia" })));
        assert_eq!(doc.into_json(), json!({ "id": "x1", "name": "Gor Mahia" }));
    }
}
