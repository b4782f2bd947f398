//! Хранилище документов поверх SQLite: тело документа лежит JSON-строкой,
//! сортировка и курсоры строятся через `json_extract`.

use async_trait::async_trait;
use chrono::Utc;
use contracts::shared::pagination::SortOrder;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseBackend, Set, Statement, TransactionTrait};
use serde_json::{Map, Value};

use super::document_store::{merge_fields, DocumentStore, RangeQuery, StoredDocument};
use crate::shared::error::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for StoredDocument {
    type Error = AppError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let fields: Map<String, Value> = serde_json::from_str(&m.body).map_err(|e| {
            AppError::DataAccess(format!("corrupt document {}/{}: {}", m.collection, m.id, e))
        })?;
        Ok(StoredDocument::new(m.id, fields))
    }
}

#[derive(Clone)]
pub struct SqliteDocumentStore {
    conn: DatabaseConnection,
}

impl SqliteDocumentStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

/// Путь JSON для `json_extract`; допускаются только простые имена полей
fn field_path(field: &str) -> Result<String, AppError> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(AppError::DataAccess(format!(
            "malformed query: invalid sort field '{}'",
            field
        )));
    }
    Ok(format!("$.{}", field))
}

fn key_to_sql(key: &Value) -> Result<sea_orm::Value, AppError> {
    match key {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i.into()),
            None => Ok(n.as_f64().unwrap_or_default().into()),
        },
        Value::String(s) => Ok(s.clone().into()),
        Value::Bool(b) => Ok((*b as i64).into()),
        other => Err(AppError::DataAccess(format!(
            "malformed query: unsupported cursor key {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn query_range(&self, query: &RangeQuery) -> Result<Vec<StoredDocument>, AppError> {
        let path = field_path(&query.sort_field)?;
        let (cmp, dir) = match query.order {
            SortOrder::Asc => (">", "ASC"),
            SortOrder::Desc => ("<", "DESC"),
        };

        let mut sql = String::from(
            "SELECT collection, id, body, created_at, updated_at FROM documents \
             WHERE collection = ? AND json_extract(body, ?) IS NOT NULL",
        );
        let mut values: Vec<sea_orm::Value> =
            vec![query.collection.clone().into(), path.clone().into()];

        if let Some(marker) = &query.start_after {
            let key = key_to_sql(&marker.key)?;
            sql.push_str(&format!(
                " AND (json_extract(body, ?) {cmp} ? OR (json_extract(body, ?) = ? AND id {cmp} ?))"
            ));
            values.push(path.clone().into());
            values.push(key.clone());
            values.push(path.clone().into());
            values.push(key);
            values.push(marker.id.clone().into());
        }

        sql.push_str(&format!(
            " ORDER BY json_extract(body, ?) {dir}, id {dir} LIMIT ?"
        ));
        values.push(path.into());
        values.push((query.limit.min(i64::MAX as usize) as i64).into());

        let rows = Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                sql,
                values,
            ))
            .all(&self.conn)
            .await?;

        rows.into_iter().map(StoredDocument::try_from).collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, AppError> {
        Entity::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.conn)
            .await?
            .map(StoredDocument::try_from)
            .transpose()
    }

    async fn insert(&self, collection: &str, document: StoredDocument) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let active = ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(document.id.clone()),
            body: Set(serde_json::to_string(&document.fields)?),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };
        active.insert(&self.conn).await?;

        tracing::debug!("Inserted document {}/{}", collection, document.id);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<bool, AppError> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Entity::find_by_id((collection.to_string(), id.to_string()))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        let mut fields = StoredDocument::try_from(existing.clone())?.fields;
        merge_fields(&mut fields, patch);

        let mut active: ActiveModel = existing.into();
        active.body = Set(serde_json::to_string(&fields)?);
        active.updated_at = Set(Utc::now().to_rfc3339());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let result = Entity::delete_by_id((collection.to_string(), id.to_string()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use crate::shared::pagination::CursorMarker;
    use serde_json::json;

    async fn store_with_players(numbers: &[i64]) -> SqliteDocumentStore {
        let store = SqliteDocumentStore::new(connect_in_memory().await.unwrap());
        for (i, number) in numbers.iter().enumerate() {
            let fields = json!({ "last_name": format!("Player{}", i), "number": number });
            store
                .insert(
                    "players",
                    StoredDocument::new(format!("p{:02}", i), fields.as_object().cloned().unwrap()),
                )
                .await
                .unwrap();
        }
        store
    }

    fn numbers(docs: &[StoredDocument]) -> Vec<i64> {
        docs.iter()
            .map(|d| d.fields["number"].as_i64().unwrap())
            .collect()
    }

    fn query(order: SortOrder, limit: usize, start_after: Option<CursorMarker>) -> RangeQuery {
        RangeQuery {
            collection: "players".into(),
            sort_field: "number".into(),
            order,
            limit,
            start_after,
        }
    }

    #[tokio::test]
    async fn test_orders_numerically_not_lexically() {
        let store = store_with_players(&[10, 2, 33, 1]).await;
        let docs = store.query_range(&query(SortOrder::Asc, 10, None)).await.unwrap();
        assert_eq!(numbers(&docs), vec![1, 2, 10, 33]);

        let docs = store.query_range(&query(SortOrder::Desc, 2, None)).await.unwrap();
        assert_eq!(numbers(&docs), vec![33, 10]);
    }

    #[tokio::test]
    async fn test_unbounded_limit_returns_everything() {
        let store = store_with_players(&[3, 1, 2]).await;
        let docs = store
            .query_range(&query(SortOrder::Asc, usize::MAX, None))
            .await
            .unwrap();
        assert_eq!(numbers(&docs), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_start_after_marker() {
        let store = store_with_players(&[1, 2, 3, 4, 5]).await;
        let marker = CursorMarker::new(json!(2), "p01");
        let docs = store
            .query_range(&query(SortOrder::Asc, 2, Some(marker.clone())))
            .await
            .unwrap();
        assert_eq!(numbers(&docs), vec![3, 4]);

        let docs = store
            .query_range(&query(SortOrder::Desc, 5, Some(marker)))
            .await
            .unwrap();
        assert_eq!(numbers(&docs), vec![1]);
    }

    #[tokio::test]
    async fn test_equal_keys_break_ties_by_id() {
        let store = store_with_players(&[7, 7, 7]).await;
        let marker = CursorMarker::new(json!(7), "p00");
        let docs = store
            .query_range(&query(SortOrder::Asc, 10, Some(marker)))
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["p01", "p02"]);
    }

    #[tokio::test]
    async fn test_update_merges_and_delete_reports_missing() {
        let store = store_with_players(&[9]).await;
        let patch = json!({ "number": 11 }).as_object().cloned().unwrap();
        assert!(store.update_fields("players", "p00", patch.clone()).await.unwrap());
        assert!(!store.update_fields("players", "nope", patch).await.unwrap());

        let doc = store.get("players", "p00").await.unwrap().unwrap();
        assert_eq!(doc.fields["number"], json!(11));
        assert_eq!(doc.fields["last_name"], json!("Player0"));

        assert!(store.delete("players", "p00").await.unwrap());
        assert!(!store.delete("players", "p00").await.unwrap());
        assert!(store.get("players", "p00").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_injected_sort_field() {
        let store = store_with_players(&[1]).await;
        let mut q = query(SortOrder::Asc, 1, None);
        q.sort_field = "number') --".into();
        assert!(matches!(
            store.query_range(&q).await,
            Err(AppError::DataAccess(_))
        ));
    }
}
