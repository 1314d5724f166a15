//! CadeiraStore — typed CRUD over a [`QueryExecutor`].
//!
//! Each method issues exactly one statement from [`crate::statements`] and
//! decodes the result. Not-found is reported through the return type
//! (`Option` / `bool`), never as an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::executor::{QueryExecutor, QueryOutcome, Row, SqlValue};
use crate::statements;
use crate::types::{Cadeira, CadeiraId, NewCadeira};

/// Shared handle to the cadeiras table.
#[derive(Clone)]
pub struct CadeiraStore {
    executor: Arc<dyn QueryExecutor>,
}

impl CadeiraStore {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// All cadeiras in ascending id order.
    pub async fn list(&self) -> StoreResult<Vec<Cadeira>> {
        let outcome = self.executor.execute(statements::LIST, &[]).await?;
        outcome.rows.into_iter().map(decode).collect()
    }

    /// One cadeira by id, `None` when no row matches.
    pub async fn get(&self, id: CadeiraId) -> StoreResult<Option<Cadeira>> {
        let params = [SqlValue::Int(Some(id))];
        let outcome = self
            .executor
            .execute(statements::SELECT_BY_ID, &params)
            .await?;
        first_row(outcome)
    }

    /// Insert a row and return it with its assigned id.
    pub async fn create(&self, new: &NewCadeira) -> StoreResult<Cadeira> {
        let params = column_params(new);
        let outcome = self.executor.execute(statements::INSERT, &params).await?;
        let cadeira = first_row(outcome)?
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))?;
        debug!(id = cadeira.id, "cadeira created");
        Ok(cadeira)
    }

    /// Overwrite every mutable column. `None` when the id does not exist.
    pub async fn update(&self, id: CadeiraId, new: &NewCadeira) -> StoreResult<Option<Cadeira>> {
        let [personalidade, qtd_pernas, acolchoada] = column_params(new);
        let params = [personalidade, qtd_pernas, acolchoada, SqlValue::Int(Some(id))];
        let outcome = self.executor.execute(statements::UPDATE, &params).await?;
        if outcome.row_count == 0 {
            return Ok(None);
        }
        debug!(id, "cadeira updated");
        first_row(outcome)
    }

    /// Delete by id. Returns true if a row was removed.
    pub async fn delete(&self, id: CadeiraId) -> StoreResult<bool> {
        let params = [SqlValue::Int(Some(id))];
        let outcome = self.executor.execute(statements::DELETE, &params).await?;
        let removed = outcome.row_count > 0;
        debug!(id, removed, "cadeira delete");
        Ok(removed)
    }

    /// Round-trip to the database; returns its current time as text.
    pub async fn ping(&self) -> StoreResult<String> {
        let outcome = self.executor.execute(statements::PING, &[]).await?;
        outcome
            .rows
            .into_iter()
            .next()
            .and_then(|mut row| row.remove("now"))
            .and_then(|now| match now {
                Value::String(s) => Some(s),
                _ => None,
            })
            .ok_or_else(|| StoreError::Decode("ping returned no timestamp".to_string()))
    }
}

fn column_params(new: &NewCadeira) -> [SqlValue; 3] {
    [
        SqlValue::Text(Some(new.personalidade.clone())),
        SqlValue::Int(Some(new.qtd_pernas)),
        SqlValue::Bool(new.acolchoada),
    ]
}

fn first_row(outcome: QueryOutcome) -> StoreResult<Option<Cadeira>> {
    outcome.rows.into_iter().next().map(decode).transpose()
}

fn decode(row: Row) -> StoreResult<Cadeira> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryExecutor;

    fn test_store() -> CadeiraStore {
        CadeiraStore::new(Arc::new(MemoryExecutor::new()))
    }

    fn chair(personalidade: &str, pernas: i32, acolchoada: Option<bool>) -> NewCadeira {
        NewCadeira {
            personalidade: personalidade.to_string(),
            qtd_pernas: pernas,
            acolchoada,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = test_store();
        let a = store.create(&chair("calma", 4, None)).await.unwrap();
        let b = store.create(&chair("nervosa", 3, Some(false))).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.acolchoada, Some(false));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = test_store();
        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_ordered_by_id_after_updates() {
        let store = test_store();
        for name in ["a", "b", "c"] {
            store.create(&chair(name, 4, None)).await.unwrap();
        }
        store.update(1, &chair("a2", 5, Some(true))).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_missing_creates_nothing() {
        let store = test_store();
        assert!(store.update(5, &chair("x", 4, None)).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_twice_reports_missing_second_time() {
        let store = test_store();
        let c = store.create(&chair("calma", 4, None)).await.unwrap();
        assert!(store.delete(c.id).await.unwrap());
        assert!(!store.delete(c.id).await.unwrap());
    }

    #[tokio::test]
    async fn ping_returns_timestamp() {
        let store = test_store();
        assert!(!store.ping().await.unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from("one"));
        assert!(matches!(decode(row), Err(StoreError::Decode(_))));
    }
}
