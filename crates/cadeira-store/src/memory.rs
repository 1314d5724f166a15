//! In-memory executor.
//!
//! Holds the cadeiras table in a `BTreeMap` and answers the statements in
//! [`crate::statements`] with the same rows and affected-row counts
//! Postgres would produce. Any other SQL is rejected. Used by tests and by
//! `cadeirad --in-memory`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::executor::{ExecuteFuture, QueryExecutor, QueryOutcome, Row, SqlValue};
use crate::statements;
use crate::types::{Cadeira, CadeiraId, NewCadeira};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<CadeiraId, Cadeira>,
    /// Last id handed out; ids are never reused, like a serial column.
    last_id: CadeiraId,
}

/// Process-local stand-in for the Postgres table.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    table: Mutex<Table>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, sql: &str, params: &[SqlValue]) -> StoreResult<QueryOutcome> {
        let mut table = self
            .table
            .lock()
            .map_err(|_| StoreError::Query("memory table lock poisoned".to_string()))?;

        match sql {
            statements::LIST => Ok(rows_outcome(table.rows.values().cloned().collect())),
            statements::SELECT_BY_ID => {
                let id = int_param(params, 0)?;
                Ok(rows_outcome(table.rows.get(&id).cloned().into_iter().collect()))
            }
            statements::INSERT => {
                let new = columns(params)?;
                table.last_id += 1;
                let cadeira = new.with_id(table.last_id);
                table.rows.insert(cadeira.id, cadeira.clone());
                Ok(rows_outcome(vec![cadeira]))
            }
            statements::UPDATE => {
                let new = columns(params)?;
                let id = int_param(params, 3)?;
                match table.rows.get_mut(&id) {
                    Some(existing) => {
                        *existing = new.with_id(id);
                        Ok(rows_outcome(vec![existing.clone()]))
                    }
                    None => Ok(QueryOutcome::default()),
                }
            }
            statements::DELETE => {
                let id = int_param(params, 0)?;
                let row_count = u64::from(table.rows.remove(&id).is_some());
                Ok(QueryOutcome {
                    rows: Vec::new(),
                    row_count,
                })
            }
            statements::PING => {
                let mut row = Row::new();
                row.insert("now".to_string(), Value::from("in-memory"));
                Ok(QueryOutcome {
                    rows: vec![row],
                    row_count: 1,
                })
            }
            other => Err(StoreError::UnexpectedStatement(other.to_string())),
        }
    }
}

impl QueryExecutor for MemoryExecutor {
    fn execute<'a>(&'a self, sql: &'a str, params: &'a [SqlValue]) -> ExecuteFuture<'a> {
        Box::pin(async move { self.run(sql, params) })
    }
}

fn rows_outcome(cadeiras: Vec<Cadeira>) -> QueryOutcome {
    let rows: Vec<Row> = cadeiras.into_iter().map(to_row).collect();
    QueryOutcome {
        row_count: rows.len() as u64,
        rows,
    }
}

fn to_row(cadeira: Cadeira) -> Row {
    let mut row = Row::new();
    row.insert("id".to_string(), Value::from(cadeira.id));
    row.insert("personalidade".to_string(), Value::from(cadeira.personalidade));
    row.insert("qtdpernas".to_string(), Value::from(cadeira.qtdpernas));
    row.insert(
        "acolchoada".to_string(),
        cadeira.acolchoada.map_or(Value::Null, Value::from),
    );
    row
}

fn param(params: &[SqlValue], index: usize) -> StoreResult<&SqlValue> {
    params
        .get(index)
        .ok_or_else(|| StoreError::Query(format!("missing parameter ${}", index + 1)))
}

fn int_param(params: &[SqlValue], index: usize) -> StoreResult<i32> {
    param(params, index)?
        .as_int()
        .ok_or_else(|| StoreError::Query(format!("parameter ${} is not an integer", index + 1)))
}

/// Decode `$1..$3` of an insert/update. NOT NULL checks mirror the table.
fn columns(params: &[SqlValue]) -> StoreResult<NewCadeira> {
    let personalidade = param(params, 0)?
        .as_text()
        .ok_or_else(|| StoreError::Query("personalidade violates not-null".to_string()))?
        .to_string();
    let qtd_pernas = int_param(params, 1)?;
    let acolchoada = param(params, 2)?.as_bool();
    Ok(NewCadeira {
        personalidade,
        qtd_pernas,
        acolchoada,
    })
}
