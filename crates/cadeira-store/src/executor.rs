//! The query executor capability.
//!
//! An executor runs one SQL statement with positional parameters and hands
//! back the produced rows plus the number of rows the statement affected.
//! It owns connection management entirely; callers issue a statement and
//! await exactly one outcome.

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::error::StoreResult;

/// A result row: column name → value.
pub type Row = Map<String, Value>;

/// Boxed future alias for executor results.
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = StoreResult<QueryOutcome>> + Send + 'a>>;

/// A positional parameter bound to `$n`.
///
/// Each variant carries its SQL type even when NULL, so the engine never
/// has to guess the type of a missing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(Option<i32>),
    Text(Option<String>),
    Bool(Option<bool>),
}

impl SqlValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            SqlValue::Int(v) => *v,
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => v.as_deref(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(v) => *v,
            _ => None,
        }
    }
}

/// Rows returned by a statement and the affected-row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub rows: Vec<Row>,
    pub row_count: u64,
}

/// Executes parameterized SQL. Injected into the store for testability.
pub trait QueryExecutor: Send + Sync {
    /// Run `sql` with `params` bound to `$1..$n`.
    fn execute<'a>(&'a self, sql: &'a str, params: &'a [SqlValue]) -> ExecuteFuture<'a>;
}
