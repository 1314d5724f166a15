//! Postgres executor backed by a sqlx connection pool.
//!
//! The pool connects lazily, so constructing a [`PgExecutor`] never fails
//! on an unreachable server; the first statement (or [`CadeiraStore::ping`])
//! surfaces connectivity errors instead. Every statement runs under the
//! configured deadline.
//!
//! [`CadeiraStore::ping`]: crate::CadeiraStore::ping

use std::time::Duration;

use futures::TryStreamExt;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Either, Postgres, Row as _, TypeInfo};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::executor::{ExecuteFuture, QueryExecutor, QueryOutcome, Row, SqlValue};

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Connection settings for the pool.
///
/// Unset fields fall back to libpq conventions (`PGHOST`, `PGPORT`, ...,
/// then `localhost:5432`).
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: u32,
    pub query_timeout: Duration,
}

impl Default for PgSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            max_connections: 10,
            query_timeout: Duration::from_secs(30),
        }
    }
}

impl PgSettings {
    fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new();
        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        options
    }
}

/// [`QueryExecutor`] over a `PgPool`.
#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgExecutor {
    /// Build the pool. No connection is opened until the first statement.
    pub fn connect_lazy(settings: &PgSettings) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.query_timeout)
            .connect_lazy_with(settings.connect_options());
        info!(
            host = settings.host.as_deref().unwrap_or("<default>"),
            database = settings.database.as_deref().unwrap_or("<default>"),
            max_connections = settings.max_connections,
            "postgres pool configured"
        );
        Self {
            pool,
            query_timeout: settings.query_timeout,
        }
    }

    /// Close every pooled connection, waiting for checked-out ones.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("postgres pool closed");
    }

    async fn run(&self, sql: &str, params: &[SqlValue]) -> StoreResult<QueryOutcome> {
        let query = params.iter().fold(sqlx::query(sql), bind);

        // A single statement yields its rows followed by one completion
        // carrying the affected-row count.
        #[allow(deprecated)]
        let mut stream = query.fetch_many(&self.pool);
        let mut outcome = QueryOutcome::default();
        while let Some(step) = stream.try_next().await.map_err(map_err!(Query))? {
            match step {
                Either::Left(done) => outcome.row_count += done.rows_affected(),
                Either::Right(row) => outcome.rows.push(decode_row(&row)?),
            }
        }
        debug!(sql, rows = outcome.rows.len(), row_count = outcome.row_count, "statement executed");
        Ok(outcome)
    }
}

impl QueryExecutor for PgExecutor {
    fn execute<'a>(&'a self, sql: &'a str, params: &'a [SqlValue]) -> ExecuteFuture<'a> {
        Box::pin(async move {
            match tokio::time::timeout(self.query_timeout, self.run(sql, params)).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(self.query_timeout)),
            }
        })
    }
}

fn bind<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Bool(v) => query.bind(*v),
    }
}

fn decode_row(row: &PgRow) -> StoreResult<Row> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let value = match column.type_info().name() {
            "INT2" => row
                .try_get::<Option<i16>, _>(index)
                .map(|v| v.map(Value::from)),
            "INT4" => row
                .try_get::<Option<i32>, _>(index)
                .map(|v| v.map(Value::from)),
            "INT8" => row
                .try_get::<Option<i64>, _>(index)
                .map(|v| v.map(Value::from)),
            "BOOL" => row
                .try_get::<Option<bool>, _>(index)
                .map(|v| v.map(Value::from)),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row
                .try_get::<Option<String>, _>(index)
                .map(|v| v.map(Value::from)),
            other => {
                return Err(StoreError::UnsupportedColumn {
                    column: column.name().to_string(),
                    type_name: other.to_string(),
                });
            }
        }
        .map_err(map_err!(Decode))?;
        decoded.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_documented_values() {
        let settings = PgSettings::default();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.query_timeout, Duration::from_secs(30));
        assert!(settings.host.is_none());
    }

    #[test]
    fn connect_options_apply_explicit_fields() {
        let settings = PgSettings {
            host: Some("db.internal".to_string()),
            port: Some(6543),
            database: Some("loja".to_string()),
            ..PgSettings::default()
        };
        let options = settings.connect_options();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("loja"));
    }

    /// Executor against the server named by `DATABASE_URL`.
    async fn live_executor() -> Option<PgExecutor> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.expect("failed to connect to database");
        Some(PgExecutor {
            pool,
            query_timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn decodes_every_supported_column_type() {
        let Some(executor) = live_executor().await else {
            return;
        };
        let outcome = executor
            .execute(
                "SELECT 7::int2 AS small, 8::int4 AS regular, 9::int8 AS big, \
                 true AS flag, 'abc'::text AS body, 'xy'::varchar AS short, \
                 NULL::bool AS missing",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(outcome.rows.len(), 1);
        let row = &outcome.rows[0];
        assert_eq!(row["small"], Value::from(7));
        assert_eq!(row["regular"], Value::from(8));
        assert_eq!(row["big"], Value::from(9));
        assert_eq!(row["flag"], Value::from(true));
        assert_eq!(row["body"], Value::from("abc"));
        assert_eq!(row["short"], Value::from("xy"));
        assert_eq!(row["missing"], Value::Null);
        executor.close().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn binds_typed_parameters_including_nulls() {
        let Some(executor) = live_executor().await else {
            return;
        };
        let params = [
            SqlValue::Int(Some(4)),
            SqlValue::Text(Some("calma".to_string())),
            SqlValue::Bool(None),
        ];
        let outcome = executor
            .execute("SELECT $1 + 1 AS pernas, $2 AS nome, $3 IS NULL AS vazio", &params)
            .await
            .unwrap();
        let row = &outcome.rows[0];
        assert_eq!(row["pernas"], Value::from(5));
        assert_eq!(row["nome"], Value::from("calma"));
        assert_eq!(row["vazio"], Value::from(true));
        executor.close().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn unsupported_column_type_is_reported() {
        let Some(executor) = live_executor().await else {
            return;
        };
        let err = executor
            .execute("SELECT 1.5::float8 AS ratio", &[])
            .await
            .unwrap_err();
        match err {
            StoreError::UnsupportedColumn { column, type_name } => {
                assert_eq!(column, "ratio");
                assert_eq!(type_name, "FLOAT8");
            }
            other => panic!("unexpected error: {other}"),
        }
        executor.close().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn query_error_is_mapped() {
        let Some(executor) = live_executor().await else {
            return;
        };
        let err = executor
            .execute("SELECT * FROM no_such_table_for_cadeiras", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
        executor.close().await;
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect_eagerly() {
        let settings = PgSettings {
            host: Some("127.0.0.1".to_string()),
            port: Some(1),
            ..PgSettings::default()
        };
        let executor = PgExecutor::connect_lazy(&settings);
        assert_eq!(executor.pool.size(), 0);
        executor.close().await;
    }
}
