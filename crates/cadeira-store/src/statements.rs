//! SQL statements issued against the `cadeiras` table.
//!
//! Every statement uses positional placeholders. Executors other than
//! Postgres (see [`crate::memory`]) match on these exact strings, so they
//! are the only SQL the store ever sends.

/// All rows, ascending id.
pub const LIST: &str = "SELECT * FROM cadeiras ORDER BY id ASC";

/// One row by id. `$1` = id.
pub const SELECT_BY_ID: &str = "SELECT * FROM cadeiras WHERE id = $1";

/// `$1` = personalidade, `$2` = qtdPernas, `$3` = acolchoada.
pub const INSERT: &str =
    "INSERT INTO cadeiras (personalidade, qtdPernas, acolchoada) VALUES ($1, $2, $3) RETURNING *";

/// Full-column overwrite. `$4` = id.
pub const UPDATE: &str =
    "UPDATE cadeiras SET personalidade = $1, qtdPernas = $2, acolchoada = $3 WHERE id = $4 RETURNING *";

/// `$1` = id.
pub const DELETE: &str = "DELETE FROM cadeiras WHERE id = $1";

/// Connectivity check. Returns one row with a text column `now`.
pub const PING: &str = "SELECT NOW()::text AS now";
