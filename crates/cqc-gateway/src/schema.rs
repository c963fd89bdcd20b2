//! Schema version stamping for the CLI's `serve`/`migrate` split.
//!
//! `cqc-store`'s `init_db` is always `CREATE TABLE IF NOT EXISTS`-idempotent,
//! but that alone can't tell `serve` apart from a first boot against a
//! database this binary doesn't recognise. A one-row `schema_meta` table
//! records the version `migrate` last stamped; `serve` refuses to touch the
//! schema itself when the stamp doesn't match (spec.md §6 exit code 3).

use rusqlite::{Connection, OptionalExtension};

pub const SCHEMA_VERSION: i64 = 1;

fn ensure_meta_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_meta (
            id      INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );",
    )
}

/// Creates every store table and stamps the schema at the current version.
/// Safe to run repeatedly.
pub fn migrate(db_path: &str) -> rusqlite::Result<()> {
    let conn = Connection::open(db_path)?;
    cqc_store::db::init_db(&conn)?;
    ensure_meta_table(&conn)?;
    conn.execute(
        "INSERT INTO schema_meta (id, version) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET version = excluded.version",
        [SCHEMA_VERSION],
    )?;
    Ok(())
}

/// `true` for a brand-new database file (no stamp yet) or one stamped at
/// the version this binary expects; `false` means `migrate` must run first.
pub fn is_current(db_path: &str) -> rusqlite::Result<bool> {
    let conn = Connection::open(db_path)?;
    ensure_meta_table(&conn)?;
    let stamped: Option<i64> = conn
        .query_row("SELECT version FROM schema_meta WHERE id = 1", [], |row| row.get(0))
        .optional()?;
    Ok(matches!(stamped, None | Some(SCHEMA_VERSION)))
}
