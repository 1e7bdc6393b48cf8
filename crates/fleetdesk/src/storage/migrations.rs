//! Schema versioning for the record store.
//!
//! The `metadata` table always exists and records the schema version. Every
//! other table is created by a numbered step in [`MIGRATIONS`], each applied
//! in its own transaction together with the version bump.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use super::schema::{CREATE_COLLECTIONS_TABLE, CREATE_METADATA_TABLE, CREATE_UPDATED_AT_INDEX};
use crate::error::{Error, Result};

/// Ordered schema steps. Step `n` brings the schema to version `n`.
const MIGRATIONS: &[&[&str]] = &[
    // 1: one row per collection
    &[CREATE_COLLECTIONS_TABLE],
    // 2: last-write lookup for stats
    &[CREATE_UPDATED_AT_INDEX],
];

/// The current schema version.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const CURRENT_VERSION: i32 = MIGRATIONS.len() as i32;

const VERSION_KEY: &str = "schema_version";

/// Bring the database schema up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if a step fails, or if the database was written by a
/// newer version of fleetdesk.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for (target, statements) in (1..).zip(MIGRATIONS).skip_while(|(v, _)| *v <= version) {
        let tx = conn.unchecked_transaction()?;
        for statement in *statements {
            tx.execute(statement, [])?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            (VERSION_KEY, target.to_string()),
        )?;
        tx.commit()?;
        info!("Migrated record store schema to version {}", target);
    }

    Ok(())
}

/// Read the stored schema version; 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        None => Ok(0),
    }
}
