//! Embedded schema migrations.
//!
//! Versions are recorded in `__diesel_schema_migrations` so databases
//! migrated here stay compatible with the Diesel CLI and vice versa.

use super::schema::__diesel_schema_migrations;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use thiserror::Error;

/// One embedded migration.
struct Migration {
    version: &'static str,
    up_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "20261019000000",
    up_sql: include_str!(
        "../../../../migrations/2026-10-19-000000_create_tracker_tables/up.sql"
    ),
}];

const CREATE_VERSION_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS __diesel_schema_migrations (\
     version VARCHAR(50) PRIMARY KEY NOT NULL, \
     run_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP)";

/// Errors raised while applying migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migration bookkeeping table could not be read or written.
    #[error("migration bookkeeping failed: {0}")]
    Bookkeeping(#[source] diesel::result::Error),

    /// A migration script failed; its transaction was rolled back.
    #[error("migration {version} failed: {source}")]
    Script {
        /// Version of the failing migration.
        version: &'static str,
        /// Underlying database error.
        #[source]
        source: diesel::result::Error,
    },
}

/// Applies every embedded migration not yet recorded, returning the
/// versions applied in this run.
///
/// # Errors
///
/// Returns [`MigrationError`] on the first failure.
pub fn run_migrations(connection: &mut PgConnection) -> Result<Vec<&'static str>, MigrationError> {
    connection
        .batch_execute(CREATE_VERSION_TABLE_SQL)
        .map_err(MigrationError::Bookkeeping)?;
    let applied: Vec<String> = __diesel_schema_migrations::table
        .select(__diesel_schema_migrations::version)
        .load(connection)
        .map_err(MigrationError::Bookkeeping)?;

    let mut newly_applied = Vec::new();
    for migration in MIGRATIONS {
        if applied.iter().any(|version| version == migration.version) {
            continue;
        }
        connection
            .transaction::<_, diesel::result::Error, _>(|tx| {
                tx.batch_execute(migration.up_sql)?;
                diesel::insert_into(__diesel_schema_migrations::table)
                    .values(__diesel_schema_migrations::version.eq(migration.version))
                    .execute(tx)?;
                Ok(())
            })
            .map_err(|source| MigrationError::Script {
                version: migration.version,
                source,
            })?;
        tracing::info!(version = migration.version, "applied migration");
        newly_applied.push(migration.version);
    }
    Ok(newly_applied)
}
