//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Get current version
    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Apply migrations
    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            tracing::info!(version, "applying schema migration");
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Identities: one row per principal
        CREATE TABLE identities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            credential_hash TEXT NOT NULL,    -- Argon2 PHC string
            role TEXT NOT NULL,               -- MEMBER | NON_PLAYER_MEMBER | ADMIN | OPERATOR
            share_token TEXT NOT NULL UNIQUE  -- stable contact-exchange token
        );

        -- Contact edges: always written as a symmetric pair of directed rows
        CREATE TABLE contacts (
            subject_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
            object_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
            PRIMARY KEY (subject_id, object_id)
        );

        -- Documents: no FK on owner_id, documents outlive their owner
        CREATE TABLE documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            kind TEXT NOT NULL,               -- text | image | audio | video
            storage_ref TEXT NOT NULL,        -- opaque reference to the stored bytes
            created_at INTEGER NOT NULL       -- Unix ms
        );

        -- Grants: the sole gate for document visibility
        CREATE TABLE grants (
            user_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
            document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, document_id)
        );

        -- Indexes for common queries
        CREATE INDEX idx_contacts_subject ON contacts(subject_id);
        CREATE INDEX idx_documents_owner ON documents(owner_id);
        CREATE INDEX idx_grants_document ON grants(document_id);
        CREATE INDEX idx_identities_role ON identities(role);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        // Verify tables exist
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"identities".to_string()));
        assert!(tables.contains(&"contacts".to_string()));
        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"grants".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap(); // Should not error
        migrate(&mut conn).unwrap(); // Still should not error

        // Verify version is 1
        let version: u32 = conn
            .query_row(
                "SELECT MAX(version) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_username_unique_constraint() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO identities (username, credential_hash, role, share_token)
             VALUES ('wedge', 'h1', 'MEMBER', 'wedge-1')",
            [],
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO identities (username, credential_hash, role, share_token)
             VALUES ('wedge', 'h2', 'ADMIN', 'wedge-2')",
            [],
        );
        assert!(dup.is_err());
    }
}
