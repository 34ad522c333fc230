//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for Satchel. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use satchel_core::{
    Document, DocumentId, Identity, IdentityId, MediaKind, NewIdentity, Role, ShareToken,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertOutcome, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        configure(&conn)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        configure(&conn)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

/// Connection pragmas: WAL for concurrent readers, foreign keys for the
/// cascade deletes on contacts and grants.
fn configure(conn: &Connection) -> Result<()> {
    // journal_mode returns a result row, so query_row instead of execute
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

// Helper to convert a row to Identity
fn row_to_identity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Identity> {
    let role_str: String = row.get("role")?;
    let role: Role = role_str.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(3, "role".into(), rusqlite::types::Type::Text)
    })?;
    Ok(Identity {
        id: IdentityId::new(row.get("id")?),
        username: row.get("username")?,
        credential_hash: row.get("credential_hash")?,
        role,
        share_token: ShareToken::new(row.get::<_, String>("share_token")?),
    })
}

// Helper to convert a row to Document
fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let kind_str: String = row.get("kind")?;
    let kind: MediaKind = kind_str.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(2, "kind".into(), rusqlite::types::Type::Text)
    })?;
    Ok(Document {
        id: DocumentId::new(row.get("id")?),
        owner_id: IdentityId::new(row.get("owner_id")?),
        kind,
        storage_ref: row.get("storage_ref")?,
        created_at: row.get::<_, i64>("created_at")? as u64,
    })
}

const IDENTITY_COLS: &str = "id, username, credential_hash, role, share_token";
const DOCUMENT_COLS: &str = "id, owner_id, kind, storage_ref, created_at";

#[async_trait]
impl Store for SqliteStore {
    async fn insert_identity(&self, new: &NewIdentity) -> Result<Identity> {
        let new = new.clone();
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO identities (username, credential_hash, role, share_token)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    &new.username,
                    &new.credential_hash,
                    new.role.as_str(),
                    new.share_token.as_str(),
                ],
            );

            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, Some(msg)))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation
                        && msg.contains("identities.username") =>
                {
                    return Err(StoreError::UsernameTaken(new.username.clone()));
                }
                Err(e) => return Err(e.into()),
            }

            let id = conn.last_insert_rowid();
            Ok(Identity {
                id: IdentityId::new(id),
                username: new.username,
                credential_hash: new.credential_hash,
                role: new.role,
                share_token: new.share_token,
            })
        })
        .await
    }

    async fn identity_by_id(&self, id: IdentityId) -> Result<Option<Identity>> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {IDENTITY_COLS} FROM identities WHERE id = ?1"),
                params![id.as_i64()],
                row_to_identity,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn identity_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {IDENTITY_COLS} FROM identities WHERE username = ?1"),
                params![username],
                row_to_identity,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn identity_by_share_token(&self, token: &ShareToken) -> Result<Option<Identity>> {
        let token = token.clone();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {IDENTITY_COLS} FROM identities WHERE share_token = ?1"),
                params![token.as_str()],
                row_to_identity,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn identity_by_role(&self, role: Role) -> Result<Option<Identity>> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {IDENTITY_COLS} FROM identities WHERE role = ?1 ORDER BY id LIMIT 1"
                ),
                params![role.as_str()],
                row_to_identity,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_identities(&self) -> Result<Vec<Identity>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {IDENTITY_COLS} FROM identities ORDER BY id"))?;
            let identities = stmt
                .query_map([], row_to_identity)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(identities)
        })
        .await
    }

    async fn update_identity(
        &self,
        id: IdentityId,
        credential_hash: Option<&str>,
        role: Option<Role>,
    ) -> Result<Option<Identity>> {
        let credential_hash = credential_hash.map(str::to_string);
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE identities
                 SET credential_hash = COALESCE(?2, credential_hash),
                     role = COALESCE(?3, role)
                 WHERE id = ?1",
                params![
                    id.as_i64(),
                    credential_hash,
                    role.map(|r| r.as_str().to_string()),
                ],
            )?;

            if changed == 0 {
                return Ok(None);
            }

            conn.query_row(
                &format!("SELECT {IDENTITY_COLS} FROM identities WHERE id = ?1"),
                params![id.as_i64()],
                row_to_identity,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn delete_identity(&self, id: IdentityId) -> Result<bool> {
        self.with_conn(move |conn| {
            // Contact edges and grants go with it via ON DELETE CASCADE;
            // owned documents stay behind.
            let removed = conn.execute(
                "DELETE FROM identities WHERE id = ?1",
                params![id.as_i64()],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn insert_contact_pair(&self, a: IdentityId, b: IdentityId) -> Result<InsertOutcome> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let forward = tx.execute(
                "INSERT OR IGNORE INTO contacts (subject_id, object_id) VALUES (?1, ?2)",
                params![a.as_i64(), b.as_i64()],
            )?;
            let backward = tx.execute(
                "INSERT OR IGNORE INTO contacts (subject_id, object_id) VALUES (?1, ?2)",
                params![b.as_i64(), a.as_i64()],
            )?;
            tx.commit()?;

            if forward + backward > 0 {
                Ok(InsertOutcome::Inserted)
            } else {
                Ok(InsertOutcome::AlreadyPresent)
            }
        })
        .await
    }

    async fn contacts_of(&self, viewer: IdentityId) -> Result<Vec<Identity>> {
        self.with_conn(move |conn| {
            // Explicit edges unioned with the elevated tier, never stored.
            let mut stmt = conn.prepare(&format!(
                "SELECT {IDENTITY_COLS} FROM identities i
                 WHERE i.id != ?1
                   AND (i.role IN ('ADMIN', 'OPERATOR')
                        OR EXISTS (SELECT 1 FROM contacts c
                                   WHERE c.subject_id = ?1 AND c.object_id = i.id))
                 ORDER BY i.id"
            ))?;
            let contacts = stmt
                .query_map(params![viewer.as_i64()], row_to_identity)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(contacts)
        })
        .await
    }

    async fn insert_document(
        &self,
        owner: IdentityId,
        kind: MediaKind,
        storage_ref: &str,
        created_at: u64,
    ) -> Result<Document> {
        let storage_ref = storage_ref.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO documents (owner_id, kind, storage_ref, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    owner.as_i64(),
                    kind.as_str(),
                    &storage_ref,
                    created_at as i64,
                ],
            )?;
            let id = tx.last_insert_rowid();

            // Self-grant: the owner can always read its own document.
            tx.execute(
                "INSERT OR IGNORE INTO grants (user_id, document_id) VALUES (?1, ?2)",
                params![owner.as_i64(), id],
            )?;
            tx.commit()?;

            Ok(Document {
                id: DocumentId::new(id),
                owner_id: owner,
                kind,
                storage_ref,
                created_at,
            })
        })
        .await
    }

    async fn document_by_id(&self, id: DocumentId) -> Result<Option<Document>> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {DOCUMENT_COLS} FROM documents WHERE id = ?1"),
                params![id.as_i64()],
                row_to_document,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {DOCUMENT_COLS} FROM documents ORDER BY id"))?;
            let documents = stmt
                .query_map([], row_to_document)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(documents)
        })
        .await
    }

    async fn insert_grant(&self, user: IdentityId, document: DocumentId) -> Result<InsertOutcome> {
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO grants (user_id, document_id) VALUES (?1, ?2)",
                params![user.as_i64(), document.as_i64()],
            )?;
            if inserted > 0 {
                Ok(InsertOutcome::Inserted)
            } else {
                Ok(InsertOutcome::AlreadyPresent)
            }
        })
        .await
    }

    async fn delete_grant(&self, user: IdentityId, document: DocumentId) -> Result<bool> {
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM grants WHERE user_id = ?1 AND document_id = ?2",
                params![user.as_i64(), document.as_i64()],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn documents_visible_to(&self, user: IdentityId) -> Result<Vec<Document>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT d.id, d.owner_id, d.kind, d.storage_ref, d.created_at
                 FROM documents d
                 JOIN grants g ON g.document_id = d.id
                 WHERE g.user_id = ?1
                 ORDER BY d.id",
            )?;
            let documents = stmt
                .query_map(params![user.as_i64()], row_to_document)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(documents)
        })
        .await
    }

    async fn grant_holders(&self, document: DocumentId) -> Result<Vec<IdentityId>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM grants WHERE document_id = ?1 ORDER BY user_id",
            )?;
            let holders = stmt
                .query_map(params![document.as_i64()], |row| {
                    row.get::<_, i64>(0).map(IdentityId::new)
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(holders)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_identity(username: &str, role: Role) -> NewIdentity {
        NewIdentity {
            username: username.to_string(),
            credential_hash: format!("hash-of-{username}"),
            role,
            share_token: ShareToken::new(format!("{username}-1700000000000")),
        }
    }

    async fn seeded(store: &SqliteStore) -> (Identity, Identity, Identity) {
        let op = store
            .insert_identity(&new_identity("operator", Role::Operator))
            .await
            .unwrap();
        let a = store
            .insert_identity(&new_identity("wedge", Role::Member))
            .await
            .unwrap();
        let b = store
            .insert_identity(&new_identity("hobbie", Role::NonPlayerMember))
            .await
            .unwrap();
        (op, a, b)
    }

    #[tokio::test]
    async fn test_insert_and_lookup_identity() {
        let store = SqliteStore::open_memory().unwrap();
        let stored = store
            .insert_identity(&new_identity("wedge", Role::Member))
            .await
            .unwrap();

        let by_id = store.identity_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(by_id, stored);

        let by_name = store
            .identity_by_username("wedge")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, stored.id);

        let by_token = store
            .identity_by_share_token(&stored.share_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_token.id, stored.id);

        assert!(store
            .identity_by_username("biggs")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_identity_by_role_finds_earliest_row() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store
            .identity_by_role(Role::Operator)
            .await
            .unwrap()
            .is_none());

        let (op, a, _b) = seeded(&store).await;
        store
            .insert_identity(&new_identity("janson", Role::Member))
            .await
            .unwrap();

        let found = store
            .identity_by_role(Role::Operator)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, op.id);

        // Two members: the earliest row wins
        let member = store.identity_by_role(Role::Member).await.unwrap().unwrap();
        assert_eq!(member.id, a.id);

        assert!(store.identity_by_role(Role::Admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .insert_identity(&new_identity("wedge", Role::Member))
            .await
            .unwrap();

        let mut dup = new_identity("wedge", Role::Admin);
        dup.share_token = ShareToken::new("wedge-1700000000001");
        let err = store.insert_identity(&dup).await.unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "wedge"));
    }

    #[tokio::test]
    async fn test_update_identity_fields() {
        let store = SqliteStore::open_memory().unwrap();
        let stored = store
            .insert_identity(&new_identity("wedge", Role::Member))
            .await
            .unwrap();

        // Role only
        let updated = store
            .update_identity(stored.id, None, Some(Role::Admin))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.credential_hash, stored.credential_hash);

        // Credential only
        let updated = store
            .update_identity(stored.id, Some("new-hash"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.credential_hash, "new-hash");
        assert_eq!(updated.role, Role::Admin);

        // Username and token are untouched
        assert_eq!(updated.username, "wedge");
        assert_eq!(updated.share_token, stored.share_token);

        // Unknown id
        let missing = store
            .update_identity(IdentityId::new(999), None, Some(Role::Member))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_identity_cascades() {
        let store = SqliteStore::open_memory().unwrap();
        let (_op, a, b) = seeded(&store).await;

        store.insert_contact_pair(a.id, b.id).await.unwrap();
        let doc = store
            .insert_document(a.id, MediaKind::Text, "note.txt", 1)
            .await
            .unwrap();
        store.insert_grant(b.id, doc.id).await.unwrap();

        assert!(store.delete_identity(b.id).await.unwrap());
        assert!(!store.delete_identity(b.id).await.unwrap());

        // Edges and grants are gone, the document remains
        assert!(store.contacts_of(a.id).await.unwrap().iter().all(|c| c.id != b.id));
        assert_eq!(store.grant_holders(doc.id).await.unwrap(), vec![a.id]);
        assert!(store.document_by_id(doc.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_contact_pair_idempotent() {
        let store = SqliteStore::open_memory().unwrap();
        let (_op, a, b) = seeded(&store).await;

        let first = store.insert_contact_pair(a.id, b.id).await.unwrap();
        assert_eq!(first, InsertOutcome::Inserted);

        let again = store.insert_contact_pair(a.id, b.id).await.unwrap();
        assert_eq!(again, InsertOutcome::AlreadyPresent);

        // Reversed order is the same pair
        let reversed = store.insert_contact_pair(b.id, a.id).await.unwrap();
        assert_eq!(reversed, InsertOutcome::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_visibility_union() {
        let store = SqliteStore::open_memory().unwrap();
        let (op, a, b) = seeded(&store).await;

        // No explicit edges yet: everyone still sees the Operator
        let seen: Vec<_> = store
            .contacts_of(a.id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(seen, vec![op.id]);

        store.insert_contact_pair(a.id, b.id).await.unwrap();

        let seen: Vec<_> = store
            .contacts_of(a.id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(seen, vec![op.id, b.id]);

        // The viewer never appears in its own list, even when elevated
        let op_sees: Vec<_> = store
            .contacts_of(op.id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert!(!op_sees.contains(&op.id));
        assert_eq!(op_sees, vec![b.id]);
    }

    #[tokio::test]
    async fn test_document_insert_includes_self_grant() {
        let store = SqliteStore::open_memory().unwrap();
        let (_op, a, _b) = seeded(&store).await;

        let doc = store
            .insert_document(a.id, MediaKind::Image, "holo.png", 1_700_000_000_000)
            .await
            .unwrap();

        assert_eq!(doc.owner_id, a.id);
        assert_eq!(doc.kind, MediaKind::Image);

        let visible = store.documents_visible_to(a.id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, doc.id);
        assert_eq!(store.grant_holders(doc.id).await.unwrap(), vec![a.id]);
    }

    #[tokio::test]
    async fn test_grant_and_revoke() {
        let store = SqliteStore::open_memory().unwrap();
        let (_op, a, b) = seeded(&store).await;
        let doc = store
            .insert_document(a.id, MediaKind::Text, "note.txt", 1)
            .await
            .unwrap();

        assert_eq!(
            store.insert_grant(b.id, doc.id).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_grant(b.id, doc.id).await.unwrap(),
            InsertOutcome::AlreadyPresent
        );
        assert_eq!(store.documents_visible_to(b.id).await.unwrap().len(), 1);

        assert!(store.delete_grant(b.id, doc.id).await.unwrap());
        assert!(store.documents_visible_to(b.id).await.unwrap().is_empty());

        // Revoking again tolerates absence
        assert!(!store.delete_grant(b.id, doc.id).await.unwrap());

        // The owner's self-grant is unaffected
        assert_eq!(store.documents_visible_to(a.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reopen_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satchel.db");

        let stored = {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_identity(&new_identity("wedge", Role::Member))
                .await
                .unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let reloaded = store.identity_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(reloaded, stored);
    }
}
