//! SQLite persistence for todo items.
//!
//! # Design
//! The store is constructed from an explicit database location — nothing
//! reads ambient configuration. It owns a single mutex-guarded connection;
//! each write runs inside its own transaction that commits on success and
//! rolls back on drop, so no failure path can leave a partial write behind.
//! The schema is created at open time and creation is idempotent.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::ApiError;
use crate::types::Item;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS item (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    completed   INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1))
)";

/// Persistence operations for the `item` table.
pub struct ItemStore {
    conn: Mutex<Connection>,
}

impl ItemStore {
    /// Opens (creating if necessary) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database, used by tests.
    pub fn in_memory() -> Result<Self, ApiError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ApiError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.conn
            .lock()
            .map_err(|err| ApiError::OperationFailed(err.to_string()))
    }

    /// Returns every stored item.
    pub fn list(&self) -> Result<Vec<Item>, ApiError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, description, completed FROM item")?;
        let rows = stmt.query_map([], row_to_item)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Returns the item with the given identifier, or `NotFound`.
    pub fn get(&self, id: i64) -> Result<Item, ApiError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, description, completed FROM item WHERE id = ?1",
            params![id],
            row_to_item,
        )
        .optional()?
        .ok_or(ApiError::NotFound)
    }

    /// Inserts the item and assigns the generated identifier onto it.
    ///
    /// A missing `name` fails at the `NOT NULL` constraint; nothing is
    /// inserted in that case.
    pub fn create(&self, item: &mut Item) -> Result<(), ApiError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO item (name, description, completed) VALUES (?1, ?2, ?3)",
            params![item.name, item.description, item.completed],
        )?;
        item.id = Some(tx.last_insert_rowid());
        tx.commit()?;
        Ok(())
    }

    /// Replaces the matching row with the item's current field values.
    pub fn update(&self, item: &Item) -> Result<(), ApiError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE item SET name = ?1, description = ?2, completed = ?3 WHERE id = ?4",
            params![item.name, item.description, item.completed, item.id],
        )?;
        if changed == 0 {
            return Err(ApiError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }

    /// Removes the matching row. Consumes the item: once deleted, no live
    /// value carries the now-dangling identifier.
    pub fn delete(&self, item: Item) -> Result<(), ApiError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let changed = tx.execute("DELETE FROM item WHERE id = ?1", params![item.id])?;
        if changed == 0 {
            return Err(ApiError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> Item {
        let mut item = Item::default();
        item.apply(&json!({ "name": name }));
        item
    }

    #[test]
    fn create_assigns_an_id() {
        let store = ItemStore::in_memory().unwrap();
        let mut item = named("First");
        store.create(&mut item).unwrap();
        assert_eq!(item.id, Some(1));
    }

    #[test]
    fn create_then_get_roundtrips_all_fields() {
        let store = ItemStore::in_memory().unwrap();
        let mut item = Item {
            id: None,
            name: Some("Buy milk".to_string()),
            description: Some("2 litres".to_string()),
            completed: true,
        };
        store.create(&mut item).unwrap();

        let fetched = store.get(item.id.unwrap()).unwrap();
        assert_eq!(fetched, item);
    }

    #[test]
    fn create_without_name_fails_and_inserts_nothing() {
        let store = ItemStore::in_memory().unwrap();
        let mut item = Item::default();
        let err = store.create(&mut item).unwrap_err();
        assert!(matches!(err, ApiError::OperationFailed(_)));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = ItemStore::in_memory().unwrap();
        assert!(matches!(store.get(42), Err(ApiError::NotFound)));
    }

    #[test]
    fn get_id_zero_is_a_lookup_not_a_list() {
        let store = ItemStore::in_memory().unwrap();
        let mut item = named("Present");
        store.create(&mut item).unwrap();
        assert!(matches!(store.get(0), Err(ApiError::NotFound)));
    }

    #[test]
    fn update_replaces_the_row() {
        let store = ItemStore::in_memory().unwrap();
        let mut item = named("Before");
        store.create(&mut item).unwrap();

        item.name = Some("After".to_string());
        item.completed = true;
        store.update(&item).unwrap();

        let fetched = store.get(item.id.unwrap()).unwrap();
        assert_eq!(fetched.name.as_deref(), Some("After"));
        assert!(fetched.completed);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = ItemStore::in_memory().unwrap();
        let item = Item {
            id: Some(42),
            name: Some("Ghost".to_string()),
            description: None,
            completed: false,
        };
        assert!(matches!(store.update(&item), Err(ApiError::NotFound)));
    }

    #[test]
    fn delete_removes_the_row() {
        let store = ItemStore::in_memory().unwrap();
        let mut item = named("Doomed");
        store.create(&mut item).unwrap();
        let id = item.id.unwrap();

        store.delete(item).unwrap();
        assert!(matches!(store.get(id), Err(ApiError::NotFound)));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let store = ItemStore::in_memory().unwrap();
        let item = Item {
            id: Some(42),
            ..Item::default()
        };
        assert!(matches!(store.delete(item), Err(ApiError::NotFound)));
    }

    #[test]
    fn list_tracks_creations_and_deletions() {
        let store = ItemStore::in_memory().unwrap();
        assert!(store.list().unwrap().is_empty());

        let mut first = named("One");
        store.create(&mut first).unwrap();
        let mut second = named("Two");
        store.create(&mut second).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);

        store.delete(first).unwrap();
        let remaining = store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name.as_deref(), Some("Two"));
    }

    #[test]
    fn items_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.db");

        let store = ItemStore::open(&path).unwrap();
        let mut item = named("Durable");
        store.create(&mut item).unwrap();
        drop(store);

        let reopened = ItemStore::open(&path).unwrap();
        let fetched = reopened.get(item.id.unwrap()).unwrap();
        assert_eq!(fetched.name.as_deref(), Some("Durable"));
    }
}
