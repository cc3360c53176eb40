//! SQLite persistence for clipboard history.
//!
//! The store is the single serialized mutation point: every operation takes
//! the connection lock, and every multi-statement mutation runs inside one
//! transaction so a failure leaves the previous state intact.

use crate::{Clock, ClipstashError, Result, SystemClock};
use clipstash_types::{ContentKind, ImageContent, Item, ItemContent, SystemData, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

const ITEM_COLUMNS: &str =
    "timestamp, text, image, image_width, image_height, size_bytes, source_app";

/// Outcome of [`HistoryStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// The live item after the insert.
    pub item: Item,
    /// Identity of the byte-identical item that was promoted, if any.
    pub replaced: Option<Timestamp>,
}

/// SQLite-backed clipboard history.
pub struct HistoryStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl HistoryStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(path: &Path, clock: Arc<dyn Clock>) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
            clock,
        };
        store.init_schema()?;
        info!(target: "clipstash::store", "Opened history store at {}", path.display());
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                timestamp INTEGER PRIMARY KEY,
                kind TEXT NOT NULL,
                text TEXT,
                image BLOB,
                image_width INTEGER,
                image_height INTEGER,
                content_hash TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                source_app TEXT,
                CHECK ((text IS NULL) <> (image IS NULL))
            );

            CREATE INDEX IF NOT EXISTS idx_items_content_hash ON items(content_hash);
            "#,
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// All items, newest first.
    pub fn list(&self) -> Result<Vec<Item>> {
        self.list_limited(None)
    }

    pub fn list_limited(&self, limit: Option<usize>) -> Result<Vec<Item>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY timestamp DESC LIMIT ?1"
        ))?;
        let items = stmt
            .query_map(params![sql_limit(limit)], row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Text items containing `query` (ASCII case-insensitive), newest first.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<Item>> {
        if query.is_empty() {
            return self.list_limited(limit);
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM items
            WHERE text IS NOT NULL AND instr(lower(text), lower(?1)) > 0
            ORDER BY timestamp DESC
            LIMIT ?2
            "#
        ))?;
        let items = stmt
            .query_map(params![query, sql_limit(limit)], row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn get(&self, timestamp: Timestamp) -> Result<Option<Item>> {
        let conn = self.conn();
        get_item(&conn, timestamp)
    }

    pub fn contains(&self, timestamp: Timestamp) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM items WHERE timestamp = ?1)",
            params![timestamp.as_millis()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Record a capture.
    ///
    /// Byte-identical content already in the history is promoted to a fresh
    /// timestamp instead of being stored twice.
    pub fn insert(&self, content: ItemContent, source_app: Option<String>) -> Result<Insertion> {
        if content.is_empty() {
            return Err(ClipstashError::InvalidContent(format!(
                "empty {} payload",
                content.kind().as_str()
            )));
        }

        let hash = content_hash(&content);
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let timestamp = fresh_timestamp(&tx, self.clock.now())?;
        let insertion = match find_duplicate(&tx, &hash, &content)? {
            Some(existing) => {
                tx.execute(
                    r#"
                    UPDATE items SET
                        timestamp = ?1,
                        source_app = COALESCE(?2, source_app)
                    WHERE timestamp = ?3
                    "#,
                    params![
                        timestamp.as_millis(),
                        source_app,
                        existing.timestamp.as_millis()
                    ],
                )?;
                let replaced = existing.timestamp;
                Insertion {
                    item: Item {
                        timestamp,
                        source_app: source_app.or(existing.source_app),
                        ..existing
                    },
                    replaced: Some(replaced),
                }
            }
            None => {
                let image = content.as_image();
                tx.execute(
                    r#"
                    INSERT INTO items (
                        timestamp, kind, text, image, image_width, image_height,
                        content_hash, size_bytes, source_app
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                    params![
                        timestamp.as_millis(),
                        content.kind().as_str(),
                        content.as_text(),
                        image.map(|i| i.bytes.as_slice()),
                        image.map(|i| i.width),
                        image.map(|i| i.height),
                        hash,
                        content.size_bytes() as i64,
                        source_app,
                    ],
                )?;
                Insertion {
                    item: Item {
                        timestamp,
                        size_bytes: content.size_bytes(),
                        content,
                        source_app,
                    },
                    replaced: None,
                }
            }
        };

        tx.commit()?;

        match insertion.replaced {
            Some(old) => debug!(
                target: "clipstash::store",
                "Promoted duplicate {} -> {}", old, insertion.item.timestamp
            ),
            None => debug!(
                target: "clipstash::store",
                "Inserted {} item {} ({} bytes)",
                insertion.item.content.kind().as_str(),
                insertion.item.timestamp,
                insertion.item.size_bytes
            ),
        }

        Ok(insertion)
    }

    /// Move an item to the front under a new identity.
    ///
    /// `before_commit` runs while the store is locked and the item is known to
    /// exist. If it fails the item keeps its old identity.
    pub fn promote_with<F>(&self, timestamp: Timestamp, before_commit: F) -> Result<Item>
    where
        F: FnOnce(&Item) -> Result<()>,
    {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let item = get_item(&tx, timestamp)?.ok_or(ClipstashError::NotFound(timestamp))?;
        before_commit(&item)?;

        let fresh = fresh_timestamp(&tx, self.clock.now())?;
        tx.execute(
            "UPDATE items SET timestamp = ?1 WHERE timestamp = ?2",
            params![fresh.as_millis(), timestamp.as_millis()],
        )?;
        tx.commit()?;

        debug!(target: "clipstash::store", "Promoted {} -> {}", timestamp, fresh);
        Ok(Item {
            timestamp: fresh,
            ..item
        })
    }

    /// Remove a single item.
    pub fn delete(&self, timestamp: Timestamp) -> Result<()> {
        let conn = self.conn();
        let removed = conn.execute(
            "DELETE FROM items WHERE timestamp = ?1",
            params![timestamp.as_millis()],
        )?;
        if removed == 0 {
            return Err(ClipstashError::NotFound(timestamp));
        }
        debug!(target: "clipstash::store", "Deleted item {}", timestamp);
        Ok(())
    }

    /// Remove every item. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM items", [])?;
        info!(target: "clipstash::store", "Cleared {} items", removed);
        Ok(removed)
    }

    /// Remove items captured more than `days` days ago. An item exactly at the
    /// cutoff is kept.
    pub fn clean_older_than(&self, days: u32) -> Result<usize> {
        let cutoff = self.clock.now().days_before(days);
        let conn = self.conn();
        let removed = conn.execute(
            "DELETE FROM items WHERE timestamp < ?1",
            params![cutoff.as_millis()],
        )?;
        info!(
            target: "clipstash::store",
            "Removed {} items older than {} days (cutoff {})", removed, days, cutoff
        );
        Ok(removed)
    }

    /// Storage statistics at call time.
    pub fn stats(&self) -> Result<SystemData> {
        let (item_count, payload_bytes) = {
            let conn = self.conn();
            conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(size_bytes), 0) FROM items",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )?
        };

        Ok(SystemData {
            db_path: self.path.clone(),
            size_bytes: on_disk_size(&self.path)?,
            item_count: item_count as u64,
            payload_bytes: payload_bytes as u64,
        })
    }
}

/// Hash used to find duplicate candidates. Equality is always confirmed on
/// the payload bytes.
pub(crate) fn content_hash(content: &ItemContent) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.kind().as_str().as_bytes());
    hasher.update([0u8]);
    if let Some(image) = content.as_image() {
        hasher.update(image.width.to_le_bytes());
        hasher.update(image.height.to_le_bytes());
    }
    hasher.update(content.payload());
    format!("{:x}", hasher.finalize())
}

/// `max(now, newest + 1)`, so a new identity is unique and sorts first.
fn fresh_timestamp(conn: &Connection, now: Timestamp) -> Result<Timestamp> {
    let newest: Option<i64> =
        conn.query_row("SELECT MAX(timestamp) FROM items", [], |row| row.get(0))?;
    Ok(match newest {
        Some(newest) => now.max(Timestamp::from_millis(newest).next()),
        None => now,
    })
}

fn find_duplicate(conn: &Connection, hash: &str, content: &ItemContent) -> Result<Option<Item>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE content_hash = ?1 AND kind = ?2"
    ))?;
    let candidates = stmt
        .query_map(params![hash, content.kind().as_str()], row_to_item)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(candidates
        .into_iter()
        .find(|item| item.content.is_duplicate_of(content)))
}

fn get_item(conn: &Connection, timestamp: Timestamp) -> Result<Option<Item>> {
    let item = conn
        .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE timestamp = ?1"),
            params![timestamp.as_millis()],
            row_to_item,
        )
        .optional()?;
    Ok(item)
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    let timestamp: i64 = row.get("timestamp")?;
    let text: Option<String> = row.get("text")?;
    let image: Option<Vec<u8>> = row.get("image")?;
    let image_width: Option<u32> = row.get("image_width")?;
    let image_height: Option<u32> = row.get("image_height")?;
    let size_bytes: i64 = row.get("size_bytes")?;
    let source_app: Option<String> = row.get("source_app")?;

    let content = match (text, image) {
        (Some(text), _) => ItemContent::Text(text),
        (None, Some(bytes)) => ItemContent::Image(ImageContent {
            width: image_width.unwrap_or_default(),
            height: image_height.unwrap_or_default(),
            bytes,
        }),
        (None, None) => {
            return Err(rusqlite::Error::InvalidColumnType(
                1,
                ContentKind::Text.as_str().to_string(),
                rusqlite::types::Type::Null,
            ));
        }
    };

    Ok(Item {
        timestamp: Timestamp::from_millis(timestamp),
        content,
        size_bytes: size_bytes as u64,
        source_app,
    })
}

/// SQLite treats a negative LIMIT as unbounded.
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map(|n| n as i64).unwrap_or(-1)
}

/// Size of the database file plus its WAL sidecars.
fn on_disk_size(path: &Path) -> Result<u64> {
    let mut total = 0;
    for suffix in ["", "-wal", "-shm"] {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        match std::fs::metadata(PathBuf::from(name)) {
            Ok(meta) => total += meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use clipstash_types::MILLIS_PER_DAY;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn create_test_store(start: i64) -> (HistoryStore, Arc<ManualClock>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let store =
            HistoryStore::open_with_clock(&temp_dir.path().join("clipboard.db"), clock.clone())
                .unwrap();
        (store, clock, temp_dir)
    }

    fn timestamps(store: &HistoryStore) -> Vec<i64> {
        store
            .list()
            .unwrap()
            .iter()
            .map(|item| item.timestamp.as_millis())
            .collect()
    }

    #[test]
    fn test_insert_and_list_newest_first() {
        let (store, clock, _dir) = create_test_store(100);

        let a = store.insert(ItemContent::text("hello"), None).unwrap();
        clock.set(200);
        let b = store
            .insert(ItemContent::image(2, 2, vec![1, 2, 3, 4]), Some("Preview".into()))
            .unwrap();

        assert_eq!(a.item.timestamp.as_millis(), 100);
        assert_eq!(a.item.size_bytes, 5);
        assert_eq!(b.item.timestamp.as_millis(), 200);
        assert!(a.replaced.is_none());

        let items = store.list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], b.item);
        assert_eq!(items[1], a.item);
        assert_eq!(items[0].source_app.as_deref(), Some("Preview"));
    }

    #[test]
    fn test_timestamp_collision_gets_greater_value() {
        let (store, _clock, _dir) = create_test_store(500);

        store.insert(ItemContent::text("one"), None).unwrap();
        store.insert(ItemContent::text("two"), None).unwrap();
        store.insert(ItemContent::text("three"), None).unwrap();

        assert_eq!(timestamps(&store), vec![502, 501, 500]);
    }

    #[test]
    fn test_clock_going_backwards_keeps_order() {
        let (store, clock, _dir) = create_test_store(1_000);
        store.insert(ItemContent::text("first"), None).unwrap();
        clock.set(10);
        let second = store.insert(ItemContent::text("second"), None).unwrap();

        assert_eq!(second.item.timestamp.as_millis(), 1_001);
        assert_eq!(store.list().unwrap()[0].content, ItemContent::text("second"));
    }

    #[test]
    fn test_duplicate_text_is_promoted() {
        let (store, clock, _dir) = create_test_store(100);
        store.insert(ItemContent::text("hello"), Some("Terminal".into())).unwrap();
        clock.set(200);
        store.insert(ItemContent::text("world"), None).unwrap();
        clock.set(300);

        let again = store.insert(ItemContent::text("hello"), None).unwrap();

        assert_eq!(again.replaced, Some(Timestamp::from_millis(100)));
        assert_eq!(again.item.timestamp.as_millis(), 300);
        // Attribution survives when the new capture has none
        assert_eq!(again.item.source_app.as_deref(), Some("Terminal"));
        assert_eq!(timestamps(&store), vec![300, 200]);
        assert!(store.get(Timestamp::from_millis(100)).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_image_is_promoted_by_bytes() {
        let (store, clock, _dir) = create_test_store(100);
        let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        store.insert(ItemContent::image(10, 10, png.clone()), None).unwrap();
        clock.set(150);
        store
            .insert(ItemContent::image(10, 10, vec![0x89, b'P', b'N', b'G', 9]), None)
            .unwrap();
        clock.set(200);

        let again = store.insert(ItemContent::image(10, 10, png), None).unwrap();

        assert_eq!(again.replaced, Some(Timestamp::from_millis(100)));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_same_bytes_with_other_dimensions_is_a_new_item() {
        let (store, clock, _dir) = create_test_store(100);
        let rgba = vec![1, 2, 3, 4, 5, 6, 7, 8];
        store.insert(ItemContent::image(2, 1, rgba.clone()), None).unwrap();
        clock.set(200);

        let rotated = store.insert(ItemContent::image(1, 2, rgba), None).unwrap();

        assert!(rotated.replaced.is_none());
        assert_eq!(timestamps(&store), vec![200, 100]);
        let front = store.get(Timestamp::from_millis(200)).unwrap().unwrap();
        let image = front.content.as_image().unwrap();
        assert_eq!((image.width, image.height), (1, 2));
    }

    #[test]
    fn test_text_and_image_with_same_bytes_are_distinct() {
        let (store, clock, _dir) = create_test_store(100);
        store.insert(ItemContent::text("abc"), None).unwrap();
        clock.set(200);
        let image = store
            .insert(ItemContent::image(1, 1, b"abc".to_vec()), None)
            .unwrap();

        assert!(image.replaced.is_none());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_empty_content_rejected() {
        let (store, _clock, _dir) = create_test_store(100);
        let err = store.insert(ItemContent::text(""), None).unwrap_err();
        assert!(matches!(err, ClipstashError::InvalidContent(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_twice_returns_not_found() {
        let (store, clock, _dir) = create_test_store(100);
        store.insert(ItemContent::text("a"), None).unwrap();
        clock.set(200);
        store.insert(ItemContent::text("b"), None).unwrap();

        store.delete(Timestamp::from_millis(100)).unwrap();
        assert_eq!(timestamps(&store), vec![200]);

        let err = store.delete(Timestamp::from_millis(100)).unwrap_err();
        assert!(matches!(err, ClipstashError::NotFound(t) if t.as_millis() == 100));
        assert_eq!(timestamps(&store), vec![200]);
    }

    #[test]
    fn test_clear_removes_everything() {
        let (store, clock, _dir) = create_test_store(100);
        for (i, text) in ["a", "b", "c"].iter().enumerate() {
            clock.set(100 + i as i64);
            store.insert(ItemContent::text(*text), None).unwrap();
        }

        assert_eq!(store.clear().unwrap(), 3);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_clean_older_than_keeps_boundary() {
        let now = 30 * MILLIS_PER_DAY;
        let (store, clock, _dir) = create_test_store(0);

        clock.set(now - 7 * MILLIS_PER_DAY - 1);
        store.insert(ItemContent::text("expired"), None).unwrap();
        clock.set(now - 7 * MILLIS_PER_DAY);
        store.insert(ItemContent::text("boundary"), None).unwrap();
        clock.set(now - MILLIS_PER_DAY);
        store.insert(ItemContent::text("recent"), None).unwrap();
        clock.set(now);

        assert_eq!(store.clean_older_than(7).unwrap(), 1);

        let texts: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .filter_map(|item| item.content.as_text().map(str::to_string))
            .collect();
        assert_eq!(texts, vec!["recent", "boundary"]);
    }

    #[test]
    fn test_promote_with_moves_item_to_front() {
        let (store, clock, _dir) = create_test_store(100);
        store.insert(ItemContent::text("hello"), None).unwrap();
        clock.set(200);
        store.insert(ItemContent::image(1, 1, vec![7]), None).unwrap();
        clock.set(300);

        let promoted = store
            .promote_with(Timestamp::from_millis(100), |_| Ok(()))
            .unwrap();

        assert_eq!(promoted.timestamp.as_millis(), 300);
        assert_eq!(promoted.content, ItemContent::text("hello"));
        assert_eq!(timestamps(&store), vec![300, 200]);
    }

    #[test]
    fn test_promote_with_failing_callback_changes_nothing() {
        let (store, clock, _dir) = create_test_store(100);
        store.insert(ItemContent::text("hello"), None).unwrap();
        clock.set(200);

        let err = store
            .promote_with(Timestamp::from_millis(100), |_| {
                Err(ClipstashError::ClipboardAccess("denied".into()))
            })
            .unwrap_err();

        assert!(matches!(err, ClipstashError::ClipboardAccess(_)));
        assert_eq!(timestamps(&store), vec![100]);
    }

    #[test]
    fn test_promote_missing_item_does_not_run_callback() {
        let (store, _clock, _dir) = create_test_store(100);
        let mut called = false;
        let err = store
            .promote_with(Timestamp::from_millis(42), |_| {
                called = true;
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, ClipstashError::NotFound(_)));
        assert!(!called);
    }

    #[test]
    fn test_search_matches_text_case_insensitively() {
        let (store, clock, _dir) = create_test_store(100);
        store.insert(ItemContent::text("Hello World"), None).unwrap();
        clock.set(200);
        store.insert(ItemContent::text("goodbye"), None).unwrap();
        clock.set(300);
        store.insert(ItemContent::image(1, 1, b"hello".to_vec()), None).unwrap();
        clock.set(400);
        store.insert(ItemContent::text("say hello"), None).unwrap();

        let results = store.search("HELLO", None).unwrap();
        let texts: Vec<_> = results
            .iter()
            .filter_map(|item| item.content.as_text())
            .collect();
        assert_eq!(texts, vec!["say hello", "Hello World"]);

        assert_eq!(store.search("hello", Some(1)).unwrap().len(), 1);
        assert_eq!(store.search("", None).unwrap().len(), 4);
    }

    #[test]
    fn test_list_limited() {
        let (store, clock, _dir) = create_test_store(100);
        for i in 0..5 {
            clock.set(100 + i);
            store.insert(ItemContent::text(format!("item {i}")), None).unwrap();
        }
        let items = store.list_limited(Some(2)).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].timestamp.as_millis(), 104);
    }

    #[test]
    fn test_stats_reports_path_and_sizes() {
        let (store, clock, dir) = create_test_store(100);
        store.insert(ItemContent::text("hello"), None).unwrap();
        clock.set(200);
        store.insert(ItemContent::image(1, 1, vec![0; 10]), None).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.db_path, dir.path().join("clipboard.db"));
        assert_eq!(stats.item_count, 2);
        assert_eq!(stats.payload_bytes, 15);
        assert!(stats.size_bytes > 0);
    }

    #[test]
    fn test_history_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("clipboard.db");
        let clock = Arc::new(ManualClock::new(100));

        {
            let store = HistoryStore::open_with_clock(&path, clock.clone()).unwrap();
            store.insert(ItemContent::text("persisted"), Some("Editor".into())).unwrap();
        }

        let store = HistoryStore::open_with_clock(&path, clock).unwrap();
        let items = store.list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, ItemContent::text("persisted"));
        assert_eq!(items[0].source_app.as_deref(), Some("Editor"));
    }

    #[test]
    fn test_content_hash_depends_on_kind_and_dimensions() {
        assert_ne!(
            content_hash(&ItemContent::text("abc")),
            content_hash(&ItemContent::image(1, 1, b"abc".to_vec()))
        );
        assert_eq!(
            content_hash(&ItemContent::text("abc")),
            content_hash(&ItemContent::text("abc"))
        );
        assert_ne!(
            content_hash(&ItemContent::image(2, 1, b"abcd".to_vec())),
            content_hash(&ItemContent::image(1, 2, b"abcd".to_vec()))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_history_is_strictly_descending_and_deduplicated(
            ops in proptest::collection::vec(("[ab]{1,2}", 0i64..3), 1..30)
        ) {
            let (store, clock, _dir) = create_test_store(1_000);
            for (text, step) in &ops {
                clock.advance(*step);
                store.insert(ItemContent::text(text.clone()), None).unwrap();
            }

            let items = store.list().unwrap();
            for pair in items.windows(2) {
                prop_assert!(pair[0].timestamp > pair[1].timestamp);
            }

            let mut distinct: Vec<_> = ops.iter().map(|(text, _)| text.clone()).collect();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(items.len(), distinct.len());

            // The most recent capture is always at the front
            let last = &ops.last().unwrap().0;
            prop_assert_eq!(items[0].content.as_text(), Some(last.as_str()));
        }
    }
}
