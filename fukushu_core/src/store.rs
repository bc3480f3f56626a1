//! Review item persistence with file locking.
//!
//! The whole review collection lives in one JSON document file. Reads take
//! a shared lock; writes go through a locked temp file and an atomic
//! rename. Schedule updates are applied per item (last writer wins); there
//! is no cross-item transaction.

use crate::{Error, ItemKind, MasteryLevel, PracticeSchedule, Result, ReviewItem};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Storage seam consumed by the recommendation engine
pub trait ReviewStore {
    /// Unordered candidate pool for one owner, level and kind
    fn find_candidates(&self, owner: &str, level: &str, kind: ItemKind)
        -> Result<Vec<ReviewItem>>;

    /// Look up a single item scoped to its owner
    fn find_item(&self, owner: &str, id: Uuid) -> Result<Option<ReviewItem>>;

    /// Write a new schedule state onto one item.
    ///
    /// Returns false when the id is unknown; callers treat that as a
    /// per-item skip, not a fatal error.
    fn apply_schedule(
        &mut self,
        id: Uuid,
        schedule: &PracticeSchedule,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}

/// JSON-file-backed review store
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Create a store for the given document file (created lazily on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the full collection with a shared lock.
    ///
    /// A missing file is an empty collection. A corrupt file is an error:
    /// review schedules are not recoverable from defaults.
    fn load(&self) -> Result<Vec<ReviewItem>> {
        if !self.path.exists() {
            tracing::debug!("No review file at {:?}, treating as empty", self.path);
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        match serde_json::from_str::<Vec<ReviewItem>>(&contents) {
            Ok(items) => {
                tracing::debug!("Loaded {} review items from {:?}", items.len(), self.path);
                Ok(items)
            }
            Err(e) => {
                tracing::error!("Review file {:?} is corrupt: {}", self.path, e);
                Err(Error::Json(e))
            }
        }
    }

    /// Save the full collection atomically under an exclusive lock
    fn save(&self, items: &[ReviewItem]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "review path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(items)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} review items to {:?}", items.len(), self.path);
        Ok(())
    }

    /// All items in the store, in file order
    pub fn all_items(&self) -> Result<Vec<ReviewItem>> {
        self.load()
    }

    /// Insert a new item (no dedup check; see [`JsonStore::find_by_source`])
    pub fn insert(&mut self, item: ReviewItem) -> Result<()> {
        let mut items = self.load()?;
        items.push(item);
        self.save(&items)
    }

    /// Look up an item by its upstream identity, scoped to an owner
    pub fn find_by_source(
        &self,
        owner: &str,
        kind: ItemKind,
        source_id: &str,
    ) -> Result<Option<ReviewItem>> {
        let items = self.load()?;
        Ok(items
            .into_iter()
            .find(|i| i.owner == owner && i.kind == kind && i.source_id == source_id))
    }

    /// Update an item's mastery bucket; false when the id is unknown
    pub fn set_mastery(
        &mut self,
        id: Uuid,
        mastery: MasteryLevel,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut items = self.load()?;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };

        item.mastery = mastery;
        item.updated_at = now;
        self.save(&items)?;
        Ok(true)
    }
}

impl ReviewStore for JsonStore {
    fn find_candidates(
        &self,
        owner: &str,
        level: &str,
        kind: ItemKind,
    ) -> Result<Vec<ReviewItem>> {
        let items = self.load()?;
        Ok(items
            .into_iter()
            .filter(|i| i.owner == owner && i.level == level && i.kind == kind)
            .collect())
    }

    fn find_item(&self, owner: &str, id: Uuid) -> Result<Option<ReviewItem>> {
        let items = self.load()?;
        Ok(items.into_iter().find(|i| i.id == id && i.owner == owner))
    }

    fn apply_schedule(
        &mut self,
        id: Uuid,
        schedule: &PracticeSchedule,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut items = self.load()?;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };

        item.practice_count = schedule.practice_count;
        item.practice_interval = Some(schedule.practice_interval);
        item.practice_ease = Some(schedule.practice_ease);
        item.last_practiced = Some(schedule.last_practiced);
        item.next_practice = Some(schedule.next_practice);
        item.updated_at = now;

        self.save(&items)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_item(owner: &str, level: &str, kind: ItemKind, source_id: &str) -> ReviewItem {
        let now = Utc::now();
        ReviewItem {
            id: Uuid::new_v4(),
            owner: owner.into(),
            kind,
            source_id: source_id.into(),
            slug: format!("slug-{}", source_id),
            title: format!("title-{}", source_id),
            meaning: "meaning".into(),
            level: level.into(),
            mastery: MasteryLevel::Beginner,
            created_at: now,
            updated_at: now,
            last_practiced: None,
            next_practice: None,
            practice_interval: None,
            practice_ease: None,
            practice_count: 0,
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path().join("reviews.json"));

        assert!(store.all_items().unwrap().is_empty());
        assert!(store
            .find_candidates("u1", "N5", ItemKind::Vocab)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_insert_and_find_candidates_filters() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path().join("reviews.json"));

        store.insert(test_item("u1", "N5", ItemKind::Vocab, "1")).unwrap();
        store.insert(test_item("u1", "N5", ItemKind::Grammar, "2")).unwrap();
        store.insert(test_item("u1", "N4", ItemKind::Vocab, "3")).unwrap();
        store.insert(test_item("u2", "N5", ItemKind::Vocab, "4")).unwrap();

        let candidates = store.find_candidates("u1", "N5", ItemKind::Vocab).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source_id, "1");
    }

    #[test]
    fn test_find_item_scoped_to_owner() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path().join("reviews.json"));

        let item = test_item("u1", "N5", ItemKind::Vocab, "1");
        let id = item.id;
        store.insert(item).unwrap();

        assert!(store.find_item("u1", id).unwrap().is_some());
        assert!(store.find_item("u2", id).unwrap().is_none());
    }

    #[test]
    fn test_apply_schedule_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path().join("reviews.json"));

        let item = test_item("u1", "N5", ItemKind::Vocab, "1");
        let id = item.id;
        store.insert(item).unwrap();

        let now = Utc::now();
        let schedule = PracticeSchedule {
            practice_count: 1,
            practice_interval: 1,
            practice_ease: 2.5,
            last_practiced: now,
            next_practice: now + Duration::days(1),
        };

        assert!(store.apply_schedule(id, &schedule, now).unwrap());

        let loaded = store.find_item("u1", id).unwrap().unwrap();
        assert_eq!(loaded.practice_count, 1);
        assert_eq!(loaded.practice_interval, Some(1));
        assert_eq!(loaded.last_practiced, Some(now));
    }

    #[test]
    fn test_apply_schedule_unknown_id_returns_false() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path().join("reviews.json"));
        store.insert(test_item("u1", "N5", ItemKind::Vocab, "1")).unwrap();

        let now = Utc::now();
        let schedule = PracticeSchedule {
            practice_count: 1,
            practice_interval: 1,
            practice_ease: 2.5,
            last_practiced: now,
            next_practice: now + Duration::days(1),
        };

        assert!(!store.apply_schedule(Uuid::new_v4(), &schedule, now).unwrap());
    }

    #[test]
    fn test_set_mastery_updates_in_place() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path().join("reviews.json"));

        let item = test_item("u1", "N5", ItemKind::Grammar, "9");
        let id = item.id;
        store.insert(item).unwrap();

        assert!(store.set_mastery(id, MasteryLevel::Adept, Utc::now()).unwrap());
        let loaded = store.find_item("u1", id).unwrap().unwrap();
        assert_eq!(loaded.mastery, MasteryLevel::Adept);
        assert_eq!(store.all_items().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("reviews.json");
        std::fs::write(&path, "{ not json ]").unwrap();

        let store = JsonStore::new(&path);
        assert!(store.all_items().is_err());
    }
}
