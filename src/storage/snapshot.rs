//! JSONL snapshot files for tasks and milestones
//!
//! Each record collection lives in one file under `.planboard/` with one
//! JSON object per line. Files are the local backend's source of truth
//! and double as the offline cache for remote projects. Uses file locking
//! for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Milestone, Task};

/// A record that can live in a snapshot file
pub trait SnapshotRecord: Serialize + DeserializeOwned + Clone {
    fn record_id(&self) -> &str;
    fn created_stamp(&self) -> DateTime<Utc>;
}

impl SnapshotRecord for Task {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn created_stamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl SnapshotRecord for Milestone {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn created_stamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Store for one record collection in JSONL format
pub struct SnapshotStore<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: SnapshotRecord> SnapshotStore<T> {
    /// Creates a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records in file order.
    ///
    /// Files are written sorted by creation stamp, so this is also
    /// creation order. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open snapshot: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on snapshot")?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: T = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse record at line {}", line_num + 1))?;

            records.push(record);
        }

        // Lock is released with the file handle
        Ok(records)
    }

    /// Finds one record by id
    pub fn find(&self, id: &str) -> Result<Option<T>> {
        Ok(self.read_all()?.into_iter().find(|r| r.record_id() == id))
    }

    /// Rewrites the whole file from `records`.
    ///
    /// Records land sorted by creation stamp (id as tie-break) so repeated
    /// writes of the same content produce identical files.
    pub fn write_all(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on snapshot")?;

            let mut writer = BufWriter::new(&file);

            let mut sorted: Vec<&T> = records.iter().collect();
            sorted.sort_by(|a, b| {
                a.created_stamp()
                    .cmp(&b.created_stamp())
                    .then_with(|| a.record_id().cmp(b.record_id()))
            });

            for record in sorted {
                let line = serde_json::to_string(record).context("Failed to serialize record")?;
                writeln!(writer, "{}", line).context("Failed to write record")?;
            }

            writer.flush().context("Failed to flush snapshot")?;
        }

        // Swap in atomically so readers never see a half-written file
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single record without rewriting the file
    pub fn append(&self, record: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open snapshot: {}", self.path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire write lock on snapshot")?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(writer, "{}", line).context("Failed to write record")?;

        writer.flush().context("Failed to flush snapshot")?;

        Ok(())
    }

    /// Inserts or replaces the record with the same id
    pub fn upsert(&self, record: &T) -> Result<()> {
        let mut records = self.read_all()?;
        match records
            .iter_mut()
            .find(|r| r.record_id() == record.record_id())
        {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.write_all(&records)
    }

    /// Removes a record by id, reporting whether it existed
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut records = self.read_all()?;
        let before = records.len();
        records.retain(|r| r.record_id() != id);
        let removed = records.len() != before;
        if removed {
            self.write_all(&records)?;
        }
        Ok(removed)
    }

    /// Keeps only records matching `keep`, returning how many were dropped
    pub fn retain(&self, keep: impl Fn(&T) -> bool) -> Result<usize> {
        let mut records = self.read_all()?;
        let before = records.len();
        records.retain(|r| keep(r));
        let removed = before - records.len();
        if removed > 0 {
            self.write_all(&records)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    use crate::domain::{TaskDraft, TaskStatus};

    fn make_task(title: &str, minutes_ago: i64) -> Task {
        TaskDraft::new(title).into_task(Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn read_empty_store() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn write_all_orders_by_creation_stamp() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        let newer = make_task("Newer", 5);
        let older = make_task("Older", 60);
        store.write_all(&[newer, older]).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded[0].title, "Older");
        assert_eq!(loaded[1].title, "Newer");
    }

    #[test]
    fn append_then_read() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        store.append(&make_task("One", 2)).unwrap();
        store.append(&make_task("Two", 1)).unwrap();

        assert_eq!(store.read_all().unwrap().len(), 2);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        let mut task = make_task("Original", 10);
        store.append(&task).unwrap();

        task.status = TaskStatus::Done;
        store.upsert(&task).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].status, TaskStatus::Done);
    }

    #[test]
    fn find_by_id() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        let task = make_task("Findable", 1);
        store.append(&task).unwrap();

        assert_eq!(
            store.find(task.id.as_str()).unwrap().map(|t| t.title),
            Some("Findable".to_string())
        );
        assert!(store.find("t-0000000").unwrap().is_none());
    }

    #[test]
    fn remove_by_id() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        let task = make_task("Doomed", 1);
        store.append(&task).unwrap();

        assert!(store.remove(task.id.as_str()).unwrap());
        assert!(!store.remove(task.id.as_str()).unwrap());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn retain_drops_non_matching() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        let keep = make_task("Keep", 2);
        let drop = make_task("Drop", 1);
        store.write_all(&[keep.clone(), drop]).unwrap();

        let removed = store.retain(|t| t.id == keep.id).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.read_all().unwrap()[0].title, "Keep");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> =
            SnapshotStore::new(dir.path().join("nested").join("dir").join("tasks.jsonl"));

        store.append(&make_task("Deep", 1)).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store: SnapshotStore<Task> = SnapshotStore::new(dir.path().join("tasks.jsonl"));

        store.write_all(&[make_task("Only", 1)]).unwrap();

        assert!(!store.path().with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.jsonl");
        let store: SnapshotStore<Task> = SnapshotStore::new(&path);

        let task = make_task("Real", 1);
        store.append(&task).unwrap();
        fs::write(
            &path,
            format!("{}\n\n", serde_json::to_string(&task).unwrap()),
        )
        .unwrap();

        assert_eq!(store.read_all().unwrap().len(), 1);
    }
}
