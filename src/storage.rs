use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    DATE_FORMAT, Task, TaskError, TaskId, TaskStatus, TaskTime, generate_id, required_title,
};

pub const DEFAULT_SLOT_KEY: &str = "tasks";
const SLOT_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed persisted data: {0}")]
    JsonDecode(#[source] serde_json::Error),
    #[error("malformed persisted data: {0}")]
    InvalidRecord(#[from] TaskError),
    #[error("failed to encode tasks: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("task index {index} out of range (collection has {len} tasks)")]
    OutOfRange { index: usize, len: usize },
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// One named slot in the on-disk key-value store: `<dir>/<key>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSlot {
    path: PathBuf,
}

impl StoreSlot {
    pub fn new(dir: &Path, key: &str) -> Self {
        Self {
            path: dir.join(format!("{key}.{SLOT_EXTENSION}")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been stored yet.
    pub fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    pub fn write(&self, content: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<TaskId>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(with = "record_date")]
    date: NaiveDate,
    time: TaskTime,
    status: TaskStatus,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            date: task.date,
            time: task.time,
            status: task.status,
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskError;

    /// Records written before ids existed get a fresh one.
    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Ok(Task {
            id: record.id.unwrap_or_else(generate_id),
            title: required_title(record.title)?,
            description: record.description,
            date: record.date,
            time: record.time,
            status: record.status,
        })
    }
}

mod record_date {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    /// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps, normalized to the local day.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(date) = NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|timestamp| timestamp.with_timezone(&Local).date_naive())
            .map_err(|_| serde::de::Error::custom(format!("invalid task date `{raw}`")))
    }
}

pub fn persist(tasks: &[Task]) -> Result<String, StorageError> {
    let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
    serde_json::to_string_pretty(&records).map_err(StorageError::JsonEncode)
}

/// Any malformed record fails the whole collection.
pub fn parse_tasks(raw: &str) -> Result<Vec<Task>, StorageError> {
    decode(raw).map(|decoded| decoded.tasks)
}

struct Decoded {
    tasks: Vec<Task>,
    assigned_ids: bool,
}

fn decode(raw: &str) -> Result<Decoded, StorageError> {
    if raw.trim().is_empty() {
        return Ok(Decoded {
            tasks: Vec::new(),
            assigned_ids: false,
        });
    }
    let records: Vec<TaskRecord> = serde_json::from_str(raw).map_err(StorageError::JsonDecode)?;
    let assigned_ids = records.iter().any(|record| record.id.is_none());
    let tasks = records
        .into_iter()
        .map(Task::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Decoded {
        tasks,
        assigned_ids,
    })
}

/// Owns the task collection and keeps its persisted slot in step with it.
#[derive(Debug)]
pub struct TaskStore {
    slot: StoreSlot,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn open(slot: StoreSlot) -> Self {
        let mut store = Self {
            slot,
            tasks: Vec::new(),
        };
        let decoded = store.read_slot();
        store.tasks = decoded.tasks;
        debug!(
            path = %store.slot.path().display(),
            count = store.tasks.len(),
            "hydrated task store"
        );
        // Ids handed out to legacy records must survive the next load.
        if decoded.assigned_ids {
            debug!("persisting ids assigned to legacy records");
            store.save();
        }
        store
    }

    /// Reads the slot. Missing or unreadable data yields an empty collection.
    pub fn load(&self) -> Vec<Task> {
        self.read_slot().tasks
    }

    fn read_slot(&self) -> Decoded {
        let empty = || Decoded {
            tasks: Vec::new(),
            assigned_ids: false,
        };
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return empty(),
            Err(err) => {
                warn!(path = %self.slot.path().display(), error = %err, "failed to read task slot");
                return empty();
            }
        };
        match decode(&raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(
                    path = %self.slot.path().display(),
                    error = %err,
                    "discarding malformed task data"
                );
                empty()
            }
        }
    }

    pub fn slot(&self) -> &StoreSlot {
        &self.slot
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn add(&mut self, task: Task) -> TaskId {
        let id = task.id.clone();
        debug!(id = %id, title = %task.title, "adding task");
        self.tasks.push(task);
        self.save();
        id
    }

    pub fn update(&mut self, index: usize, task: Task) -> Result<(), StoreError> {
        let id = self.id_at(index)?;
        self.update_by_id(&id, task)
    }

    pub fn delete(&mut self, index: usize) -> Result<Task, StoreError> {
        let id = self.id_at(index)?;
        self.delete_by_id(&id)
    }

    pub fn set_status(&mut self, index: usize, status: TaskStatus) -> Result<(), StoreError> {
        let mut task = self.tasks.get(index).cloned().ok_or(StoreError::OutOfRange {
            index,
            len: self.tasks.len(),
        })?;
        task.status = status;
        self.update(index, task)
    }

    /// Replaces the record with `id`. The stored record keeps `id`.
    pub fn update_by_id(&mut self, id: &str, mut task: Task) -> Result<(), StoreError> {
        let position = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        task.id = id.to_string();
        debug!(id, position, "updating task");
        self.tasks[position] = task;
        self.save();
        Ok(())
    }

    pub fn delete_by_id(&mut self, id: &str) -> Result<Task, StoreError> {
        let position = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!(id, position, "deleting task");
        let removed = self.tasks.remove(position);
        self.save();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        debug!(count = self.tasks.len(), "clearing task store");
        self.tasks.clear();
        self.save();
    }

    fn id_at(&self, index: usize) -> Result<TaskId, StoreError> {
        self.tasks
            .get(index)
            .map(|task| task.id.clone())
            .ok_or(StoreError::OutOfRange {
                index,
                len: self.tasks.len(),
            })
    }

    /// Full re-serialization; failures are logged, never returned.
    fn save(&self) {
        let result = persist(&self.tasks).and_then(|blob| self.slot.write(&blob));
        if let Err(err) = result {
            warn!(path = %self.slot.path().display(), error = %err, "failed to persist tasks");
        }
    }
}
