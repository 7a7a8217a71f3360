//! Remote task collection.
//!
//! The board mirrors its mutations into a document collection (by default
//! named `tasks`) that assigns its own identifiers on create. Two backends:
//!
//! - [`MemoryCollection`]: map-backed, can be told to fail every call
//! - [`FileCollection`]: a JSON object keyed by document id, stored at
//!   `<store_dir>/<collection>.json`, locked and written atomically
//!
//! Updating or deleting a document that does not exist succeeds without
//! effect, the way a realtime database treats writes to a missing path.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ulid::Ulid;

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::{Task, TaskFields, TaskPatch};

/// CRUD surface of the remote collection.
pub trait TaskCollection {
    /// Collection name, used in errors and logs.
    fn name(&self) -> &str;

    /// Store a new document; the collection picks its id.
    fn create(&mut self, fields: &TaskFields) -> Result<Task>;

    /// Every document, in no particular order.
    fn list(&mut self) -> Result<Vec<Task>>;

    fn update(&mut self, task_id: &str, patch: &TaskPatch) -> Result<()>;

    fn delete(&mut self, task_id: &str) -> Result<()>;
}

fn new_document_id() -> String {
    Ulid::new().to_string()
}

fn documents_to_tasks(documents: &BTreeMap<String, TaskFields>) -> Vec<Task> {
    documents
        .iter()
        .map(|(id, fields)| Task::new(id.clone(), fields.clone()))
        .collect()
}

fn merge_patch(documents: &mut BTreeMap<String, TaskFields>, task_id: &str, patch: &TaskPatch) -> Result<()> {
    if let Some(fields) = documents.get_mut(task_id) {
        patch.apply(fields)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct MemoryCollection {
    name: String,
    documents: BTreeMap<String, TaskFields>,
    failing: bool,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new("tasks")
    }
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: BTreeMap::new(),
            failing: false,
        }
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, task_id: &str) -> Option<&TaskFields> {
        self.documents.get(task_id)
    }

    /// Seed a document under a known id.
    pub fn insert(&mut self, task: Task) {
        self.documents.insert(task.id, task.fields);
    }

    fn guard(&self, operation: &str) -> Result<()> {
        if self.failing {
            return Err(Error::persistence(
                &self.name,
                format!("{operation} rejected: collection unavailable"),
            ));
        }
        Ok(())
    }
}

impl TaskCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self, fields: &TaskFields) -> Result<Task> {
        self.guard("create")?;
        let id = new_document_id();
        self.documents.insert(id.clone(), fields.clone());
        Ok(Task::new(id, fields.clone()))
    }

    fn list(&mut self) -> Result<Vec<Task>> {
        self.guard("list")?;
        Ok(documents_to_tasks(&self.documents))
    }

    fn update(&mut self, task_id: &str, patch: &TaskPatch) -> Result<()> {
        self.guard("update")?;
        merge_patch(&mut self.documents, task_id, patch)
    }

    fn delete(&mut self, task_id: &str) -> Result<()> {
        self.guard("delete")?;
        self.documents.remove(task_id);
        Ok(())
    }
}

/// File-backed collection document.
#[derive(Debug, Clone)]
pub struct FileCollection {
    name: String,
    path: PathBuf,
}

impl FileCollection {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.lock", self.path.display()))
    }

    fn read_documents(&self) -> Result<BTreeMap<String, TaskFields>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|err| self.wrap(err))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|err| self.wrap(err))
    }

    fn write_documents(&self, documents: &BTreeMap<String, TaskFields>) -> Result<()> {
        let json = serde_json::to_string_pretty(documents)?;
        lock::write_atomic(&self.path, json.as_bytes()).map_err(|err| self.wrap(err))
    }

    /// Read, mutate and write back under the collection lock.
    fn with_documents<T>(
        &self,
        mutate: impl FnOnce(&mut BTreeMap<String, TaskFields>) -> Result<T>,
    ) -> Result<T> {
        let _lock = FileLock::acquire(self.lock_path(), DEFAULT_LOCK_TIMEOUT_MS)
            .map_err(|err| self.wrap(err))?;
        let mut documents = self.read_documents()?;
        let result = mutate(&mut documents)?;
        self.write_documents(&documents)?;
        Ok(result)
    }

    fn wrap(&self, err: impl std::fmt::Display) -> Error {
        Error::persistence(&self.name, format!("{}: {err}", self.path.display()))
    }
}

impl TaskCollection for FileCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self, fields: &TaskFields) -> Result<Task> {
        self.with_documents(|documents| {
            let id = new_document_id();
            documents.insert(id.clone(), fields.clone());
            Ok(Task::new(id, fields.clone()))
        })
    }

    fn list(&mut self) -> Result<Vec<Task>> {
        let _lock = FileLock::acquire(self.lock_path(), DEFAULT_LOCK_TIMEOUT_MS)
            .map_err(|err| self.wrap(err))?;
        Ok(documents_to_tasks(&self.read_documents()?))
    }

    fn update(&mut self, task_id: &str, patch: &TaskPatch) -> Result<()> {
        self.with_documents(|documents| merge_patch(documents, task_id, patch))
    }

    fn delete(&mut self, task_id: &str) -> Result<()> {
        self.with_documents(|documents| {
            documents.remove(task_id);
            Ok(())
        })
    }
}
