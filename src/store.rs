//! In-memory task store.
//!
//! The store owns task field data only. Column placement lives in
//! [`crate::assignments::ColumnAssignments`]; keeping the two consistent is
//! the job of [`crate::board::Board`].

use std::collections::{HashMap, HashSet};

use ulid::Ulid;

use crate::config::TasksConfig;
use crate::error::{Error, Result};
use crate::task::{Task, TaskFields, TaskPatch};

const TASK_ID_DELIMS: [&str; 2] = ["-", "/"];
const ULID_TIME_LEN: usize = 10;
const ULID_RANDOM_LEN: usize = 16;
const ULID_CHARSET: &str = "0123456789abcdefghjkmnpqrstvwxyz";
const ULID_CHARSET_LEN: u128 = 32;

#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: HashMap<String, Task>,
    config: TasksConfig,
}

impl TaskStore {
    pub fn new(config: TasksConfig) -> Self {
        Self {
            tasks: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &TasksConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// All tasks, sorted by id for stable output.
    pub fn list(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.values().collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        tasks
    }

    /// Validate `fields`, assign a fresh identifier and insert the record.
    ///
    /// The caller places the new id in a column.
    pub(crate) fn create(&mut self, fields: TaskFields) -> Result<Task> {
        let fields = fields.normalized();
        fields.validate()?;
        let task = Task::new(self.generate_task_id(), fields);
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    /// Insert a record that already carries an identifier (snapshot, remote list).
    pub(crate) fn insert(&mut self, task: Task) -> Result<()> {
        if task.id.trim().is_empty() {
            return Err(Error::Validation("task id cannot be empty".to_string()));
        }
        if self.tasks.contains_key(&task.id) {
            return Err(Error::InvalidArgument(format!(
                "task already exists: {}",
                task.id
            )));
        }
        task.fields.validate()?;
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Merge `patch` into an existing record.
    ///
    /// Returns `Ok(None)` when `task_id` is unknown.
    pub(crate) fn update(&mut self, task_id: &str, patch: &TaskPatch) -> Result<Option<Task>> {
        let Some(task) = self.tasks.get_mut(task_id) else {
            return Ok(None);
        };
        patch.apply(&mut task.fields)?;
        Ok(Some(task.clone()))
    }

    pub(crate) fn remove(&mut self, task_id: &str) -> Option<Task> {
        self.tasks.remove(task_id)
    }

    fn unique_task_suffix_from_base(
        base: &str,
        len: usize,
        existing_suffixes: &HashSet<String>,
    ) -> Option<String> {
        let base = base.to_lowercase();
        let random_end = ULID_TIME_LEN + ULID_RANDOM_LEN;
        if base.len() < random_end || len == 0 || len > ULID_RANDOM_LEN {
            return None;
        }
        let candidate = &base[ULID_TIME_LEN..ULID_TIME_LEN + len];
        if existing_suffixes.contains(candidate) {
            return None;
        }
        Some(candidate.to_string())
    }

    fn select_task_suffix_len(min_len: usize, ulid_suffix_counts: &HashMap<usize, usize>) -> usize {
        let mut len = min_len;
        loop {
            let used = ulid_suffix_counts.get(&len).copied().unwrap_or(0) as u128;
            if used >= ulid_space_for_len(len) && len < ULID_RANDOM_LEN {
                len += 1;
                continue;
            }
            return len;
        }
    }

    /// Generate `<prefix>-<suffix>` where the suffix is a slice of a fresh
    /// ULID's random part, unique among existing ids.
    pub fn generate_task_id(&self) -> String {
        let prefix = self.config.id_prefix.trim();
        let mut existing_suffixes = HashSet::new();
        let mut ulid_suffix_counts: HashMap<usize, usize> = HashMap::new();
        for id in self.tasks.keys() {
            let id_norm = normalize_id(id);
            let suffix = suffix_from_id(&id_norm);
            if suffix.is_empty() {
                continue;
            }
            existing_suffixes.insert(suffix.to_string());
            if is_ulid_suffix(suffix) {
                *ulid_suffix_counts.entry(suffix.len()).or_insert(0) += 1;
            }
        }

        let target_len = Self::select_task_suffix_len(self.config.id_min_len, &ulid_suffix_counts);
        loop {
            let base = Ulid::new().to_string();
            if let Some(suffix) =
                Self::unique_task_suffix_from_base(&base, target_len, &existing_suffixes)
            {
                return format!("{prefix}-{suffix}");
            }
        }
    }

    /// Resolve user input to a task id: exact id, exact suffix, or a unique
    /// suffix prefix.
    pub fn resolve_task_id(&self, input: &str) -> Result<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }
        if self.tasks.contains_key(trimmed) {
            return Ok(trimmed.to_string());
        }

        let trimmed_norm = normalize_id(trimmed);
        let candidate_norm = suffix_from_id(&trimmed_norm).to_string();
        if candidate_norm.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }

        let mut exact: Vec<String> = Vec::new();
        let mut matches: Vec<String> = Vec::new();
        for id in self.tasks.keys() {
            let id_norm = normalize_id(id);
            let suffix_norm = suffix_from_id(&id_norm);
            if id_norm == trimmed_norm || suffix_norm == trimmed_norm {
                exact.push(id.clone());
                continue;
            }
            if suffix_norm.starts_with(&candidate_norm) {
                matches.push(id.clone());
            }
        }

        let pick = |mut found: Vec<String>| -> Result<Option<String>> {
            found.sort();
            found.dedup();
            match found.len() {
                0 => Ok(None),
                1 => Ok(found.pop()),
                _ => Err(Error::AmbiguousTaskId {
                    input: trimmed.to_string(),
                    candidates: found.join(", "),
                }),
            }
        };

        if let Some(id) = pick(exact)? {
            return Ok(id);
        }
        pick(matches)?.ok_or_else(|| Error::TaskNotFound(trimmed.to_string()))
    }
}

fn normalize_id(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn suffix_from_id(id_norm: &str) -> &str {
    let earliest = TASK_ID_DELIMS
        .iter()
        .filter_map(|delim| id_norm.find(delim))
        .min();
    match earliest {
        Some(idx) if idx + 1 < id_norm.len() => &id_norm[idx + 1..],
        Some(_) => "",
        None => id_norm,
    }
}

fn is_ulid_suffix(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ULID_CHARSET.contains(ch))
}

fn ulid_space_for_len(len: usize) -> u128 {
    (0..len).fold(1u128, |space, _| space.saturating_mul(ULID_CHARSET_LEN))
}
