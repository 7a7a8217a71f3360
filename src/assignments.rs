//! Column assignment map.
//!
//! Forward map: column → ordered task ids (on-screen order).
//! Reverse index: task id → column, updated by every mutation so that
//! "which column holds this task" is a lookup rather than a scan.
//!
//! Every mutation keeps an id in at most one column. Whether every stored
//! task is placed somewhere is checked against the task store by
//! [`ColumnAssignments::check`].

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::column::ColumnId;
use crate::error::{Error, Result};

/// Where a task sits on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub column: ColumnId,
    pub index: usize,
}

/// Problem found (and fixed) while rebuilding from persisted sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// Id appeared again after its first placement.
    DroppedDuplicate { id: String, column: ColumnId },
    /// Id named no known task.
    DroppedUnknown { id: String, column: ColumnId },
    /// Known task was not placed anywhere.
    PlacedOrphan { id: String, column: ColumnId },
}

impl std::fmt::Display for Repair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repair::DroppedDuplicate { id, column } => {
                write!(f, "dropped duplicate {id} from {column}")
            }
            Repair::DroppedUnknown { id, column } => {
                write!(f, "dropped unknown task {id} from {column}")
            }
            Repair::PlacedOrphan { id, column } => {
                write!(f, "appended unplaced task {id} to {column}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAssignments {
    sequences: BTreeMap<ColumnId, Vec<String>>,
    index: HashMap<String, ColumnId>,
}

impl Default for ColumnAssignments {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnAssignments {
    pub fn new() -> Self {
        let sequences = ColumnId::ALL
            .into_iter()
            .map(|column| (column, Vec::new()))
            .collect();
        Self {
            sequences,
            index: HashMap::new(),
        }
    }

    /// Rebuild from persisted sequences, repairing anything that breaks the
    /// invariants with respect to `known` task ids.
    pub fn from_sequences<'a>(
        sequences: &BTreeMap<ColumnId, Vec<String>>,
        known: impl IntoIterator<Item = &'a str>,
        orphan_column: ColumnId,
    ) -> (Self, Vec<Repair>) {
        let known: HashSet<&str> = known.into_iter().collect();
        let mut assignments = Self::new();
        let mut repairs = Vec::new();

        for column in ColumnId::ALL {
            for id in sequences.get(&column).into_iter().flatten() {
                if !known.contains(id.as_str()) {
                    repairs.push(Repair::DroppedUnknown {
                        id: id.clone(),
                        column,
                    });
                } else if !assignments.append(column, id) {
                    repairs.push(Repair::DroppedDuplicate {
                        id: id.clone(),
                        column,
                    });
                }
            }
        }

        let mut orphans: Vec<&str> = known
            .iter()
            .copied()
            .filter(|id| !assignments.contains(id))
            .collect();
        orphans.sort_unstable();
        for id in orphans {
            assignments.append(orphan_column, id);
            repairs.push(Repair::PlacedOrphan {
                id: id.to_string(),
                column: orphan_column,
            });
        }

        (assignments, repairs)
    }

    pub fn sequence(&self, column: ColumnId) -> &[String] {
        self.sequences
            .get(&column)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn sequences(&self) -> &BTreeMap<ColumnId, Vec<String>> {
        &self.sequences
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.index.contains_key(task_id)
    }

    pub fn column_of(&self, task_id: &str) -> Option<ColumnId> {
        self.index.get(task_id).copied()
    }

    pub fn placement(&self, task_id: &str) -> Option<Placement> {
        let column = self.column_of(task_id)?;
        let index = self.position(column, task_id)?;
        Some(Placement { column, index })
    }

    /// Index of `task_id` within `column`.
    pub fn position(&self, column: ColumnId, task_id: &str) -> Option<usize> {
        self.sequence(column).iter().position(|id| id == task_id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Append an unplaced id to the end of `column`.
    ///
    /// Returns `false` (and changes nothing) if the id is already placed.
    pub fn append(&mut self, column: ColumnId, task_id: &str) -> bool {
        let len = self.sequence(column).len();
        self.insert(column, len, task_id)
    }

    /// Insert an unplaced id at `index` (clamped to the column length).
    pub fn insert(&mut self, column: ColumnId, index: usize, task_id: &str) -> bool {
        if self.index.contains_key(task_id) {
            return false;
        }
        let sequence = self.sequences.entry(column).or_default();
        let index = index.min(sequence.len());
        sequence.insert(index, task_id.to_string());
        self.index.insert(task_id.to_string(), column);
        true
    }

    /// Take an id off the board, reporting where it was.
    pub fn remove(&mut self, task_id: &str) -> Option<Placement> {
        let column = self.index.remove(task_id)?;
        let sequence = self.sequences.entry(column).or_default();
        let index = sequence.iter().position(|id| id == task_id)?;
        sequence.remove(index);
        Some(Placement { column, index })
    }

    /// Move a placed id to `column`, before `index` or at the end.
    pub fn move_to(&mut self, task_id: &str, column: ColumnId, index: Option<usize>) -> Option<Placement> {
        self.remove(task_id)?;
        let len = self.sequence(column).len();
        let index = index.unwrap_or(len).min(len);
        self.insert(column, index, task_id);
        Some(Placement { column, index })
    }

    /// Array-move within one column: remove at `from`, reinsert at `to`.
    pub fn reorder(&mut self, column: ColumnId, from: usize, to: usize) -> bool {
        let Some(sequence) = self.sequences.get_mut(&column) else {
            return false;
        };
        if from >= sequence.len() || to >= sequence.len() {
            return false;
        }
        if from != to {
            let id = sequence.remove(from);
            sequence.insert(to, id);
        }
        true
    }

    /// Replace every id through `rename`; ids mapped to `None` are dropped.
    pub fn rename_all(&mut self, mut rename: impl FnMut(&str) -> Option<String>) {
        let mut next = Self::new();
        for column in ColumnId::ALL {
            for id in self.sequence(column) {
                if let Some(new_id) = rename(id) {
                    next.append(column, &new_id);
                }
            }
        }
        *self = next;
    }

    /// Verify the invariants against the set of stored task ids.
    pub fn check<'a>(&self, store_ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let mut seen: HashMap<&str, ColumnId> = HashMap::new();
        for (column, sequence) in &self.sequences {
            for id in sequence {
                if let Some(previous) = seen.insert(id.as_str(), *column) {
                    return Err(Error::InvariantViolation(format!(
                        "task {id} placed in both {previous} and {column}"
                    )));
                }
                if self.index.get(id) != Some(column) {
                    return Err(Error::InvariantViolation(format!(
                        "reverse index disagrees on {id} in {column}"
                    )));
                }
            }
        }
        if seen.len() != self.index.len() {
            return Err(Error::InvariantViolation(
                "reverse index holds ids missing from every column".to_string(),
            ));
        }

        let store_ids: HashSet<&str> = store_ids.into_iter().collect();
        if let Some(id) = store_ids.iter().find(|id| !seen.contains_key(*id)) {
            return Err(Error::InvariantViolation(format!(
                "task {id} is not placed in any column"
            )));
        }
        if let Some(id) = seen.keys().find(|id| !store_ids.contains(*id)) {
            return Err(Error::InvariantViolation(format!(
                "columns reference {id}, which is not in the store"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(assignments: &ColumnAssignments, column: ColumnId) -> Vec<&str> {
        assignments
            .sequence(column)
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn append_and_lookup() {
        let mut map = ColumnAssignments::new();
        assert!(map.append(ColumnId::Todo, "a"));
        assert!(map.append(ColumnId::Todo, "b"));
        assert!(!map.append(ColumnId::Done, "a"));
        assert_eq!(ids(&map, ColumnId::Todo), vec!["a", "b"]);
        assert_eq!(map.column_of("b"), Some(ColumnId::Todo));
        assert_eq!(
            map.placement("b"),
            Some(Placement {
                column: ColumnId::Todo,
                index: 1
            })
        );
        assert_eq!(map.column_of("zzz"), None);
    }

    #[test]
    fn move_to_other_column_updates_reverse_index() {
        let mut map = ColumnAssignments::new();
        map.append(ColumnId::Todo, "a");
        map.append(ColumnId::Done, "b");
        let placed = map.move_to("a", ColumnId::Done, Some(0)).expect("moved");
        assert_eq!(placed.index, 0);
        assert_eq!(ids(&map, ColumnId::Done), vec!["a", "b"]);
        assert!(ids(&map, ColumnId::Todo).is_empty());
        assert_eq!(map.column_of("a"), Some(ColumnId::Done));
        map.check(["a", "b"]).expect("consistent");
    }

    #[test]
    fn reorder_is_array_move() {
        let mut map = ColumnAssignments::new();
        for id in ["a", "b", "c"] {
            map.append(ColumnId::Todo, id);
        }
        assert!(map.reorder(ColumnId::Todo, 2, 0));
        assert_eq!(ids(&map, ColumnId::Todo), vec!["c", "a", "b"]);
        assert!(map.reorder(ColumnId::Todo, 0, 2));
        assert_eq!(ids(&map, ColumnId::Todo), vec!["a", "b", "c"]);
        assert!(!map.reorder(ColumnId::Todo, 0, 3));
    }

    #[test]
    fn remove_reports_placement() {
        let mut map = ColumnAssignments::new();
        map.append(ColumnId::InProgress, "x");
        let removed = map.remove("x").expect("removed");
        assert_eq!(removed.column, ColumnId::InProgress);
        assert!(map.is_empty());
        assert!(map.remove("x").is_none());
    }

    #[test]
    fn from_sequences_repairs_duplicates_unknowns_and_orphans() {
        let mut raw = BTreeMap::new();
        raw.insert(ColumnId::Todo, vec!["a".to_string(), "ghost".to_string()]);
        raw.insert(ColumnId::Done, vec!["a".to_string()]);
        let (map, repairs) =
            ColumnAssignments::from_sequences(&raw, ["a", "b"], ColumnId::Todo);
        assert_eq!(ids(&map, ColumnId::Todo), vec!["a", "b"]);
        assert!(ids(&map, ColumnId::Done).is_empty());
        assert_eq!(repairs.len(), 3);
        map.check(["a", "b"]).expect("repaired");
    }

    #[test]
    fn check_detects_orphans() {
        let mut map = ColumnAssignments::new();
        map.append(ColumnId::Todo, "a");
        assert!(matches!(
            map.check(["a", "b"]),
            Err(Error::InvariantViolation(_))
        ));
        assert!(matches!(map.check([]), Err(Error::InvariantViolation(_))));
    }
}
