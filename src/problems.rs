//! Problem bank: task number -> ordered problem sequence
//!
//! Loaded once at startup from a JSON document of the form
//! `{ "1": [ { "question": "...", "answer": "..." } ], ... }` and shared
//! read-only for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Task identifier (exam task number)
pub type TaskId = u32;

/// Highest task number offered in the task keyboard
pub const MAX_TASK: TaskId = 20;

/// A single question with its expected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub question: String,
    pub answer: String,
}

impl ProblemRecord {
    #[cfg(test)]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Errors raised while loading the problem bank
#[derive(Debug, Error)]
pub enum ProblemBankError {
    #[error("Failed to read problem bank {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed problem bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Task key '{0}' is not a task number")]
    InvalidKey(String),
    #[error("Task {task} is outside 1..={max}")]
    OutOfRange { task: TaskId, max: TaskId },
    #[error("Task {0} has no problems")]
    EmptyTask(TaskId),
    #[error("Task {0} is listed more than once")]
    DuplicateTask(TaskId),
}

/// Read-only mapping from task number to its problems
#[derive(Debug, Clone, Default)]
pub struct ProblemBank {
    tasks: BTreeMap<TaskId, Vec<ProblemRecord>>,
}

impl ProblemBank {
    /// Load and validate the bank from a JSON file
    pub fn load(path: &Path) -> Result<Self, ProblemBankError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ProblemBankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProblemBankError> {
        let parsed: HashMap<String, Vec<ProblemRecord>> = serde_json::from_str(raw)?;
        let mut tasks = Vec::with_capacity(parsed.len());
        for (key, problems) in parsed {
            let task = key
                .trim()
                .parse::<TaskId>()
                .map_err(|_| ProblemBankError::InvalidKey(key.clone()))?;
            tasks.push((task, problems));
        }
        Self::from_tasks(tasks)
    }

    /// Build a bank from already-parsed tasks.
    ///
    /// Every task must be within `1..=MAX_TASK`, appear once and carry at
    /// least one problem.
    pub fn from_tasks(
        tasks: impl IntoIterator<Item = (TaskId, Vec<ProblemRecord>)>,
    ) -> Result<Self, ProblemBankError> {
        let mut map = BTreeMap::new();
        for (task, problems) in tasks {
            if !(1..=MAX_TASK).contains(&task) {
                return Err(ProblemBankError::OutOfRange {
                    task,
                    max: MAX_TASK,
                });
            }
            if problems.is_empty() {
                return Err(ProblemBankError::EmptyTask(task));
            }
            if map.insert(task, problems).is_some() {
                return Err(ProblemBankError::DuplicateTask(task));
            }
        }
        Ok(Self { tasks: map })
    }

    /// Problems for a task, `None` when the task has no content yet
    pub fn problems(&self, task: TaskId) -> Option<&[ProblemRecord]> {
        self.tasks.get(&task).map(Vec::as_slice)
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.tasks.contains_key(&task)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn problem_count(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }
}
