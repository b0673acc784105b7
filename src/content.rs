//! Theory document lookup
//!
//! Each task may have one study document in the theory directory, named
//! after the task number. Extensions are tried in priority order.

use crate::problems::TaskId;
use std::path::{Path, PathBuf};

/// Candidate extensions, highest priority first
const THEORY_EXTENSIONS: &[&str] = &["docx", "pdf"];

/// A theory document ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoryDocument {
    pub task: TaskId,
    pub path: PathBuf,
    pub caption: String,
}

/// Filesystem-backed theory library
#[derive(Debug, Clone)]
pub struct TheoryLibrary {
    dir: PathBuf,
}

impl TheoryLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Find the document for a task, `None` if no candidate file exists
    pub async fn locate(&self, task: TaskId) -> Option<TheoryDocument> {
        for ext in THEORY_EXTENSIONS {
            let path = self.dir.join(format!("{task}.{ext}"));
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {
                    return Some(TheoryDocument {
                        task,
                        path,
                        caption: theory_caption(task),
                    });
                }
                Ok(_) => {
                    tracing::debug!(path = %path.display(), "Theory candidate is not a file");
                }
                Err(_) => {}
            }
        }
        None
    }
}

fn theory_caption(task: TaskId) -> String {
    format!("📚 Теория по заданию {task}")
}
