//! Session and dialogue state types

use crate::problems::{ProblemBank, ProblemRecord, TaskId, MAX_TASK};
use std::sync::Arc;

/// Where the conversation is in the dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogueState {
    /// Dormant: start menu offered, nothing selected
    #[default]
    Idle,
    /// Task keyboard shown, waiting for a task number
    ChoosingTask,
    /// Problems are being presented and answers checked
    SolvingTask,
}

/// Per-conversation progress.
///
/// `Session::default()` is the dormant session; the store treats it as
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub state: DialogueState,
    /// Selected task, always a task present in the problem bank
    pub current_task: Option<TaskId>,
    /// Index of the next unsolved problem (equal to the sequence length
    /// only transiently, right before completion)
    pub problem_index: usize,
}

impl Session {
    pub fn is_dormant(&self) -> bool {
        *self == Self::default()
    }

    /// Same progress, different dialogue state
    pub fn with_state(&self, state: DialogueState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}

/// Immutable context shared by every conversation
#[derive(Debug, Clone)]
pub struct DialogueContext {
    pub bank: Arc<ProblemBank>,
    pub max_task: TaskId,
}

impl DialogueContext {
    pub fn new(bank: Arc<ProblemBank>) -> Self {
        Self {
            bank,
            max_task: MAX_TASK,
        }
    }

    /// Problem sequence of the session's task, `None` when the session
    /// references no task or one the bank does not know
    pub fn problems_for(&self, session: &Session) -> Option<&[ProblemRecord]> {
        session.current_task.and_then(|task| self.bank.problems(task))
    }

    /// The problem the session is currently on, if any
    pub fn current_problem(&self, session: &Session) -> Option<&ProblemRecord> {
        self.problems_for(session)?.get(session.problem_index)
    }
}
