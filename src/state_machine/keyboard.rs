//! Keyboard layouts offered to the user
//!
//! Layouts are transport-neutral; the Telegram client renders them into
//! reply or inline markup.

use super::event::Action;
use super::messages;
use crate::problems::TaskId;

/// Task numbers per keyboard row
pub const TASKS_PER_ROW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// "begin" / "decline" menu
    StartMenu,
    /// Task numbers `1..=max_task`
    TaskGrid { max_task: TaskId },
    /// Single "I want to prepare" button shown after declining
    ReEntry,
    /// Inline: solve / pick another task
    SolveOffer,
    /// Inline: explain / change task, attached to each problem
    ProblemActions,
    /// Inline: change task, attached to an explanation
    ExplanationActions,
    /// Hide the reply keyboard
    Remove,
}

/// Rendered layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Persistent keyboard whose buttons send their label as text
    Reply {
        rows: Vec<Vec<String>>,
        placeholder: Option<&'static str>,
    },
    /// Buttons attached to a message, each carrying an action
    Inline { rows: Vec<Vec<(String, Action)>> },
    Remove,
}

impl Keyboard {
    pub fn layout(self) -> Layout {
        match self {
            Keyboard::StartMenu => Layout::Reply {
                rows: vec![
                    vec![messages::BEGIN_BUTTON.to_string()],
                    vec![messages::DECLINE_BUTTON.to_string()],
                ],
                placeholder: Some(messages::START_PLACEHOLDER),
            },
            Keyboard::TaskGrid { max_task } => {
                let numbers: Vec<String> = (1..=max_task).map(|n| n.to_string()).collect();
                Layout::Reply {
                    rows: numbers.chunks(TASKS_PER_ROW).map(<[String]>::to_vec).collect(),
                    placeholder: None,
                }
            }
            Keyboard::ReEntry => Layout::Reply {
                rows: vec![vec![messages::REENTRY_BUTTON.to_string()]],
                placeholder: None,
            },
            Keyboard::SolveOffer => inline(&[
                (messages::SOLVE_BUTTON, Action::Solve),
                (messages::PICK_OTHER_TASK_BUTTON, Action::ChangeTask),
            ]),
            Keyboard::ProblemActions => inline(&[
                (messages::EXPLAIN_BUTTON, Action::Explain),
                (messages::CHANGE_TASK_BUTTON, Action::ChangeTask),
            ]),
            Keyboard::ExplanationActions => {
                inline(&[(messages::CHANGE_TASK_BUTTON, Action::ChangeTask)])
            }
            Keyboard::Remove => Layout::Remove,
        }
    }
}

/// One inline button per row
fn inline(buttons: &[(&str, Action)]) -> Layout {
    Layout::Inline {
        rows: buttons
            .iter()
            .map(|(label, action)| vec![((*label).to_string(), *action)])
            .collect(),
    }
}
