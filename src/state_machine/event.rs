//! Events that can occur in a conversation

use crate::explain::ExplanationFailure;

/// Inline button actions.
///
/// The set is closed: callback data that does not map onto a variant
/// arrives as [`Event::UnknownAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start (or resume) solving the selected task
    Solve,
    /// Go back to the task keyboard
    ChangeTask,
    /// Ask the language model for a worked explanation
    Explain,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Solve, Action::ChangeTask, Action::Explain];

    /// Identifier carried in the button's callback data
    pub fn callback_data(self) -> &'static str {
        match self {
            Action::Solve => "play",
            Action::ChangeTask => "mainmenu",
            Action::Explain => "gpt",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.callback_data() == data)
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Start {
        full_name: String,
    },
    Text {
        text: String,
    },
    Action(Action),
    UnknownAction {
        data: String,
    },

    // Explanation provider events
    ExplanationReady {
        correct_answer: String,
        outcome: Result<String, ExplanationFailure>,
    },
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }
}
