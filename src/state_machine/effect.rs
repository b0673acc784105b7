//! Effects produced by state transitions

use super::keyboard::Keyboard;
use crate::problems::{ProblemRecord, TaskId};

/// How the transport should interpret message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// Outbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub format: TextFormat,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            format: TextFormat::Plain,
        }
    }

    /// Split into messages of at most `max_chars` characters each.
    ///
    /// Breaks fall on line ends where possible; a single overlong line is
    /// cut mid-line. Only the last part carries the keyboard. `max_chars`
    /// must be non-zero.
    pub fn split(&self, max_chars: usize) -> Vec<Reply> {
        let mut parts: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0;

        let pieces = self.text.split_inclusive('\n').flat_map(|line| {
            let chars: Vec<char> = line.chars().collect();
            chars
                .chunks(max_chars)
                .map(|piece| piece.iter().collect::<String>())
                .collect::<Vec<_>>()
        });
        for piece in pieces {
            let piece_chars = piece.chars().count();
            if current_chars + piece_chars > max_chars && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            current.push_str(&piece);
            current_chars += piece_chars;
        }
        if !current.is_empty() || parts.is_empty() {
            parts.push(current);
        }

        let last = parts.len() - 1;
        parts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Reply {
                text,
                keyboard: if i == last { self.keyboard } else { None },
                format: self.format,
            })
            .collect()
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to the conversation
    Reply(Reply),

    /// Send the theory document for a task, or a notice if there is none
    SendTheory { task: TaskId },

    /// Ask the explanation provider about a problem; the result comes back
    /// as `Event::ExplanationReady`
    RequestExplanation { problem: ProblemRecord },

    /// Persist the new session
    PersistSession,

    /// Drop the stored session (back to dormant)
    ClearSession,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(Reply::plain(text))
    }

    pub fn reply_with(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Effect::Reply(Reply {
            text: text.into(),
            keyboard: Some(keyboard),
            format: TextFormat::Plain,
        })
    }

    pub fn markdown_with(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Effect::Reply(Reply {
            text: text.into(),
            keyboard: Some(keyboard),
            format: TextFormat::Markdown,
        })
    }
}
