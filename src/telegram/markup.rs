//! `reply_markup` payloads rendered from transport-neutral keyboards

use crate::state_machine::keyboard::Layout;
use crate::state_machine::Keyboard;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Inline(InlineKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardRemove {
    pub remove_keyboard: bool,
}

impl From<Keyboard> for ReplyMarkup {
    fn from(keyboard: Keyboard) -> Self {
        match keyboard.layout() {
            Layout::Reply { rows, placeholder } => ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
                keyboard: rows
                    .into_iter()
                    .map(|row| row.into_iter().map(|text| KeyboardButton { text }).collect())
                    .collect(),
                resize_keyboard: true,
                input_field_placeholder: placeholder.map(str::to_string),
            }),
            Layout::Inline { rows } => ReplyMarkup::Inline(InlineKeyboardMarkup {
                inline_keyboard: rows
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|(text, action)| InlineKeyboardButton {
                                text,
                                callback_data: action.callback_data().to_string(),
                            })
                            .collect()
                    })
                    .collect(),
            }),
            Layout::Remove => ReplyMarkup::Remove(ReplyKeyboardRemove {
                remove_keyboard: true,
            }),
        }
    }
}
