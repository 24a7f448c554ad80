//! Message tables for definition-conflict errors
//!
//! The validation tree never hard-codes wording. Each conflict has a
//! [`MessageKey`] with a stable token, and the caller hands in a
//! [`MessageTable`] that turns keys into text.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// A self-contradiction a schema node can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    /// `minLength` is greater than `maxLength`
    LengthRange,
    /// every `enum` member violates the string length bounds
    EnumLengthConflict,
    /// `minimum` is greater than `maximum`
    ValueRange,
    /// `exclusiveMinimum` is not below `exclusiveMaximum`
    ExclusiveRange,
    /// every `enum` member lies outside the numeric range
    EnumRangeConflict,
    /// `multipleOf` is zero or negative
    MultipleOfNotPositive,
    /// `minItems` is greater than `maxItems`
    ItemsRange,
    /// an `enum` member does not have the node's type
    EnumTypeConflict,
}

impl MessageKey {
    pub const ALL: [MessageKey; 8] = [
        MessageKey::LengthRange,
        MessageKey::EnumLengthConflict,
        MessageKey::ValueRange,
        MessageKey::ExclusiveRange,
        MessageKey::EnumRangeConflict,
        MessageKey::MultipleOfNotPositive,
        MessageKey::ItemsRange,
        MessageKey::EnumTypeConflict,
    ];

    /// Stable token, used as the error path in the validation tree
    pub fn token(&self) -> &'static str {
        match self {
            MessageKey::LengthRange => "lengthRange",
            MessageKey::EnumLengthConflict => "enumLengthConflict",
            MessageKey::ValueRange => "valueRange",
            MessageKey::ExclusiveRange => "exclusiveRange",
            MessageKey::EnumRangeConflict => "enumRangeConflict",
            MessageKey::MultipleOfNotPositive => "multipleOfNotPositive",
            MessageKey::ItemsRange => "itemsRange",
            MessageKey::EnumTypeConflict => "enumTypeConflict",
        }
    }

    /// Case-insensitive, since config sources may lowercase keys
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Maps conflict keys to user-facing text
pub trait MessageTable {
    fn message(&self, key: MessageKey) -> String;
}

impl<F> MessageTable for F
where
    F: Fn(MessageKey) -> String,
{
    fn message(&self, key: MessageKey) -> String {
        self(key)
    }
}

/// Built-in message languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

impl FromStr for Locale {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "de" | "de-de" | "de-at" | "de-ch" => Ok(Locale::De),
            other => Err(SchemaError::UnknownLocale(other.to_string())),
        }
    }
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::LengthRange => "Minimum length cannot be greater than maximum length",
        MessageKey::EnumLengthConflict => {
            "No allowed value satisfies the minimum and maximum length"
        }
        MessageKey::ValueRange => "Minimum cannot be greater than maximum",
        MessageKey::ExclusiveRange => "Exclusive minimum must be less than exclusive maximum",
        MessageKey::EnumRangeConflict => "No allowed value lies within the minimum and maximum",
        MessageKey::MultipleOfNotPositive => "Multiple of must be greater than zero",
        MessageKey::ItemsRange => "Minimum items cannot be greater than maximum items",
        MessageKey::EnumTypeConflict => "Allowed values must match the field type",
    }
}

fn german(key: MessageKey) -> &'static str {
    match key {
        MessageKey::LengthRange => "Die Mindestlänge darf nicht größer als die Maximallänge sein",
        MessageKey::EnumLengthConflict => {
            "Kein erlaubter Wert erfüllt die Mindest- und Maximallänge"
        }
        MessageKey::ValueRange => "Das Minimum darf nicht größer als das Maximum sein",
        MessageKey::ExclusiveRange => {
            "Das exklusive Minimum muss kleiner als das exklusive Maximum sein"
        }
        MessageKey::EnumRangeConflict => {
            "Kein erlaubter Wert liegt zwischen Minimum und Maximum"
        }
        MessageKey::MultipleOfNotPositive => "Das Vielfache muss größer als null sein",
        MessageKey::ItemsRange => {
            "Die Mindestanzahl an Elementen darf nicht größer als die Höchstanzahl sein"
        }
        MessageKey::EnumTypeConflict => "Erlaubte Werte müssen dem Feldtyp entsprechen",
    }
}

/// A locale's built-in table with per-token overrides on top
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    locale: Locale,
    overrides: HashMap<MessageKey, String>,
}

impl MessageCatalog {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            overrides: HashMap::new(),
        }
    }

    /// Build from a token-keyed override map. Unknown tokens are skipped.
    pub fn with_overrides(locale: Locale, overrides: &HashMap<String, String>) -> Self {
        let mut catalog = Self::new(locale);
        for (token, text) in overrides {
            match MessageKey::from_token(token) {
                Some(key) => {
                    catalog.overrides.insert(key, text.clone());
                }
                None => tracing::warn!(token = %token, "ignoring override for unknown message token"),
            }
        }
        catalog
    }

    pub fn set(&mut self, key: MessageKey, text: impl Into<String>) {
        self.overrides.insert(key, text.into());
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl MessageTable for MessageCatalog {
    fn message(&self, key: MessageKey) -> String {
        if let Some(text) = self.overrides.get(&key) {
            return text.clone();
        }
        match self.locale {
            Locale::En => english(key),
            Locale::De => german(key),
        }
        .to_string()
    }
}
