use crate::runtime_values::Value;
use crate::storage::{StorageBackend, keys};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
}

impl DialogKind {
    pub const ALL: [Self; 3] = [Self::Alert, Self::Confirm, Self::Prompt];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Confirm => "confirm",
            Self::Prompt => "prompt",
        }
    }

    pub(crate) fn record_key(self) -> &'static str {
        match self {
            Self::Alert => keys::ALERTS,
            Self::Confirm => keys::CONFIRMS,
            Self::Prompt => keys::PROMPTS,
        }
    }

    /// Slot and default for kinds that return a queued response.
    pub(crate) fn pending_slot(self) -> Option<(&'static str, Value)> {
        match self {
            Self::Alert => None,
            Self::Confirm => Some((keys::NEXT_CONFIRM, Value::Bool(true))),
            Self::Prompt => Some((keys::NEXT_PROMPT, Value::String(String::new()))),
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn reset_record(backend: &dyn StorageBackend, kind: DialogKind) {
    backend.set(kind.record_key(), Value::List(Vec::new()));
}

pub(crate) fn read_record(backend: &dyn StorageBackend, kind: DialogKind) -> Vec<String> {
    backend
        .get(kind.record_key())
        .and_then(|value| value.as_list().map(<[String]>::to_vec))
        .unwrap_or_default()
}

pub(crate) fn append_record(backend: &dyn StorageBackend, kind: DialogKind, message: String) {
    let mut messages = read_record(backend, kind);
    messages.push(message);
    backend.set(kind.record_key(), Value::List(messages));
}

/// Consume-once response slots for `confirm` and `prompt`.
pub(crate) struct ResponseQueue;

impl ResponseQueue {
    /// Writes the default unless a value was queued before install.
    pub(crate) fn seed_default(backend: &dyn StorageBackend, kind: DialogKind) {
        if let Some((key, default)) = kind.pending_slot() {
            if !backend.has(key) {
                backend.set(key, default);
            }
        }
    }

    pub(crate) fn enqueue(backend: &dyn StorageBackend, kind: DialogKind, value: Value) {
        if let Some((key, _)) = kind.pending_slot() {
            backend.set(key, value);
        }
    }

    /// Returns the queued value and rewrites the slot with the default.
    pub(crate) fn consume(backend: &dyn StorageBackend, kind: DialogKind) -> Option<Value> {
        let (key, default) = kind.pending_slot()?;
        let value = backend.get(key).unwrap_or_else(|| default.clone());
        backend.set(key, default);
        Some(value)
    }

    pub(crate) fn consume_confirm(backend: &dyn StorageBackend) -> bool {
        Self::consume(backend, DialogKind::Confirm)
            .and_then(|value| value.as_bool())
            .unwrap_or(true)
    }

    /// `null` in the slot answers the prompt with cancel.
    pub(crate) fn consume_prompt(backend: &dyn StorageBackend) -> Option<String> {
        match Self::consume(backend, DialogKind::Prompt) {
            Some(Value::Null) => None,
            value => Some(
                value
                    .as_ref()
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
        }
    }
}
