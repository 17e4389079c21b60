//! Action records: the immutable trace of every completed concept invocation.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field name → concrete value. BTreeMap keeps field order deterministic.
pub type Payload = BTreeMap<String, Value>;

/// Build a [`Payload`] from `field => json` pairs.
#[macro_export]
macro_rules! payload {
    () => { $crate::core::record::Payload::new() };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::core::record::Payload::new();
        $( map.insert($field.to_string(), ::serde_json::json!($value)); )+
        map
    }};
}

/// Identifies one operation of one concept, e.g. `Library.createDocument`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionName {
    pub concept: String,
    pub action: String,
}

impl ActionName {
    pub fn new(concept: impl Into<String>, action: impl Into<String>) -> Self {
        Self { concept: concept.into(), action: action.into() }
    }

    /// Parse `"Concept.action"` notation.
    pub fn parse(name: &str) -> Result<Self, ShapeError> {
        match name.split_once('.') {
            Some((concept, action)) if !concept.is_empty() && !action.is_empty() => {
                Ok(Self::new(concept, action))
            }
            _ => Err(ShapeError::BadActionName(name.to_string())),
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.concept, self.action)
    }
}

/// Outcome of a completed action: a success mapping or exactly `{ error }`.
/// The two shapes are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    Ok(Payload),
    Err(String),
}

impl ActionOutput {
    pub fn ok(fields: Payload) -> Self {
        ActionOutput::Ok(fields)
    }

    pub fn empty() -> Self {
        ActionOutput::Ok(Payload::new())
    }

    pub fn err(message: impl Into<String>) -> Self {
        ActionOutput::Err(message.into())
    }

    pub fn is_err(&self) -> bool {
        matches!(self, ActionOutput::Err(_))
    }

    /// The output viewed as a field mapping. Error outputs expose exactly
    /// one field, `error`.
    pub fn fields(&self) -> Payload {
        match self {
            ActionOutput::Ok(fields) => fields.clone(),
            ActionOutput::Err(message) => {
                let mut map = Payload::new();
                map.insert("error".to_string(), Value::String(message.clone()));
                map
            }
        }
    }

    /// Parse a raw JSON object from a transport boundary. An object that
    /// carries `error` alongside other fields, or a non-string `error`, is
    /// rejected rather than propagated as ambiguous state.
    pub fn from_value(value: Value) -> Result<Self, ShapeError> {
        let Value::Object(map) = value else {
            return Err(ShapeError::NotAnObject);
        };
        match map.get("error") {
            None => Ok(ActionOutput::Ok(object_to_payload(map))),
            Some(Value::String(message)) if map.len() == 1 => {
                Ok(ActionOutput::Err(message.clone()))
            }
            Some(Value::String(_)) => Err(ShapeError::MixedShape),
            Some(_) => Err(ShapeError::NonStringError),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields().into_iter().collect())
    }
}

fn object_to_payload(map: Map<String, Value>) -> Payload {
    map.into_iter().collect()
}

/// Violations of the record contract, detected at the transport boundary.
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("action output must be a JSON object")]
    NotAnObject,
    #[error("action output mixes an error field with success fields")]
    MixedShape,
    #[error("action output 'error' field must be a string")]
    NonStringError,
    #[error("'{0}' is not a Concept.action name")]
    BadActionName(String),
}

/// One completed invocation. Immutable once created; the append-only
/// sequence of records for a causal chain is what rules match against.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub action: ActionName,
    pub input: Payload,
    pub output: ActionOutput,
}

impl ActionRecord {
    pub fn new(action: ActionName, input: Payload, output: ActionOutput) -> Self {
        Self { action, input, output }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "action": self.action.to_string(),
            "input": Value::Object(self.input.clone().into_iter().collect()),
            "output": self.output.to_value(),
        })
    }
}
