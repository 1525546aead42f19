//! Dynamic JSON argument bag for tool calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error returned when tool arguments are not a JSON object.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgumentParseError {
    /// The input is not valid JSON.
    #[error("error parsing parameters: {0}")]
    InvalidJson(String),

    /// The input is valid JSON but not an object.
    #[error("error parsing parameters: expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Arguments passed to a tool: a JSON object of arbitrarily nested values.
///
/// Tool schemas are server-defined, so no structure beyond "object with
/// string keys" is imposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Creates an empty argument object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw JSON text into an argument object.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentParseError::InvalidJson`] for malformed input and
    /// [`ArgumentParseError::NotAnObject`] when the top-level value is not an
    /// object.
    pub fn parse(raw: &str) -> Result<Self, ArgumentParseError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| ArgumentParseError::InvalidJson(err.to_string()))?;
        Self::try_from(value)
    }

    /// Inserts an argument, returning any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the arguments, returning the underlying JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for ToolArguments {
    type Error = ArgumentParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(ArgumentParseError::NotAnObject("null")),
            Value::Bool(_) => Err(ArgumentParseError::NotAnObject("boolean")),
            Value::Number(_) => Err(ArgumentParseError::NotAnObject("number")),
            Value::String(_) => Err(ArgumentParseError::NotAnObject("string")),
            Value::Array(_) => Err(ArgumentParseError::NotAnObject("array")),
        }
    }
}

impl From<Map<String, Value>> for ToolArguments {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}
