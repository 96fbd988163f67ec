// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wire protocol for the engine command channel.
//!
//! The engine speaks newline-delimited JSON: one object per line in each
//! direction, no length prefix. Outbound objects carry a `command` key plus
//! flat parameters; inbound objects carry at least a `status` key. Anything
//! on stdout that does not parse as a response is diagnostic noise and is
//! dropped by the reader.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single request to the engine.
///
/// Commands are built once, encoded, and discarded; parameter order is
/// irrelevant on the wire.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    params: Map<String, Value>,
}

impl Command {
    /// Create a command with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Attach a parameter.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The operation name (the `command` key on the wire).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serialize to one line of compact JSON, without the trailing newline.
    ///
    /// Compact serialization never emits embedded newlines, which keeps the
    /// one-value-per-line framing intact.
    pub fn encode(&self) -> String {
        let mut object = Map::with_capacity(self.params.len() + 1);
        object.insert("command".to_string(), Value::String(self.name.clone()));
        for (key, value) in &self.params {
            object.insert(key.clone(), value.clone());
        }
        // Serializing a Map<String, Value> cannot fail.
        serde_json::to_string(&Value::Object(object)).unwrap_or_default()
    }
}

impl TryFrom<Value> for Command {
    type Error = serde_json::Error;

    /// Build a command from a raw JSON object containing a `command` key.
    /// Used by the interactive shell, where the user types wire-level JSON.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        use serde::de::Error as _;

        let Value::Object(mut object) = value else {
            return Err(serde_json::Error::custom("expected a JSON object"));
        };
        let name = match object.remove("command") {
            Some(Value::String(name)) => name,
            _ => return Err(serde_json::Error::custom("missing \"command\" key")),
        };
        Ok(Self {
            name,
            params: object,
        })
    }
}

/// Response status vocabulary.
///
/// The distilled protocol is `success`/`error`/`ready`, but the engine
/// reports failures with more specific names (`not_found`,
/// `invalid_params`, ...). Every status other than [`Status::Success`] and
/// [`Status::Ready`] is error-family business data, not a channel fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
    /// Startup handshake, emitted once before any command is read. Filtered
    /// by the gateway, never delivered as the reply to a real command.
    Ready,
    InvalidCommand,
    InvalidParams,
    NotFound,
    AlreadyExists,
    OperationFailed,
    /// Forward compatibility with statuses this client does not know.
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Success => "success",
            Status::Error => "error",
            Status::Ready => "ready",
            Status::InvalidCommand => "invalid_command",
            Status::InvalidParams => "invalid_params",
            Status::NotFound => "not_found",
            Status::AlreadyExists => "already_exists",
            Status::OperationFailed => "operation_failed",
            Status::Other(name) => name,
        };
        f.write_str(name)
    }
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Status::Ready)
    }

    /// Whether the engine reported a failure for this operation.
    pub fn is_err(&self) -> bool {
        !matches!(self, Status::Success | Status::Ready)
    }
}

/// A single reply from the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    /// Human-readable diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operation payload. May be a nested JSON value or a string holding
    /// further encoded JSON; use [`Response::data_value`] to normalize.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Engine version, carried on the `ready` handshake and `get_version`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Response {
    /// A locally fabricated error response, used by the reader when the
    /// channel breaks underneath a waiting caller.
    pub fn synthetic_error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            data: None,
            version: None,
        }
    }

    /// The payload with string-encoded JSON unwrapped.
    ///
    /// Some engine replies embed the payload directly, others return it as a
    /// string containing encoded JSON. A string that does not parse is
    /// returned as-is.
    pub fn data_value(&self) -> Option<Value> {
        match &self.data {
            Some(Value::String(raw)) => {
                Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())))
            }
            Some(value) => Some(value.clone()),
            None => None,
        }
    }

    /// Whether the engine reported success.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Decode one line of engine stdout.
///
/// Returns `None` for anything that is not a well-formed response object:
/// the engine interleaves debug prints with protocol output, and those lines
/// are noise, not errors.
pub fn decode_line(line: &str) -> Option<Response> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
