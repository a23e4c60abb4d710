//! Request definitions
//!
//! Represents packets sent from clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Actions a client can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Get,
    Set,
    Delete,
}

impl Action {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Set => "set",
            Action::Delete => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = DecodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "get" => Ok(Action::Get),
            "set" => Ok(Action::Set),
            "delete" => Ok(Action::Delete),
            other => Err(DecodeError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Get a value by key
    Get { key: String },

    /// Set a key-value pair
    Set { key: String, value: String },

    /// Delete a key
    Delete { key: String },
}

impl Request {
    pub fn get(key: impl Into<String>) -> Self {
        Request::Get { key: key.into() }
    }

    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Request::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Request::Delete { key: key.into() }
    }

    /// Get the action of this request
    pub fn action(&self) -> Action {
        match self {
            Request::Get { .. } => Action::Get,
            Request::Set { .. } => Action::Set,
            Request::Delete { .. } => Action::Delete,
        }
    }

    /// Get the key this request addresses
    pub fn key(&self) -> &str {
        match self {
            Request::Get { key } | Request::Set { key, .. } | Request::Delete { key } => key,
        }
    }

    /// Convert to the record that goes on the wire
    pub fn to_raw(&self) -> RawRequest {
        let value = match self {
            Request::Set { value, .. } => Some(value.clone()),
            _ => None,
        };
        RawRequest {
            action: self.action().as_str().to_string(),
            key: self.key().to_string(),
            value,
        }
    }
}

/// The request record exactly as it travels on the wire
///
/// Nothing about it is validated: the action may be any string and the
/// key may be empty. Use `Request::try_from` to get a packet the server
/// will act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    pub action: String,
    pub key: String,
    pub value: Option<String>,
}

impl RawRequest {
    pub fn new(action: impl Into<String>, key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            action: action.into(),
            key: key.into(),
            value,
        }
    }
}

impl TryFrom<RawRequest> for Request {
    type Error = DecodeError;

    fn try_from(raw: RawRequest) -> std::result::Result<Self, Self::Error> {
        let action: Action = raw.action.parse()?;
        if raw.key.is_empty() {
            return Err(DecodeError::EmptyKey);
        }

        // A value on get/delete is tolerated and dropped
        match action {
            Action::Get => Ok(Request::Get { key: raw.key }),
            Action::Delete => Ok(Request::Delete { key: raw.key }),
            Action::Set => match raw.value {
                Some(value) => Ok(Request::Set {
                    key: raw.key,
                    value,
                }),
                None => Err(DecodeError::MissingValue),
            },
        }
    }
}
