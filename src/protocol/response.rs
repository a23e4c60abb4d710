//! Response definitions
//!
//! Represents responses to clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Error,
    NotFound,
}

impl Status {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Error => "error",
            Status::NotFound => "not_found",
        }
    }
}

impl FromStr for Status {
    type Err = DecodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Status::Ok),
            "error" => Ok(Status::Error),
            "not_found" => Ok(Status::NotFound),
            other => Err(DecodeError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Value, only ever present on an `Ok` answer to a get
    pub value: Option<String>,
}

impl Response {
    /// Create an OK response with optional value
    pub fn ok(value: Option<String>) -> Self {
        Self {
            status: Status::Ok,
            value,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            value: None,
        }
    }

    /// Create an ERROR response
    pub fn error() -> Self {
        Self {
            status: Status::Error,
            value: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub(crate) fn to_raw(&self) -> RawResponse {
        RawResponse {
            status: self.status.as_str().to_string(),
            value: self.value.clone(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {}", self.status.as_str().to_uppercase(), value),
            None => write!(f, "{}", self.status.as_str().to_uppercase()),
        }
    }
}

/// Response record as it travels on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    pub status: String,
    pub value: Option<String>,
}

impl TryFrom<RawResponse> for Response {
    type Error = DecodeError;

    fn try_from(raw: RawResponse) -> std::result::Result<Self, Self::Error> {
        let status: Status = raw.status.parse()?;
        if status != Status::Ok && raw.value.is_some() {
            return Err(DecodeError::UnexpectedValue(status.as_str()));
        }
        Ok(Response {
            status,
            value: raw.value,
        })
    }
}
