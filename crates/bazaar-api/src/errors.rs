use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad failure classification derived from an [`AppError`]'s fields.
///
/// Only `Network` and `Server` failures are safe to retry; everything else
/// terminates a call on the first attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureClass {
    /// The request was sent but no response came back (timeout, connection
    /// reset, DNS).
    Network,
    /// The server answered with a 5xx status.
    Server,
    /// The server rejected the request (4xx, or an envelope-declared
    /// failure on a 2xx response).
    Client,
    /// A payload failed schema validation on either side of the wire.
    Validation,
    /// A caller-side precondition failed before any transport call.
    User,
}

/// Normalized error value for every failure that crosses a resource-client
/// boundary. Immutable after construction; composing callers read it, they
/// never mutate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct AppError {
    /// Human-readable summary.
    pub message: String,
    /// Machine-readable failure kind, e.g. `FETCH_FAILED`.
    pub code: Option<String>,
    /// Transport status code when a response was received.
    pub status: Option<u16>,
    /// Logical operation name, e.g. "Fetching favorites". Read by composing
    /// callers to suppress duplicate user-facing notifications.
    pub context: Option<String>,
    /// True when the failure occurred before any response was received.
    pub is_network_error: bool,
    /// Field path -> messages, populated when the failure came from schema
    /// validation.
    pub validation_errors: Option<BTreeMap<String, Vec<String>>>,
}

impl AppError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
            context: None,
            is_network_error: false,
            validation_errors: None,
        }
    }

    /// Failure with no response received.
    pub fn network(message: impl Into<String>) -> Self {
        let mut err = Self::new(message);
        err.is_network_error = true;
        err
    }

    /// Caller-side precondition violation, rejected before any transport
    /// call.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn class(&self) -> FailureClass {
        if self.validation_errors.is_some() {
            return FailureClass::Validation;
        }
        if self.is_network_error {
            return FailureClass::Network;
        }
        match self.status {
            Some(status) if status >= 500 => FailureClass::Server,
            Some(_) => FailureClass::Client,
            None => FailureClass::User,
        }
    }

    /// Render `validation_errors` as one human-readable line.
    pub fn flattened_validation(&self) -> Option<String> {
        let errors = self.validation_errors.as_ref()?;
        let parts: Vec<String> = errors
            .iter()
            .flat_map(|(path, messages)| {
                messages.iter().map(move |message| {
                    if path.is_empty() {
                        message.clone()
                    } else {
                        format!("{path}: {message}")
                    }
                })
            })
            .collect();
        Some(parts.join("; "))
    }

    /// User-facing message for a failed action, refined by what is known
    /// about the failure.
    pub fn action_message(&self, action: &str) -> String {
        if let Some(flattened) = self.flattened_validation() {
            return format!("{action} failed: {flattened}");
        }
        match self.status {
            Some(404) => format!("{action} failed: not found"),
            Some(403) => format!("{action} failed: you are not allowed to do that"),
            _ if self.is_network_error => {
                format!("{action} failed: network error, please try again")
            }
            _ => format!("{action} failed: {}", self.message),
        }
    }
}

/// One field-level problem reported by an entity validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Schema rejection carrying every field problem, not just the first.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("validation failed: {}", self.summary())]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| {
                if e.path.is_empty() {
                    e.message.clone()
                } else {
                    format!("{}: {}", e.path, e.message)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for field in &failure.errors {
            grouped
                .entry(field.path.clone())
                .or_default()
                .push(field.message.clone());
        }
        let mut err = AppError::new(failure.summary());
        err.validation_errors = Some(grouped);
        err
    }
}
