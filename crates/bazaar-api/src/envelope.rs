use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::transport::TransportResponse;

/// Wire-level response shape every endpoint answers with.
/// `success = false` is a failure regardless of transport status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Decode the envelope from a non-error response and yield its payload.
/// A declared failure or an undecodable body maps to an [`AppError`]
/// carrying `failure_code` and the response status.
pub fn unwrap_envelope(response: TransportResponse, failure_code: &str) -> Result<Value, AppError> {
    let status = response.status;
    let envelope: Envelope = serde_json::from_value(response.body).map_err(|e| {
        AppError::new(format!("malformed response envelope: {e}"))
            .with_code(failure_code)
            .with_status(status)
    })?;

    if !envelope.success {
        let message = envelope
            .message
            .unwrap_or_else(|| "request was not successful".to_string());
        return Err(AppError::new(message)
            .with_code(failure_code)
            .with_status(status));
    }

    Ok(envelope.data.unwrap_or(Value::Null))
}
