//! Per-resource operations over the marketplace API.
//!
//! Every operation runs the same pipeline: validate input where the
//! operation writes, normalize the body to the wire convention, perform
//! the transport call under a per-operation retry policy, check the
//! response envelope, normalize the payload back, and validate it against
//! the entity schema. Failures of any step leave the client as an
//! [`AppError`].

pub mod favorites;
pub mod listings;
pub mod messages;
pub mod sellers;

use std::sync::Arc;
use std::time::Duration;

use bazaar_api::{
    AppError, Method, NoticeKind, Notifier, RetryPolicy, Transport, TransportRequest,
    TransportResponse, ValidationFailure, keys_to_internal, keys_to_wire, retry_operation,
    unwrap_envelope,
};
use serde_json::Value;

use crate::types::Page;

/// Which failure classes a call may be re-attempted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RetryOn {
    /// Network failures and 5xx responses (the default).
    NetworkOrServer,
    /// Only confirmed no-response failures. Used for creates, where a
    /// response of any kind means the server may already have acted.
    NetworkOnly,
}

pub(crate) struct CallSpec {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub context: &'static str,
    pub failure_code: &'static str,
    pub max_retries: u32,
    pub retry_on: RetryOn,
}

impl CallSpec {
    pub(crate) fn new(
        method: Method,
        path: impl Into<String>,
        context: &'static str,
        failure_code: &'static str,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            context,
            failure_code,
            max_retries: 2,
            retry_on: RetryOn::NetworkOrServer,
        }
    }

    pub(crate) fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub(crate) fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub(crate) fn retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }
}

#[derive(Clone)]
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    base_delay: Duration,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            base_delay: Duration::from_millis(300),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// The canonical call pipeline shared by every operation.
    pub(crate) async fn execute(&self, call: CallSpec) -> Result<Value, AppError> {
        let mut request = TransportRequest::new(call.method, &call.path);
        if let Some(body) = call.body {
            request = request.with_body(keys_to_wire(body));
        }

        let notifier = Arc::clone(&self.notifier);
        let context = call.context;
        let mut policy = RetryPolicy::new(call.max_retries, self.base_delay)
            .with_context(call.context)
            .with_on_retry(move |attempt, err| {
                tracing::debug!(context, attempt, error = %err, "retrying request");
                notifier.notify(NoticeKind::Info, &format!("{context}: retrying..."));
            });
        if call.retry_on == RetryOn::NetworkOnly {
            policy = policy.with_predicate(|err| err.is_network_error);
        }

        let failure_code = call.failure_code;
        let response = retry_operation(
            || {
                let transport = Arc::clone(&self.transport);
                let request = request.clone();
                async move {
                    let response = transport.perform(request).await.map_err(AppError::from)?;
                    if response.status >= 400 {
                        return Err(error_from_status(response, failure_code));
                    }
                    Ok(response)
                }
            },
            &policy,
        )
        .await?;

        let data = unwrap_envelope(response, call.failure_code)
            .map_err(|err| err.with_context(call.context))?;
        Ok(keys_to_internal(data))
    }

    /// Emit the user-facing notice for a failed operation.
    pub(crate) fn report_failure(&self, err: &AppError, action: &str) {
        self.notifier
            .notify(NoticeKind::Error, &err.action_message(action));
    }
}

/// Build the error for a response the server answered with an error status.
/// The envelope message is used when the body carries one.
fn error_from_status(response: TransportResponse, failure_code: &str) -> AppError {
    let message = response
        .body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", response.status));
    AppError::new(message)
        .with_code(failure_code)
        .with_status(response.status)
}

/// Validate a list payload item by item. Items that fail validation are
/// skipped and counted, never failing the whole batch.
pub(crate) fn collect_page<T, F>(data: Value, parse: F, context: &str) -> Result<Page<T>, AppError>
where
    F: Fn(&Value) -> Result<T, ValidationFailure>,
{
    let Value::Array(raw_items) = data else {
        return Err(AppError::from(ValidationFailure::new(vec![
            bazaar_api::FieldError::new("", "expected a list"),
        ]))
        .with_context(context));
    };

    let mut items = Vec::with_capacity(raw_items.len());
    let mut skipped = 0usize;
    for raw in &raw_items {
        match parse(raw) {
            Ok(item) => items.push(item),
            Err(failure) => {
                skipped += 1;
                tracing::debug!(context, error = %failure, "skipping item that failed validation");
            }
        }
    }
    Ok(Page { items, skipped })
}

/// Validate a single-entity payload, attaching the operation context to a
/// rejection.
pub(crate) fn parse_entity<T, F>(data: &Value, parse: F, context: &'static str) -> Result<T, AppError>
where
    F: Fn(&Value) -> Result<T, ValidationFailure>,
{
    parse(data).map_err(|failure| AppError::from(failure).with_context(context))
}
