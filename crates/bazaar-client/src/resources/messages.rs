use bazaar_api::{AppError, Method};
use serde_json::json;
use uuid::Uuid;

use super::{CallSpec, ResourceClient, collect_page, parse_entity};
use crate::schema::parse_message;
use crate::types::{Message, Page};

const FETCH_CONTEXT: &str = "Fetching messages";
const SEND_CONTEXT: &str = "Sending message";

impl ResourceClient {
    pub async fn fetch_messages(&self, conversation_id: &str) -> Result<Page<Message>, AppError> {
        let result = self
            .execute(
                CallSpec::new(
                    Method::Get,
                    format!("/conversations/{conversation_id}/messages"),
                    FETCH_CONTEXT,
                    "FETCH_FAILED",
                )
                .with_max_retries(3),
            )
            .await
            .and_then(|data| collect_page(data, parse_message, FETCH_CONTEXT));

        if let Err(err) = &result {
            self.report_failure(err, "Loading messages");
        }
        result
    }

    /// Send a message into an existing conversation. The body is checked
    /// locally; a client transaction id lets the server deduplicate a
    /// resent request.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        body: &str,
    ) -> Result<Message, AppError> {
        if conversation_id.trim().is_empty() {
            return Err(AppError::precondition("conversation id is required"));
        }
        if body.trim().is_empty() {
            return Err(AppError::precondition("message body must not be empty"));
        }

        let payload = json!({
            "body": body,
            "client_txn_id": Uuid::new_v4().to_string(),
        });

        let result = self
            .execute(
                CallSpec::new(
                    Method::Post,
                    format!("/conversations/{conversation_id}/messages"),
                    SEND_CONTEXT,
                    "SEND_FAILED",
                )
                .with_body(payload),
            )
            .await
            .and_then(|data| parse_entity(&data, parse_message, SEND_CONTEXT));

        if let Err(err) = &result {
            self.report_failure(err, "Sending message");
        }
        result
    }
}
