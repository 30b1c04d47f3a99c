//! Create-or-reuse resolution of buyer/seller/listing conversations.

use bazaar_api::{AppError, Method, NoticeKind};
use serde_json::json;

use crate::resources::{CallSpec, ResourceClient, RetryOn, parse_entity};
use crate::schema::parse_conversation;
use crate::types::Conversation;

const OPEN_CONTEXT: &str = "Opening conversation";

impl ResourceClient {
    /// Create (or have the server hand back) the conversation for a
    /// buyer/seller/listing key. Creates are only re-attempted on
    /// confirmed no-response failures; once the server has answered at
    /// all, retrying would risk acting twice.
    pub async fn create_conversation(
        &self,
        buyer_id: &str,
        seller_id: &str,
        listing_id: &str,
    ) -> Result<Conversation, AppError> {
        let body = json!({
            "buyer_id": buyer_id,
            "seller_id": seller_id,
            "listing_id": listing_id,
        });

        let result = self
            .execute(
                CallSpec::new(Method::Post, "/conversations", OPEN_CONTEXT, "CREATE_FAILED")
                    .with_body(body)
                    .retry_on(RetryOn::NetworkOnly),
            )
            .await
            .and_then(|data| parse_entity(&data, parse_conversation, OPEN_CONTEXT));

        if let Err(err) = &result {
            self.report_failure(err, "Opening conversation");
        }
        result
    }
}

/// Resolves the conversation a buyer should land in when contacting a
/// seller about a listing. Idempotent from the caller's perspective: one
/// `(buyer, seller, listing)` key resolves to one conversation id, a
/// server-side invariant this component relies on rather than enforces.
#[derive(Clone)]
pub struct ConversationResolver {
    client: ResourceClient,
}

impl ConversationResolver {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    /// Resolve to a conversation id, or a classified failure. Caller-side
    /// preconditions are rejected before any transport call; no error
    /// escapes unclassified.
    pub async fn resolve(
        &self,
        buyer_id: &str,
        seller_id: &str,
        listing_id: &str,
    ) -> Result<String, AppError> {
        if buyer_id.trim().is_empty() || seller_id.trim().is_empty() || listing_id.trim().is_empty()
        {
            return Err(self.reject("buyer, seller and listing are all required"));
        }
        if buyer_id == seller_id {
            return Err(self.reject("you cannot start a conversation with yourself"));
        }

        match self
            .client
            .create_conversation(buyer_id, seller_id, listing_id)
            .await
        {
            Ok(conversation) => Ok(conversation.id),
            // create_conversation already reported this failure; its
            // context marker keeps us from notifying twice.
            Err(err) => Err(err),
        }
    }

    fn reject(&self, message: &str) -> AppError {
        let err = AppError::precondition(message);
        self.client
            .notifier()
            .notify(NoticeKind::Error, &err.message);
        err.with_context(OPEN_CONTEXT)
    }
}
