use bazaar_api::{AppError, Method, NoticeKind};

use super::{CallSpec, ResourceClient, collect_page, parse_entity};
use crate::schema::{parse_listing, validate_draft, validate_patch};
use crate::types::{Listing, ListingDraft, ListingPatch};

const GET_CONTEXT: &str = "Fetching listing";
const SIMILAR_CONTEXT: &str = "Fetching similar listings";
const UPLOAD_CONTEXT: &str = "Publishing listing";
const UPDATE_CONTEXT: &str = "Updating listing";

impl ResourceClient {
    pub async fn get_listing(&self, listing_id: &str) -> Result<Listing, AppError> {
        let result = self
            .execute(
                CallSpec::new(
                    Method::Get,
                    format!("/listings/{listing_id}"),
                    GET_CONTEXT,
                    "FETCH_FAILED",
                )
                .with_max_retries(3),
            )
            .await
            .and_then(|data| parse_entity(&data, parse_listing, GET_CONTEXT));

        if let Err(err) = &result {
            self.report_failure(err, "Loading listing");
        }
        result
    }

    /// Listings similar to the one being viewed. Secondary UI: this
    /// operation never errors to its caller; any failure degrades to an
    /// empty list and malformed items are dropped item by item.
    pub async fn get_similar_listings(&self, category: &str, exclude_id: &str) -> Vec<Listing> {
        let result = self
            .execute(CallSpec::new(
                Method::Get,
                format!("/listings/similar?category={category}&exclude={exclude_id}"),
                SIMILAR_CONTEXT,
                "FETCH_FAILED",
            ))
            .await
            .and_then(|data| collect_page(data, parse_listing, SIMILAR_CONTEXT));

        match result {
            Ok(page) => {
                if page.skipped > 0 {
                    tracing::debug!(skipped = page.skipped, "dropped invalid similar listings");
                }
                page.items
            }
            Err(err) => {
                tracing::debug!(error = %err, "similar listings degraded to empty");
                Vec::new()
            }
        }
    }

    /// Publish a new listing. The draft is validated locally before any
    /// transport call; a rejected draft is never retried.
    pub async fn upload_listing(&self, draft: &ListingDraft) -> Result<Listing, AppError> {
        if let Err(failure) = validate_draft(draft) {
            let err = AppError::from(failure).with_context(UPLOAD_CONTEXT);
            self.report_failure(&err, "Publishing listing");
            return Err(err);
        }

        let body = match serde_json::to_value(draft) {
            Ok(body) => body,
            Err(e) => return Err(AppError::new(format!("could not encode listing: {e}"))),
        };

        let result = self
            .execute(
                CallSpec::new(Method::Post, "/listings", UPLOAD_CONTEXT, "UPLOAD_FAILED")
                    .with_body(body),
            )
            .await
            .and_then(|data| parse_entity(&data, parse_listing, UPLOAD_CONTEXT));

        match result {
            Ok(listing) => {
                self.notifier()
                    .notify(NoticeKind::Success, "Listing published");
                Ok(listing)
            }
            Err(err) => {
                self.report_failure(&err, "Publishing listing");
                Err(err)
            }
        }
    }

    /// Apply a partial update to an existing listing.
    pub async fn update_listing(
        &self,
        listing_id: &str,
        patch: &ListingPatch,
    ) -> Result<Listing, AppError> {
        if let Err(failure) = validate_patch(patch) {
            let err = AppError::from(failure).with_context(UPDATE_CONTEXT);
            self.report_failure(&err, "Updating listing");
            return Err(err);
        }

        let body = match serde_json::to_value(patch) {
            Ok(body) => body,
            Err(e) => return Err(AppError::new(format!("could not encode update: {e}"))),
        };

        let result = self
            .execute(
                CallSpec::new(
                    Method::Put,
                    format!("/listings/{listing_id}"),
                    UPDATE_CONTEXT,
                    "UPDATE_FAILED",
                )
                .with_body(body),
            )
            .await
            .and_then(|data| parse_entity(&data, parse_listing, UPDATE_CONTEXT));

        match result {
            Ok(listing) => {
                self.notifier().notify(NoticeKind::Success, "Listing updated");
                Ok(listing)
            }
            Err(err) => {
                self.report_failure(&err, "Updating listing");
                Err(err)
            }
        }
    }
}
