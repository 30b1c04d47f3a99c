use bazaar_api::{AppError, Method, NoticeKind};

use super::{CallSpec, ResourceClient, collect_page};
use crate::schema::parse_listing;
use crate::types::{Listing, Page};

const FETCH_CONTEXT: &str = "Fetching favorites";
const TOGGLE_CONTEXT: &str = "Toggling favorite";

impl ResourceClient {
    /// Fetch the caller's favorited listings. Feeds primary UI, so the
    /// retry budget is generous and a loading notice is shown for the
    /// duration of the call. Items that fail validation are skipped and
    /// counted, not fatal.
    pub async fn fetch_favorites(&self) -> Result<Page<Listing>, AppError> {
        let loading = self
            .notifier()
            .notify(NoticeKind::Info, "Loading favorites...");

        let result = self
            .execute(
                CallSpec::new(Method::Get, "/favorites", FETCH_CONTEXT, "FETCH_FAILED")
                    .with_max_retries(3),
            )
            .await
            .and_then(|data| collect_page(data, parse_listing, FETCH_CONTEXT));

        self.notifier().dismiss(loading);
        match result {
            Ok(page) => {
                if page.skipped > 0 {
                    tracing::warn!(skipped = page.skipped, "favorites response had invalid items");
                }
                Ok(page)
            }
            Err(err) => {
                self.report_failure(&err, "Loading favorites");
                Err(err)
            }
        }
    }

    /// Flip the favorite state of a listing and resolve to the new state.
    pub async fn toggle_favorite(
        &self,
        listing_id: &str,
        currently_favorite: bool,
    ) -> Result<bool, AppError> {
        if listing_id.trim().is_empty() {
            let err = AppError::precondition("listing id is required").with_context(TOGGLE_CONTEXT);
            self.report_failure(&err, "Updating favorites");
            return Err(err);
        }

        let method = if currently_favorite {
            Method::Delete
        } else {
            Method::Post
        };
        let result = self
            .execute(CallSpec::new(
                method,
                format!("/favorites/{listing_id}"),
                TOGGLE_CONTEXT,
                "UPDATE_FAILED",
            ))
            .await;

        match result {
            Ok(_) => {
                let message = if currently_favorite {
                    "Removed from favorites"
                } else {
                    "Added to favorites"
                };
                self.notifier().notify(NoticeKind::Success, message);
                Ok(!currently_favorite)
            }
            Err(err) => {
                self.report_failure(&err, "Updating favorites");
                Err(err)
            }
        }
    }
}
