use bazaar_api::{AppError, Method};

use super::{CallSpec, ResourceClient, collect_page, parse_entity};
use crate::schema::{parse_review, parse_seller};
use crate::types::{Page, Review, Seller};

const SELLER_CONTEXT: &str = "Fetching seller";
const REVIEWS_CONTEXT: &str = "Fetching seller reviews";

impl ResourceClient {
    pub async fn get_seller(&self, seller_id: &str) -> Result<Seller, AppError> {
        let result = self
            .execute(
                CallSpec::new(
                    Method::Get,
                    format!("/sellers/{seller_id}"),
                    SELLER_CONTEXT,
                    "FETCH_FAILED",
                )
                .with_max_retries(3),
            )
            .await
            .and_then(|data| parse_entity(&data, parse_seller, SELLER_CONTEXT));

        if let Err(err) = &result {
            self.report_failure(err, "Loading seller");
        }
        result
    }

    /// Reviews left for a seller. Batch-tolerant: invalid reviews are
    /// skipped and counted.
    pub async fn get_seller_reviews(&self, seller_id: &str) -> Result<Page<Review>, AppError> {
        let result = self
            .execute(
                CallSpec::new(
                    Method::Get,
                    format!("/sellers/{seller_id}/reviews"),
                    REVIEWS_CONTEXT,
                    "FETCH_FAILED",
                )
                .with_max_retries(3),
            )
            .await
            .and_then(|data| collect_page(data, parse_review, REVIEWS_CONTEXT));

        if let Err(err) = &result {
            self.report_failure(err, "Loading reviews");
        }
        result
    }
}
