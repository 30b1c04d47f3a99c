//! Per-entity validators for payloads coming off the wire.
//!
//! Validators run after key normalization and collect every field problem
//! instead of stopping at the first, so a rejected payload reports the
//! whole shape of what was wrong.

use bazaar_api::{FieldError, ValidationFailure};
use serde_json::Value;

use crate::types::{Conversation, Listing, ListingDraft, ListingPatch, Message, Review, Seller};

fn require_string(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match value.get(path).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        Some(_) => {
            errors.push(FieldError::new(path, "must not be empty"));
            None
        }
        None => {
            errors.push(FieldError::new(path, "is required"));
            None
        }
    }
}

fn optional_string(value: &Value, path: &str) -> Option<String> {
    value
        .get(path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn require_price(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<i64> {
    match value.get(path).and_then(Value::as_i64) {
        Some(cents) if cents >= 0 => Some(cents),
        Some(_) => {
            errors.push(FieldError::new(path, "must be non-negative"));
            None
        }
        None => {
            errors.push(FieldError::new(path, "is required"));
            None
        }
    }
}

pub fn parse_listing(value: &Value) -> Result<Listing, ValidationFailure> {
    let mut errors = Vec::new();
    let id = require_string(value, "id", &mut errors);
    let title = require_string(value, "title", &mut errors);
    let category = require_string(value, "category", &mut errors);
    let seller_id = require_string(value, "seller_id", &mut errors);
    let price_cents = require_price(value, "price_cents", &mut errors);
    let description = optional_string(value, "description").unwrap_or_default();
    let image_url = optional_string(value, "image_url");
    let is_favorite = value
        .get("is_favorite")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match (id, title, category, seller_id, price_cents) {
        (Some(id), Some(title), Some(category), Some(seller_id), Some(price_cents))
            if errors.is_empty() =>
        {
            Ok(Listing {
                id,
                title,
                description,
                category,
                price_cents,
                image_url,
                seller_id,
                is_favorite,
            })
        }
        _ => Err(ValidationFailure::new(errors)),
    }
}

pub fn parse_seller(value: &Value) -> Result<Seller, ValidationFailure> {
    let mut errors = Vec::new();
    let id = require_string(value, "id", &mut errors);
    let display_name = require_string(value, "display_name", &mut errors);
    let bio = optional_string(value, "bio");
    let rating = match value.get("rating").and_then(Value::as_f64) {
        Some(r) if (0.0..=5.0).contains(&r) => Some(r),
        Some(_) => {
            errors.push(FieldError::new("rating", "must be between 0 and 5"));
            None
        }
        None => None,
    };

    match (id, display_name) {
        (Some(id), Some(display_name)) if errors.is_empty() => Ok(Seller {
            id,
            display_name,
            bio,
            rating,
        }),
        _ => Err(ValidationFailure::new(errors)),
    }
}

pub fn parse_review(value: &Value) -> Result<Review, ValidationFailure> {
    let mut errors = Vec::new();
    let id = require_string(value, "id", &mut errors);
    let seller_id = require_string(value, "seller_id", &mut errors);
    let author_id = require_string(value, "author_id", &mut errors);
    let rating = match value.get("rating").and_then(Value::as_u64) {
        Some(r) if (1..=5).contains(&r) => Some(r as u8),
        Some(_) => {
            errors.push(FieldError::new("rating", "must be between 1 and 5"));
            None
        }
        None => {
            errors.push(FieldError::new("rating", "is required"));
            None
        }
    };
    let comment = optional_string(value, "comment");

    match (id, seller_id, author_id, rating) {
        (Some(id), Some(seller_id), Some(author_id), Some(rating)) if errors.is_empty() => {
            Ok(Review {
                id,
                seller_id,
                author_id,
                rating,
                comment,
            })
        }
        _ => Err(ValidationFailure::new(errors)),
    }
}

pub fn parse_message(value: &Value) -> Result<Message, ValidationFailure> {
    let mut errors = Vec::new();
    let id = require_string(value, "id", &mut errors);
    let conversation_id = require_string(value, "conversation_id", &mut errors);
    let sender_id = require_string(value, "sender_id", &mut errors);
    let body = require_string(value, "body", &mut errors);
    let sent_at = require_string(value, "sent_at", &mut errors);

    match (id, conversation_id, sender_id, body, sent_at) {
        (Some(id), Some(conversation_id), Some(sender_id), Some(body), Some(sent_at))
            if errors.is_empty() =>
        {
            Ok(Message {
                id,
                conversation_id,
                sender_id,
                body,
                sent_at,
            })
        }
        _ => Err(ValidationFailure::new(errors)),
    }
}

pub fn parse_conversation(value: &Value) -> Result<Conversation, ValidationFailure> {
    let mut errors = Vec::new();
    let id = require_string(value, "id", &mut errors);
    let buyer_id = require_string(value, "buyer_id", &mut errors);
    let seller_id = require_string(value, "seller_id", &mut errors);
    let listing_id = require_string(value, "listing_id", &mut errors);

    match (id, buyer_id, seller_id, listing_id) {
        (Some(id), Some(buyer_id), Some(seller_id), Some(listing_id)) if errors.is_empty() => {
            Ok(Conversation {
                id,
                buyer_id,
                seller_id,
                listing_id,
            })
        }
        _ => Err(ValidationFailure::new(errors)),
    }
}

/// Local validation for a new listing, run before any transport call.
pub fn validate_draft(draft: &ListingDraft) -> Result<(), ValidationFailure> {
    let mut errors = Vec::new();
    if draft.title.trim().is_empty() {
        errors.push(FieldError::new("title", "must not be empty"));
    }
    if draft.category.trim().is_empty() {
        errors.push(FieldError::new("category", "must not be empty"));
    }
    if draft.price_cents < 0 {
        errors.push(FieldError::new("price_cents", "must be non-negative"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::new(errors))
    }
}

/// Local validation for a listing update, run before any transport call.
pub fn validate_patch(patch: &ListingPatch) -> Result<(), ValidationFailure> {
    let mut errors = Vec::new();
    if patch.title.is_none()
        && patch.description.is_none()
        && patch.category.is_none()
        && patch.price_cents.is_none()
        && patch.image_url.is_none()
    {
        errors.push(FieldError::new("", "no fields to update"));
    }
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be empty"));
        }
    }
    if let Some(cents) = patch.price_cents {
        if cents < 0 {
            errors.push(FieldError::new("price_cents", "must be non-negative"));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::new(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_listing() -> Value {
        json!({
            "id": "l1",
            "title": "Desk lamp",
            "description": "Barely used",
            "category": "furniture",
            "price_cents": 1500,
            "seller_id": "s1",
            "is_favorite": true,
        })
    }

    #[test]
    fn parses_a_valid_listing() {
        let listing = parse_listing(&valid_listing()).expect("valid listing");
        assert_eq!(listing.id, "l1");
        assert_eq!(listing.price_cents, 1500);
        assert!(listing.is_favorite);
        assert_eq!(listing.image_url, None);
    }

    #[test]
    fn collects_every_field_problem() {
        let failure = parse_listing(&json!({
            "id": "l1",
            "title": "",
            "category": "furniture",
            "price_cents": -5,
            "seller_id": "s1",
        }))
        .expect_err("invalid listing");

        let paths: Vec<&str> = failure.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["title", "price_cents"]);
    }

    #[test]
    fn rejects_out_of_range_seller_rating() {
        let failure = parse_seller(&json!({
            "id": "s1",
            "display_name": "Ada",
            "rating": 9.5,
        }))
        .expect_err("invalid seller");
        assert_eq!(failure.errors[0].path, "rating");
    }

    #[test]
    fn review_rating_bounds_are_inclusive() {
        let review = parse_review(&json!({
            "id": "r1",
            "seller_id": "s1",
            "author_id": "u1",
            "rating": 5,
        }))
        .expect("valid review");
        assert_eq!(review.rating, 5);
        assert_eq!(review.comment, None);
    }

    #[test]
    fn draft_validation_reports_all_problems_locally() {
        let failure = validate_draft(&ListingDraft {
            title: "  ".to_string(),
            description: String::new(),
            category: String::new(),
            price_cents: -1,
            image_url: None,
        })
        .expect_err("invalid draft");
        assert_eq!(failure.errors.len(), 3);
    }

    #[test]
    fn empty_patch_is_rejected() {
        let failure = validate_patch(&ListingPatch::default()).expect_err("empty patch");
        assert_eq!(failure.errors[0].message, "no fields to update");
    }
}
