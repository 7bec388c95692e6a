//! Detail-page field table
//!
//! The paths below are a versioned contract with the store page's
//! hydration shape. When the page shape drifts, only block ids and paths
//! here need updating, never the engine.

use super::{extract_fields, ExtractionResult, FieldSpec, Transform};
use crate::error::ParseError;
use crate::path::PathElem::{self, Index as I};
use crate::script_data::parse_script_data;

const fn field(
    name: &'static str,
    block: &'static str,
    path: &'static [PathElem],
) -> FieldSpec {
    FieldSpec {
        name,
        block,
        path,
        transform: None,
    }
}

const fn field_with(
    name: &'static str,
    block: &'static str,
    path: &'static [PathElem],
    transform: Transform,
) -> FieldSpec {
    FieldSpec {
        name,
        block,
        path,
        transform: Some(transform),
    }
}

pub static DETAILS_MAPPINGS: &[FieldSpec] = &[
    field("title", "ds:5", &[I(0), I(0), I(0)]),
    field_with(
        "description",
        "ds:5",
        &[I(0), I(10), I(0), I(1)],
        Transform::HtmlText,
    ),
    field("descriptionHTML", "ds:5", &[I(0), I(10), I(0), I(1)]),
    field("summary", "ds:5", &[I(0), I(10), I(1), I(1)]),
    field("installs", "ds:5", &[I(0), I(12), I(9), I(0)]),
    field_with(
        "minInstalls",
        "ds:5",
        &[I(0), I(12), I(9), I(0)],
        Transform::CleanInt,
    ),
    field("score", "ds:6", &[I(0), I(6), I(0), I(1)]),
    field("scoreText", "ds:6", &[I(0), I(6), I(0), I(0)]),
    field("ratings", "ds:6", &[I(0), I(6), I(2), I(1)]),
    field("reviews", "ds:6", &[I(0), I(6), I(3), I(1)]),
    field_with("histogram", "ds:6", &[I(0), I(6), I(1)], Transform::Histogram),
    field_with(
        "price",
        "ds:3",
        &[I(0), I(2), I(0), I(0), I(0), I(1), I(0), I(0)],
        Transform::PriceMicros,
    ),
    field_with(
        "free",
        "ds:3",
        &[I(0), I(2), I(0), I(0), I(0), I(1), I(0), I(0)],
        Transform::IsFree,
    ),
    field(
        "currency",
        "ds:3",
        &[I(0), I(2), I(0), I(0), I(0), I(1), I(0), I(1)],
    ),
    field_with(
        "priceText",
        "ds:3",
        &[I(0), I(2), I(0), I(0), I(0), I(1), I(0), I(2)],
        Transform::PriceText,
    ),
    field_with(
        "offersIAP",
        "ds:5",
        &[I(0), I(12), I(12), I(0)],
        Transform::Bool,
    ),
    field("IAPRange", "ds:5", &[I(0), I(12), I(12), I(0)]),
    field("size", "ds:8", &[I(0)]),
    field_with("androidVersion", "ds:8", &[I(2)], Transform::AndroidVersion),
    field("androidVersionText", "ds:8", &[I(2)]),
    field("developer", "ds:5", &[I(0), I(12), I(5), I(1)]),
    field_with(
        "developerId",
        "ds:5",
        &[I(0), I(12), I(5), I(5), I(4), I(2)],
        Transform::DeveloperId,
    ),
    field("developerEmail", "ds:5", &[I(0), I(12), I(5), I(2), I(0)]),
    field(
        "developerWebsite",
        "ds:5",
        &[I(0), I(12), I(5), I(3), I(5), I(2)],
    ),
    field("developerAddress", "ds:5", &[I(0), I(12), I(5), I(4), I(0)]),
    field("privacyPolicy", "ds:5", &[I(0), I(12), I(7), I(2)]),
    field("developerInternalID", "ds:5", &[I(0), I(12), I(5), I(0), I(0)]),
    field("genre", "ds:5", &[I(0), I(12), I(13), I(0), I(0)]),
    field("genreId", "ds:5", &[I(0), I(12), I(13), I(0), I(2)]),
    field("familyGenre", "ds:5", &[I(0), I(12), I(13), I(1), I(0)]),
    field("familyGenreId", "ds:5", &[I(0), I(12), I(13), I(1), I(2)]),
    field("icon", "ds:5", &[I(0), I(12), I(1), I(3), I(2)]),
    field("headerImage", "ds:5", &[I(0), I(12), I(2), I(3), I(2)]),
    field_with(
        "screenshots",
        "ds:5",
        &[I(0), I(12), I(0)],
        Transform::Screenshots,
    ),
    field("video", "ds:5", &[I(0), I(12), I(3), I(0), I(3), I(2)]),
    field("videoImage", "ds:5", &[I(0), I(12), I(3), I(1), I(3), I(2)]),
    field("contentRating", "ds:5", &[I(0), I(12), I(4), I(0)]),
    field(
        "contentRatingDescription",
        "ds:5",
        &[I(0), I(12), I(4), I(2), I(1)],
    ),
    field_with(
        "adSupported",
        "ds:5",
        &[I(0), I(12), I(14), I(0)],
        Transform::Bool,
    ),
    field("released", "ds:5", &[I(0), I(12), I(36)]),
    field_with(
        "updated",
        "ds:5",
        &[I(0), I(12), I(8), I(0)],
        Transform::TimestampMillis,
    ),
    field("version", "ds:8", &[I(1)]),
    field("recentChanges", "ds:5", &[I(0), I(12), I(6), I(1)]),
    field_with("comments", "ds:16", &[I(0)], Transform::Comments),
];

/// Parse a raw detail page and extract the full field table from it.
pub fn extract_details(page: &str) -> Result<ExtractionResult, ParseError> {
    let blocks = parse_script_data(page)?;
    Ok(extract_fields(&blocks, DETAILS_MAPPINGS))
}
