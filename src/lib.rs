//! Script-data extraction for Google Play detail pages
//!
//! A detail page embeds its client-side hydration data as inline
//! `AF_initDataCallback({key: 'ds:5', data: [...], ...})` script blocks.
//! This crate:
//! - parses those blocks into a map of generic values keyed by block id
//! - resolves a declarative field table (key/index paths plus transforms)
//!   against that map into a flat record
//! - degrades missing or drifted fields to null instead of failing, so one
//!   page-shape change does not break unrelated fields

pub mod error;
pub mod extract;
pub mod fetch;
pub mod path;
pub mod script_data;

pub use error::{Error, ParseError};
pub use extract::{
    extract_details, extract_fields, Diagnostic, ExtractionResult, FieldSpec, Transform,
    TransformError, DETAILS_MAPPINGS,
};
pub use fetch::{fetch_details, DetailsRequest};
pub use path::{resolve, PathElem};
pub use script_data::parse_script_data;
