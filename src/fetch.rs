//! Detail-page fetch collaborator
//!
//! The extraction core is a pure text-in/record-out function; this module
//! is the thin I/O layer in front of it. It builds the details url,
//! performs one blocking GET (redirects are the agent's business, retries
//! and throttling the caller's), runs the extraction, and injects the
//! requested app id and the resolved url into the record.

use serde_json::Value;
use url::Url;

use crate::error::Error;
use crate::extract::{extract_details, ExtractionResult};

pub const DETAILS_URL: &str = "https://play.google.com/store/apps/details";

/// One detail-page request: which app, in which language and storefront.
#[derive(Debug, Clone)]
pub struct DetailsRequest {
    pub app_id: String,
    pub lang: String,
    pub country: String,
}

impl DetailsRequest {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            lang: "en".to_string(),
            country: "us".to_string(),
        }
    }

    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(DETAILS_URL)?;
        url.query_pairs_mut()
            .append_pair("id", &self.app_id)
            .append_pair("hl", &self.lang)
            .append_pair("gl", &self.country);
        Ok(url)
    }
}

/// Fetch a detail page and extract its field record.
///
/// `appId` and `url` are assigned here, after extraction; they are caller
/// metadata, not page data.
pub fn fetch_details(
    agent: &ureq::Agent,
    request: &DetailsRequest,
) -> Result<ExtractionResult, Error> {
    let url = request.url()?;
    let body = agent
        .get(url.as_str())
        .call()?
        .into_body()
        .read_to_string()?;

    let mut result = extract_details(&body)?;
    result
        .values
        .insert("appId".to_string(), Value::String(request.app_id.clone()));
    result
        .values
        .insert("url".to_string(), Value::String(url.to_string()));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_details_url() {
        let request = DetailsRequest::new("com.example.app");
        assert_eq!(
            request.url().unwrap().as_str(),
            "https://play.google.com/store/apps/details?id=com.example.app&hl=en&gl=us"
        );
    }

    #[test]
    fn request_defaults_to_en_us() {
        let request = DetailsRequest::new("com.example.app");
        assert_eq!(request.lang, "en");
        assert_eq!(request.country, "us");

        let localized = DetailsRequest {
            lang: "de".to_string(),
            country: "de".to_string(),
            ..DetailsRequest::new("com.example.app")
        };
        assert!(localized
            .url()
            .unwrap()
            .as_str()
            .ends_with("hl=de&gl=de"));
    }
}
