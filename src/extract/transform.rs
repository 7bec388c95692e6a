//! Post-processing transforms applied to resolved field values
//!
//! A fixed catalog of small pure functions, resolved by name so the field
//! table stays inspectable data. Every transform receives the resolved
//! value or `None` when the path was absent; a handful substitute a
//! documented default for absent input (zero counts, "Free", empty lists),
//! the rest propagate absence or report an error the extractor turns into
//! a diagnostic.

use scraper::Html;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::path::{resolve, PathElem};

/// Field-local transform failure. Never fatal to the extraction call.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransformError(String);

impl TransformError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Strip non-digit characters (thousands separators, "+") and parse.
    CleanInt,
    /// Micros-scaled price to a currency amount.
    PriceMicros,
    /// True only for an exactly-zero raw price.
    IsFree,
    /// Empty price text means the app is free.
    PriceText,
    /// JS-style truthiness for presence flags.
    Bool,
    /// Leading token of the version text, or "VARY" for "Varies with device".
    AndroidVersion,
    /// Per-bucket rating counts for buckets 1-5.
    Histogram,
    /// First five non-null review bodies.
    Comments,
    /// Seconds to milliseconds.
    TimestampMillis,
    /// Strip markup, keeping `<br>` line breaks as newlines.
    HtmlText,
    /// Project the image url out of each screenshot record.
    Screenshots,
    /// Developer id from the developer page url.
    DeveloperId,
}

impl Transform {
    /// Apply the transform to a resolved value (or absence). `Ok(None)`
    /// means the field stays absent; `Err` is recorded as a diagnostic.
    pub fn apply(&self, value: Option<&Value>) -> Result<Option<Value>, TransformError> {
        match self {
            Transform::CleanInt => clean_int(value).map(Some),
            Transform::PriceMicros => Ok(Some(price_micros(value))),
            Transform::IsFree => Ok(Some(Value::Bool(is_zero_price(value)))),
            Transform::PriceText => Ok(Some(price_text(value))),
            Transform::Bool => Ok(Some(Value::Bool(truthy(value)))),
            Transform::AndroidVersion => android_version(value).map(Some),
            Transform::Histogram => histogram(value).map(Some),
            Transform::Comments => comments(value).map(Some),
            Transform::TimestampMillis => timestamp_millis(value),
            Transform::HtmlText => html_text(value).map(Some),
            Transform::Screenshots => screenshots(value).map(Some),
            Transform::DeveloperId => Ok(developer_id(value)),
        }
    }
}

fn string_input(value: Option<&Value>) -> Result<&str, TransformError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(TransformError::new(format!("expected string, got {other}"))),
        None => Err(TransformError::new("missing value")),
    }
}

fn clean_int(value: Option<&Value>) -> Result<Value, TransformError> {
    let text = match value {
        None | Some(Value::Null) => return Ok(json!(0)),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(TransformError::new(format!("expected string, got {other}")))
        }
    };
    if text.is_empty() {
        return Ok(json!(0));
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<u64>()
        .map(|n| json!(n))
        .map_err(|_| TransformError::new(format!("no digits in {text:?}")))
}

fn price_micros(value: Option<&Value>) -> Value {
    let amount = value
        .and_then(Value::as_f64)
        .map(|micros| micros / 1_000_000.0)
        .unwrap_or(0.0);
    if amount == 0.0 {
        json!(0)
    } else {
        json!(amount)
    }
}

fn is_zero_price(value: Option<&Value>) -> bool {
    matches!(value.and_then(Value::as_f64), Some(micros) if micros == 0.0)
}

fn price_text(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => json!("Free"),
        Some(Value::String(s)) if s.is_empty() => json!("Free"),
        Some(other) => other.clone(),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn android_version(value: Option<&Value>) -> Result<Value, TransformError> {
    let text = string_input(value)?;
    let token = text.split_whitespace().next().unwrap_or("");
    Ok(match leading_float(token) {
        Some(number) if number != 0.0 => json!(token),
        _ => json!("VARY"),
    })
}

/// Numeric prefix of a token, so values like "4.4W" still count as
/// versions rather than "varies with device".
fn leading_float(token: &str) -> Option<f64> {
    let bytes = token.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }
    token[..end].parse().ok()
}

fn histogram(value: Option<&Value>) -> Result<Value, TransformError> {
    let mut buckets = Map::new();
    match value {
        None | Some(Value::Null) => {
            for rating in 1..=5usize {
                buckets.insert(rating.to_string(), json!(0));
            }
        }
        Some(container) => {
            // bucket b lives at container[b], its count at [1]
            for rating in 1..=5usize {
                let count = container
                    .get(rating)
                    .and_then(|bucket| bucket.get(1))
                    .ok_or_else(|| {
                        TransformError::new(format!("malformed histogram bucket {rating}"))
                    })?;
                buckets.insert(rating.to_string(), count.clone());
            }
        }
    }
    Ok(Value::Object(buckets))
}

fn comments(value: Option<&Value>) -> Result<Value, TransformError> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(json!([])),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(TransformError::new(format!("expected array, got {other}")))
        }
    };
    let bodies: Vec<Value> = entries
        .iter()
        .filter_map(|entry| entry.get(4))
        .filter(|body| !body.is_null())
        .take(5)
        .cloned()
        .collect();
    Ok(Value::Array(bodies))
}

fn timestamp_millis(value: Option<&Value>) -> Result<Option<Value>, TransformError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(seconds) = n.as_i64() {
                Ok(Some(json!(seconds * 1000)))
            } else if let Some(seconds) = n.as_f64() {
                Ok(Some(json!(seconds * 1000.0)))
            } else {
                Err(TransformError::new("timestamp out of range"))
            }
        }
        Some(other) => Err(TransformError::new(format!(
            "expected number, got {other}"
        ))),
    }
}

// stand-in for <br> while markup is stripped; the html5 tokenizer
// normalizes CR and CRLF to LF, so the real "\r\n" goes in afterwards
const LINE_BREAK_MARK: &str = "\u{e000}";

fn html_text(value: Option<&Value>) -> Result<Value, TransformError> {
    let html = string_input(value)?;
    let with_breaks = html
        .replace("<br>", LINE_BREAK_MARK)
        .replace("<br/>", LINE_BREAK_MARK)
        .replace("<br />", LINE_BREAK_MARK);
    let fragment = Html::parse_fragment(&with_breaks);
    let text: String = fragment.root_element().text().collect();
    Ok(json!(text.replace(LINE_BREAK_MARK, "\r\n")))
}

const SCREENSHOT_URL: &[PathElem] = &[PathElem::Index(3), PathElem::Index(2)];

fn screenshots(value: Option<&Value>) -> Result<Value, TransformError> {
    match value {
        Some(Value::Array(entries)) => Ok(Value::Array(
            entries
                .iter()
                .map(|entry| {
                    resolve(entry, SCREENSHOT_URL)
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect(),
        )),
        Some(other) => Err(TransformError::new(format!("expected array, got {other}"))),
        None => Err(TransformError::new("missing value")),
    }
}

fn developer_id(value: Option<&Value>) -> Option<Value> {
    let url = value?.as_str()?;
    url.split_once("id=").map(|(_, id)| json!(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_int_strips_separators() {
        let input = json!("1,234+");
        assert_eq!(clean_int(Some(&input)).unwrap(), json!(1234));
    }

    #[test]
    fn clean_int_defaults_to_zero() {
        assert_eq!(clean_int(None).unwrap(), json!(0));
        let empty = json!("");
        assert_eq!(clean_int(Some(&empty)).unwrap(), json!(0));
    }

    #[test]
    fn clean_int_rejects_digitless_text() {
        let input = json!("soon");
        assert!(clean_int(Some(&input)).is_err());
    }

    #[test]
    fn price_micros_scales_down() {
        let input = json!(4990000);
        assert_eq!(price_micros(Some(&input)), json!(4.99));
    }

    #[test]
    fn price_micros_defaults_to_zero() {
        assert_eq!(price_micros(None), json!(0));
        let zero = json!(0);
        assert_eq!(price_micros(Some(&zero)), json!(0));
    }

    #[test]
    fn free_only_for_exactly_zero() {
        let zero = json!(0);
        let one = json!(1);
        assert!(is_zero_price(Some(&zero)));
        assert!(!is_zero_price(Some(&one)));
        assert!(!is_zero_price(None));
    }

    #[test]
    fn empty_price_text_means_free() {
        assert_eq!(price_text(None), json!("Free"));
        let empty = json!("");
        assert_eq!(price_text(Some(&empty)), json!("Free"));
        let paid = json!("$4.99");
        assert_eq!(price_text(Some(&paid)), json!("$4.99"));
    }

    #[test]
    fn truthiness_matches_presence() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&Value::Null)));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(false))));
        assert!(truthy(Some(&json!("$1.99 per item"))));
        assert!(truthy(Some(&json!(2))));
        assert!(truthy(Some(&json!([1]))));
    }

    #[test]
    fn android_version_keeps_leading_number() {
        let input = json!("5.0 and up");
        assert_eq!(android_version(Some(&input)).unwrap(), json!("5.0"));
    }

    #[test]
    fn android_version_keeps_prefix_numeric_token() {
        let input = json!("4.4W and up");
        assert_eq!(android_version(Some(&input)).unwrap(), json!("4.4W"));
        let zero = json!("0.0 and up");
        assert_eq!(android_version(Some(&zero)).unwrap(), json!("VARY"));
    }

    #[test]
    fn android_version_varies_by_device() {
        let input = json!("Varies with device");
        assert_eq!(android_version(Some(&input)).unwrap(), json!("VARY"));
        assert!(android_version(None).is_err());
    }

    #[test]
    fn histogram_defaults_to_zero_buckets() {
        let expected = json!({"1": 0, "2": 0, "3": 0, "4": 0, "5": 0});
        assert_eq!(histogram(None).unwrap(), expected);
        assert_eq!(histogram(Some(&Value::Null)).unwrap(), expected);
    }

    #[test]
    fn histogram_reads_bucket_counts() {
        let container = json!([0, [1, 10], [2, 20], [3, 30], [4, 40], [5, 400]]);
        assert_eq!(
            histogram(Some(&container)).unwrap(),
            json!({"1": 10, "2": 20, "3": 30, "4": 40, "5": 400})
        );
    }

    #[test]
    fn histogram_rejects_malformed_buckets() {
        let container = json!([0, [1, 10]]);
        assert!(histogram(Some(&container)).is_err());
    }

    fn comment(body: &str) -> Value {
        json!([null, "author", null, null, body])
    }

    #[test]
    fn comments_drop_nulls_and_truncate() {
        let input = json!([
            comment("one"),
            Value::Null,
            comment("two"),
            comment("three"),
            Value::Null,
            comment("four"),
            comment("five"),
        ]);
        assert_eq!(
            comments(Some(&input)).unwrap(),
            json!(["one", "two", "three", "four", "five"])
        );

        let more = json!([
            comment("one"),
            comment("two"),
            comment("three"),
            comment("four"),
            comment("five"),
            comment("six"),
        ]);
        assert_eq!(
            comments(Some(&more)).unwrap(),
            json!(["one", "two", "three", "four", "five"])
        );
    }

    #[test]
    fn comments_default_to_empty() {
        assert_eq!(comments(None).unwrap(), json!([]));
    }

    #[test]
    fn timestamp_scales_to_millis() {
        let input = json!(1609459200);
        assert_eq!(
            timestamp_millis(Some(&input)).unwrap(),
            Some(json!(1609459200000i64))
        );
        assert_eq!(timestamp_millis(None).unwrap(), None);
    }

    #[test]
    fn html_text_keeps_line_breaks() {
        let input = json!("Line one<br>Line <b>two</b><br/>Line three");
        assert_eq!(
            html_text(Some(&input)).unwrap(),
            json!("Line one\r\nLine two\r\nLine three")
        );
        assert!(html_text(None).is_err());
    }

    #[test]
    fn screenshots_project_urls() {
        let input = json!([
            [null, null, null, [null, null, "https://img/1.png"]],
            [null, null, null, [null, null, "https://img/2.png"]],
            [null],
        ]);
        assert_eq!(
            screenshots(Some(&input)).unwrap(),
            json!(["https://img/1.png", "https://img/2.png", null])
        );
        assert!(screenshots(None).is_err());
    }

    #[test]
    fn developer_id_from_url() {
        let input = json!("https://play.google.com/store/apps/dev?id=5700313618786177705");
        assert_eq!(
            developer_id(Some(&input)),
            Some(json!("5700313618786177705"))
        );
        let no_id = json!("https://play.google.com/store/apps/dev");
        assert_eq!(developer_id(Some(&no_id)), None);
        assert_eq!(developer_id(None), None);
    }
}
