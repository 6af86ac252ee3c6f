/// Catalog loading and normalization
mod normalize;
mod types;

pub use normalize::{Normalizer, UNKNOWN_ID};
pub use types::{Catalog, ClockTime, CourseRecord, TimeSlot, Weekday, TERM_YEARLY};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Errors from the one-shot catalog load at startup.
///
/// None of these are fatal: the caller logs the failure and continues with an
/// empty catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Catalog file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog root is not a list")]
    NotAList,
}

/// Fetches the raw catalog from `source` and normalizes it.
///
/// `source` is either an http(s) URL or a local file path; anything that does
/// not parse as an absolute http(s) URL is treated as a path.
pub async fn load_catalog(
    client: &reqwest::Client,
    source: &str,
    normalizer: &Normalizer,
) -> Result<Catalog, CatalogError> {
    let text = match url::Url::parse(source) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            info!("Fetching catalog from {source}");
            client
                .get(parsed)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?
        }
        _ => {
            info!("Reading catalog from {source}");
            std::fs::read_to_string(source)?
        }
    };

    let raw = parse_raw_records(&text)?;
    let catalog = normalizer.normalize(&raw);
    info!(
        "Normalized catalog: {} courses, {} fields of study",
        catalog.len(),
        catalog.fields().len()
    );
    Ok(catalog)
}

/// Parses the raw catalog body into a list of records of arbitrary shape.
fn parse_raw_records(text: &str) -> Result<Vec<Value>, CatalogError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(records) => Ok(records),
        _ => Err(CatalogError::NotAList),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_records_list() {
        let raw = parse_raw_records(r#"[{"id": "A"}, {"id": "B"}]"#).unwrap();
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_parse_raw_records_rejects_non_list() {
        assert!(matches!(
            parse_raw_records(r#"{"id": "A"}"#),
            Err(CatalogError::NotAList)
        ));
    }

    #[test]
    fn test_parse_raw_records_rejects_invalid_json() {
        assert!(matches!(
            parse_raw_records("not json {"),
            Err(CatalogError::Parse(_))
        ));
    }
}
