//! Remote tag catalog fetch

use crate::config::CatalogConfig;
use crate::AppError;
use std::time::Duration;

/// Extract the `tag_list` strings from a catalog response.
///
/// A missing or malformed `tag_list` yields an empty list; non-string
/// entries are ignored.
pub fn parse_catalog(body: &serde_json::Value) -> Vec<String> {
    body.get("tag_list")
        .and_then(|list| list.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|tag| tag.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// One-shot GET of the catalog. Blocking; run it off the UI thread.
pub fn fetch_tag_list(config: &CatalogConfig) -> Result<Vec<String>, AppError> {
    tracing::debug!(url = %config.url, "Fetching tag catalog");

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
        .build()
        .into();

    let body: serde_json::Value = agent.get(&config.url).call()?.into_body().read_json()?;

    let tags = parse_catalog(&body);
    tracing::info!("Tag catalog loaded: {} tags", tags.len());
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_catalog() {
        let body = json!({"tag_list": ["ecchi", 3, "hentai", null], "version": 2});
        assert_eq!(parse_catalog(&body), vec!["ecchi", "hentai"]);
    }

    #[test]
    fn test_parse_catalog_missing_list() {
        assert!(parse_catalog(&json!({})).is_empty());
        assert!(parse_catalog(&json!({"tag_list": "ecchi"})).is_empty());
        assert!(parse_catalog(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_unreachable_catalog_is_an_error() {
        let config = CatalogConfig {
            url: "http://127.0.0.1:9/api/info".to_string(),
            timeout_secs: 1,
        };
        assert!(matches!(fetch_tag_list(&config), Err(AppError::Catalog(_))));
    }
}
