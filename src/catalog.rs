//! Region catalog download
//!
//! The catalog is a flat JSON object mapping region codes to display names,
//! e.g. `{"us-east-1": "US East (N. Virginia)"}`.

use crate::{
    error::{AppError, Result},
    models::EndpointSet,
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Default location of the `code -> name` region map
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/burib/aws-region-table-parser/refs/heads/master/region_code_to_name_map.json";

/// Downloads region catalogs
pub struct CatalogClient {
    client: Client,
}

impl CatalogClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch and decode the catalog at `url`.
    ///
    /// The returned set is ordered by region code.
    pub async fn fetch(&self, url: &str) -> Result<EndpointSet> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::catalog_fetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::catalog_fetch(format!("{} returned HTTP {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::catalog_fetch(format!("Failed to read body of {}: {}", url, e)))?;

        decode_catalog(&body)
    }
}

/// Decode a catalog document into an endpoint set ordered by code
pub fn decode_catalog(body: &str) -> Result<EndpointSet> {
    let regions: HashMap<String, String> = serde_json::from_str(body)
        .map_err(|e| AppError::catalog_decode(format!("Region catalog is not a code -> name map: {}", e)))?;

    if regions.is_empty() {
        return Err(AppError::catalog_decode("Region catalog is empty"));
    }

    Ok(EndpointSet::from_catalog(regions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_orders_by_code() {
        let set = decode_catalog(r#"{"us-west-2": "Oregon", "af-south-1": "Cape Town", "cn-north-1": "Beijing"}"#)
            .unwrap();
        assert_eq!(set.codes(), vec!["af-south-1", "cn-north-1", "us-west-2"]);
        assert_eq!(set.get("cn-north-1").unwrap().name(), "Beijing");
    }

    #[test]
    fn test_decode_failures() {
        for body in ["", "[]", "not json", r#"{"us-east-1": 1}"#, "{}"] {
            let error = decode_catalog(body).unwrap_err();
            assert!(matches!(error, AppError::CatalogDecode(_)), "{:?} gave {:?}", body, error);
        }
    }

    #[test]
    fn test_default_url_is_valid() {
        let url = url::Url::parse(DEFAULT_CATALOG_URL).unwrap();
        assert_eq!(url.scheme(), "https");
        assert!(url.path().ends_with(".json"));
    }
}
