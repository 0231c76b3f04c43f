use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ApiConfig;
use crate::constants;
use crate::domain::ObjectKind;
use crate::error::{MonitorError, Result};
use crate::types::{RecordSource, SourceQuery};

/// Thin client for the monitoring backend's map endpoints
pub struct MapApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl MapApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>, config: &ApiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Builds a client from configuration, reading the token from the environment
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), config.token()?, config)
    }

    pub fn endpoint(kind: ObjectKind) -> &'static str {
        match kind {
            ObjectKind::WaterBody => constants::WATER_BODIES_ENDPOINT,
            ObjectKind::Facility => constants::FACILITIES_ENDPOINT,
            ObjectKind::CriticalZone => constants::CRITICAL_ZONES_ENDPOINT,
        }
    }

    pub fn url_for(&self, kind: ObjectKind) -> String {
        format!("{}{}", self.base_url, Self::endpoint(kind))
    }

    /// Query pairs sent with a collection request. Critical zones only accept a region.
    pub fn query_pairs(kind: ObjectKind, query: &SourceQuery) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(region) = query.region.as_deref().filter(|r| !r.trim().is_empty()) {
            pairs.push(("region", region.to_string()));
        }
        if kind != ObjectKind::CriticalZone {
            if let Some(condition) = query.condition {
                pairs.push(("condition", condition.to_string()));
            }
        }
        pairs
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, url: &str, pairs: &[(&'static str, String)]) -> Result<Value> {
        let request = self.authorized(self.client.get(url).query(pairs));
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(%url, "backend rejected credentials");
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Array(Vec::new()));
        }
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(MonitorError::Api {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }

        Ok(response.json().await?)
    }
}

/// Backend errors come back as `{"message": ...}` or `{"error": ...}`
fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .next()
}

/// Accepts a bare array or an object wrapping it under `data`
pub fn unwrap_collection(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(MonitorError::Api {
                status: 200,
                message: "response is neither an array nor an object with a 'data' array".to_string(),
            }),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(MonitorError::Api {
            status: 200,
            message: "unexpected response shape".to_string(),
        }),
    }
}

#[async_trait::async_trait]
impl RecordSource for MapApiClient {
    fn source_name(&self) -> &str {
        "map_api"
    }

    #[instrument(skip(self, query), fields(source = "map_api"))]
    async fn fetch(&self, kind: ObjectKind, query: &SourceQuery) -> Result<Vec<Value>> {
        let url = self.url_for(kind);
        let pairs = Self::query_pairs(kind, query);
        let records = unwrap_collection(self.get_json(&url, &pairs).await?)?;
        debug!(%kind, count = records.len(), "fetched records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls_and_query_pairs() {
        let client = MapApiClient::new("https://api.example.kz/api/", None, &ApiConfig::default()).unwrap();
        assert_eq!(
            client.url_for(ObjectKind::CriticalZone),
            "https://api.example.kz/api/map/critical-zones"
        );

        let query = SourceQuery {
            region: Some("Павлодарская область".to_string()),
            condition: Some(4),
        };
        assert_eq!(
            MapApiClient::query_pairs(ObjectKind::Facility, &query),
            vec![("region", "Павлодарская область".to_string()), ("condition", "4".to_string())]
        );
        assert_eq!(
            MapApiClient::query_pairs(ObjectKind::CriticalZone, &query),
            vec![("region", "Павлодарская область".to_string())]
        );
    }

    #[test]
    fn test_unwrap_collection_shapes() {
        assert_eq!(unwrap_collection(json!([{ "id": 1 }])).unwrap().len(), 1);
        assert_eq!(unwrap_collection(json!({ "data": [{ "id": 1 }, { "id": 2 }] })).unwrap().len(), 2);
        assert!(unwrap_collection(Value::Null).unwrap().is_empty());
        assert!(matches!(
            unwrap_collection(json!({ "items": [] })),
            Err(MonitorError::Api { .. })
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(&json!({ "message": "Token expired" })).as_deref(), Some("Token expired"));
        assert_eq!(error_message(&json!({ "error": "Forbidden" })).as_deref(), Some("Forbidden"));
        assert_eq!(error_message(&Value::Null), None);
    }
}
