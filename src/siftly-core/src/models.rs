use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structured error payload returned by the service on rejected requests
/// and embedded in failed tasks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    pub code: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}: {})", self.message, self.error_type, self.code)
    }
}

/// IndexInfo describes one index as stored by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub uid: String,
    #[serde(default)]
    pub primary_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of `GET /indexes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexesResults {
    pub results: Vec<IndexInfo>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
}

/// CreateIndexRequest is the body of `POST /indexes`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexRequest {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

/// UpdateIndexRequest is the body of `PATCH /indexes/{uid}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIndexRequest {
    pub primary_key: String,
}

/// One page of `GET /indexes/{uid}/documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsResults<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
}

/// Pagination and projection for document listing
#[derive(Debug, Clone, Default)]
pub struct DocumentsQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub fields: Vec<String>,
}

impl DocumentsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if !self.fields.is_empty() {
            pairs.push(("fields", self.fields.join(",")));
        }
        pairs
    }
}

/// Index settings. Every field is optional so partial updates only send
/// what is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_rules: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displayed_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_words: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<HashMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable_attributes: Option<Vec<String>>,
}

/// API key as returned by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub key: String,
    pub uid: String,
    pub actions: Vec<String>,
    pub indexes: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// KeyRequest is the body of `POST /keys`.
///
/// `expires_at` is always sent; `null` means the key never expires.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub actions: Vec<String>,
    pub indexes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// KeyUpdate is the body of `PATCH /keys/{key}`; only name and description
/// are mutable
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One page of `GET /keys`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysResults {
    pub results: Vec<Key>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub number_of_documents: u64,
    pub is_indexing: bool,
    #[serde(default)]
    pub field_distribution: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub database_size: u64,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub indexes: HashMap<String, IndexStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub commit_sha: String,
    pub commit_date: String,
    pub pkg_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_decodes_type_field() {
        let json = r#"{
            "message": "Index `movies` not found.",
            "code": "index_not_found",
            "type": "invalid_request",
            "link": "https://docs.meilisearch.com/errors#index_not_found"
        }"#;
        let error: ApiError = serde_json::from_str(json).unwrap();
        assert_eq!(error.error_type, "invalid_request");
        assert_eq!(
            error.to_string(),
            "Index `movies` not found. (invalid_request: index_not_found)"
        );
    }

    #[test]
    fn test_settings_partial_update_skips_unset_fields() {
        let settings = Settings {
            stop_words: Some(vec!["the".to_string(), "a".to_string()]),
            ..Default::default()
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value, serde_json::json!({ "stopWords": ["the", "a"] }));
    }

    #[test]
    fn test_key_request_sends_null_expiry() {
        let request = KeyRequest {
            name: None,
            description: Some("search only".to_string()),
            actions: vec!["search".to_string()],
            indexes: vec!["*".to_string()],
            expires_at: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["expiresAt"], serde_json::Value::Null);
        assert!(value.get("name").is_none());
    }

    #[test]
    fn test_documents_query_pairs() {
        let query = DocumentsQuery::new()
            .with_limit(10)
            .with_fields(["id", "title"]);
        assert_eq!(
            query.to_pairs(),
            vec![("limit", "10".to_string()), ("fields", "id,title".to_string())]
        );
    }
}
