use crate::request::Request;
use crate::transport::{ReqwestTransport, Transport};
use crate::{ClientError, Index, Result};
use reqwest::header::HeaderValue;
use reqwest::StatusCode;
use siftly_core::{
    ClientConfig, CreateIndexRequest, Health, IndexInfo, IndexesResults, Stats, Task, TaskInfo,
    TasksQuery, TasksResults, Version,
};
use std::sync::Arc;

/// Siftly REST API Client
///
/// Cheap to clone; clones share the transport and configuration.
#[derive(Clone)]
pub struct Client {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) authorization: Option<HeaderValue>,
}

impl Client {
    /// Create a client using the default reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        url::Url::parse(&config.host)
            .map_err(|e| ClientError::Config(format!("invalid host '{}': {}", config.host, e)))?;

        let transport = ReqwestTransport::new(config.host.clone(), config.timeout())
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let authorization = match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                let value = HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|_| ClientError::Config("API key is not a valid header value".to_string()))?;
                Some(value)
            }
            _ => None,
        };

        Ok(Self {
            config: Arc::new(config),
            transport,
            authorization,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Handle on one index. No request is made.
    pub fn index(&self, uid: impl Into<String>) -> Index {
        Index::new(self.clone(), uid.into())
    }

    pub async fn version(&self) -> Result<Version> {
        self.execute(Request::get("version", "/version")).await
    }

    pub async fn health(&self) -> Result<Health> {
        self.execute(Request::get("health", "/health")).await
    }

    /// True when `/health` answers; any error counts as unhealthy
    pub async fn is_healthy(&self) -> bool {
        self.health().await.is_ok()
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.execute(Request::get("stats", "/stats")).await
    }

    pub async fn create_dump(&self) -> Result<TaskInfo> {
        self.execute(Request::post("create_dump", "/dumps").accept(&[StatusCode::ACCEPTED]))
            .await
    }

    pub async fn get_task(&self, task_uid: u64) -> Result<Task> {
        self.execute(Request::get("get_task", format!("/tasks/{}", task_uid)))
            .await
    }

    pub async fn get_tasks(&self, query: &TasksQuery) -> Result<TasksResults> {
        self.execute(Request::get("get_tasks", "/tasks").with_query(query.to_pairs()))
            .await
    }

    pub async fn create_index(
        &self,
        uid: impl Into<String>,
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        let body = CreateIndexRequest {
            uid: uid.into(),
            primary_key: primary_key.map(str::to_string),
        };
        self.execute(
            Request::post("create_index", "/indexes")
                .with_body(&body)
                .accept(&[StatusCode::ACCEPTED]),
        )
        .await
    }

    pub async fn get_index(&self, uid: &str) -> Result<IndexInfo> {
        self.execute(Request::get("get_index", format!("/indexes/{}", urlencoding::encode(uid))))
            .await
    }

    pub async fn get_indexes(&self) -> Result<IndexesResults> {
        self.execute(Request::get("get_indexes", "/indexes")).await
    }

    /// Same as `get_index`, keeping fields this crate does not model
    pub async fn get_raw_index(&self, uid: &str) -> Result<serde_json::Value> {
        self.execute(Request::get(
            "get_raw_index",
            format!("/indexes/{}", urlencoding::encode(uid)),
        ))
        .await
    }

    pub async fn get_raw_indexes(&self) -> Result<serde_json::Value> {
        self.execute(Request::get("get_raw_indexes", "/indexes")).await
    }

    pub async fn delete_index(&self, uid: &str) -> Result<TaskInfo> {
        self.execute(
            Request::delete("delete_index", format!("/indexes/{}", urlencoding::encode(uid)))
                .accept(&[StatusCode::ACCEPTED]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{json_response, task_info_json, ScriptedTransport};
    use reqwest::Method;

    fn client_with(transport: Arc<ScriptedTransport>) -> Client {
        Client::with_transport(ClientConfig::new("http://localhost:7700"), transport).unwrap()
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let result = Client::new(ClientConfig::new("not a url"));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_client_without_key_sends_no_authorization() {
        let client = Client::new(ClientConfig::new("http://localhost:7700")).unwrap();
        assert!(client.authorization.is_none());
    }

    #[tokio::test]
    async fn test_create_index_posts_uid_and_primary_key() {
        let transport = ScriptedTransport::new(vec![json_response(
            202,
            task_info_json(0, Some("movies"), "indexCreation"),
        )]);
        let client = client_with(transport.clone());

        let info = client.create_index("movies", Some("id")).await.unwrap();
        assert_eq!(info.task_uid, 0);

        let calls = transport.calls();
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "/indexes");
        assert_eq!(
            calls[0].json_body(),
            Some(serde_json::json!({"uid": "movies", "primaryKey": "id"}))
        );
    }

    #[tokio::test]
    async fn test_get_tasks_encodes_filters() {
        let transport = ScriptedTransport::new(vec![json_response(
            200,
            serde_json::json!({"results": [], "limit": 20, "from": null, "next": null}),
        )]);
        let client = client_with(transport.clone());

        let query = TasksQuery::new()
            .with_index_uid("movies")
            .with_status(siftly_core::TaskStatus::Failed);
        let results = client.get_tasks(&query).await.unwrap();
        assert!(results.results.is_empty());
        assert_eq!(
            transport.calls()[0].path,
            "/tasks?indexUids=movies&statuses=failed"
        );
    }

    #[tokio::test]
    async fn test_index_uid_is_encoded_into_path() {
        let transport = ScriptedTransport::new(vec![
            json_response(
                200,
                serde_json::json!({
                    "uid": "movies/2024",
                    "primaryKey": null,
                    "createdAt": "2022-01-03T10:00:00Z",
                    "updatedAt": "2022-01-03T10:00:00Z"
                }),
            ),
            json_response(202, task_info_json(3, Some("movies/2024"), "indexDeletion")),
            json_response(200, serde_json::json!({})),
        ]);
        let client = client_with(transport.clone());

        client.get_index("movies/2024").await.unwrap();
        client.delete_index("movies/2024").await.unwrap();
        client.index("movies/2024").get_settings().await.unwrap();

        let paths: Vec<String> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            vec![
                "/indexes/movies%2F2024",
                "/indexes/movies%2F2024",
                "/indexes/movies%2F2024/settings",
            ]
        );
    }

    #[tokio::test]
    async fn test_raw_index_keeps_unmodelled_fields() {
        let raw = serde_json::json!({
            "uid": "movies",
            "primaryKey": "id",
            "createdAt": "2022-01-03T10:00:00Z",
            "updatedAt": "2022-01-03T10:00:00Z",
            "numberOfShards": 2
        });
        let transport = ScriptedTransport::new(vec![
            json_response(200, raw.clone()),
            json_response(200, serde_json::json!({"results": [raw.clone()], "total": 1})),
        ]);
        let client = client_with(transport.clone());

        assert_eq!(client.get_raw_index("movies").await.unwrap(), raw);
        let all = client.get_raw_indexes().await.unwrap();
        assert_eq!(all["results"][0]["numberOfShards"], 2);

        let calls = transport.calls();
        assert_eq!(calls[0].path, "/indexes/movies");
        assert_eq!(calls[1].path, "/indexes");
    }

    #[tokio::test]
    async fn test_is_healthy_false_on_transport_failure() {
        let transport = ScriptedTransport::new(vec![]);
        let client = client_with(transport);
        assert!(!client.is_healthy().await);
    }
}
