use crate::request::Request;
use crate::{AsTaskUid, Client, IndexStats, Result, Settings, Task, TaskInfo, WaitParams};
use reqwest::StatusCode;
use siftly_core::{IndexInfo, UpdateIndexRequest};

/// Handle on one index. Document operations live in `documents.rs`.
#[derive(Clone)]
pub struct Index {
    pub(crate) client: Client,
    pub(crate) uid: String,
}

impl Index {
    pub(crate) fn new(client: Client, uid: String) -> Self {
        Self { client, uid }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn path(&self, suffix: &str) -> String {
        format!("/indexes/{}{}", urlencoding::encode(&self.uid), suffix)
    }

    pub async fn fetch_info(&self) -> Result<IndexInfo> {
        self.client.get_index(&self.uid).await
    }

    /// Change the primary key; only allowed while the index is empty
    pub async fn update(&self, primary_key: impl Into<String>) -> Result<TaskInfo> {
        let body = UpdateIndexRequest {
            primary_key: primary_key.into(),
        };
        self.client
            .execute(
                Request::patch("update_index", self.path(""))
                    .with_body(&body)
                    .accept(&[StatusCode::ACCEPTED]),
            )
            .await
    }

    pub async fn delete(&self) -> Result<TaskInfo> {
        self.client.delete_index(&self.uid).await
    }

    pub async fn get_settings(&self) -> Result<Settings> {
        self.client
            .execute(Request::get("get_settings", self.path("/settings")))
            .await
    }

    pub async fn update_settings(&self, settings: &Settings) -> Result<TaskInfo> {
        self.client
            .execute(
                Request::patch("update_settings", self.path("/settings"))
                    .with_body(settings)
                    .accept(&[StatusCode::ACCEPTED]),
            )
            .await
    }

    pub async fn reset_settings(&self) -> Result<TaskInfo> {
        self.client
            .execute(
                Request::delete("reset_settings", self.path("/settings"))
                    .accept(&[StatusCode::ACCEPTED]),
            )
            .await
    }

    pub async fn get_stats(&self) -> Result<IndexStats> {
        self.client
            .execute(Request::get("get_index_stats", self.path("/stats")))
            .await
    }

    pub async fn wait_for_task(
        &self,
        task: impl AsTaskUid,
        params: Option<WaitParams>,
    ) -> Result<Task> {
        self.client.wait_for_task(task, params).await
    }
}
