//! Document writes and reads, including batched submission.
//!
//! A batched write splits the collection into contiguous chunks and submits
//! them one after another in collection order. Each chunk yields its own task
//! handle. Submission stops at the first rejected chunk; chunks already
//! accepted are reported in the error and are not rolled back.

use crate::request::Request;
use crate::{ClientError, DocumentsQuery, DocumentsResults, Index, Result, TaskInfo};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// `POST`: documents with an existing id are replaced
    Replace,
    /// `PUT`: documents with an existing id are merged
    Update,
}

/// Split `documents` into chunks of at most `batch_size`, rejecting a zero size
pub fn chunk_documents<T>(documents: &[T], batch_size: usize) -> Result<std::slice::Chunks<'_, T>> {
    if batch_size == 0 {
        return Err(ClientError::Validation(
            "batch size must be greater than zero".to_string(),
        ));
    }
    Ok(documents.chunks(batch_size))
}

impl Index {
    pub async fn get_document<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        self.client
            .execute(Request::get(
                "get_document",
                self.path(&format!("/documents/{}", urlencoding::encode(id))),
            ))
            .await
    }

    pub async fn get_documents<T: DeserializeOwned>(
        &self,
        query: &DocumentsQuery,
    ) -> Result<DocumentsResults<T>> {
        self.client
            .execute(Request::get("get_documents", self.path("/documents")).with_query(query.to_pairs()))
            .await
    }

    /// Add documents, replacing any with the same primary key
    pub async fn add_documents<T: Serialize>(
        &self,
        documents: &[T],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        self.write_documents(documents, primary_key, WriteMode::Replace)
            .await
    }

    /// Add documents, merging fields into any with the same primary key
    pub async fn update_documents<T: Serialize>(
        &self,
        documents: &[T],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo> {
        self.write_documents(documents, primary_key, WriteMode::Update)
            .await
    }

    pub async fn add_documents_in_batches<T: Serialize>(
        &self,
        documents: &[T],
        batch_size: usize,
        primary_key: Option<&str>,
    ) -> Result<Vec<TaskInfo>> {
        self.write_in_batches(documents, batch_size, primary_key, WriteMode::Replace)
            .await
    }

    pub async fn update_documents_in_batches<T: Serialize>(
        &self,
        documents: &[T],
        batch_size: usize,
        primary_key: Option<&str>,
    ) -> Result<Vec<TaskInfo>> {
        self.write_in_batches(documents, batch_size, primary_key, WriteMode::Update)
            .await
    }

    pub async fn delete_document(&self, id: &str) -> Result<TaskInfo> {
        self.client
            .execute(
                Request::delete(
                    "delete_document",
                    self.path(&format!("/documents/{}", urlencoding::encode(id))),
                )
                .accept(&[StatusCode::ACCEPTED]),
            )
            .await
    }

    pub async fn delete_documents<S: AsRef<str> + Serialize>(&self, ids: &[S]) -> Result<TaskInfo> {
        self.client
            .execute(
                Request::post("delete_documents", self.path("/documents/delete-batch"))
                    .with_body(ids)
                    .accept(&[StatusCode::ACCEPTED]),
            )
            .await
    }

    pub async fn delete_all_documents(&self) -> Result<TaskInfo> {
        self.client
            .execute(
                Request::delete("delete_all_documents", self.path("/documents"))
                    .accept(&[StatusCode::ACCEPTED]),
            )
            .await
    }

    async fn write_documents<T: Serialize>(
        &self,
        documents: &[T],
        primary_key: Option<&str>,
        mode: WriteMode,
    ) -> Result<TaskInfo> {
        let request = match mode {
            WriteMode::Replace => Request::post("add_documents", self.path("/documents")),
            WriteMode::Update => Request::put("update_documents", self.path("/documents")),
        };
        let query = primary_key
            .map(|key| vec![("primaryKey", key.to_string())])
            .unwrap_or_default();

        self.client
            .execute(
                request
                    .with_query(query)
                    .with_body(documents)
                    .accept(&[StatusCode::ACCEPTED]),
            )
            .await
    }

    async fn write_in_batches<T: Serialize>(
        &self,
        documents: &[T],
        batch_size: usize,
        primary_key: Option<&str>,
        mode: WriteMode,
    ) -> Result<Vec<TaskInfo>> {
        let chunks = chunk_documents(documents, batch_size)?;

        let mut submitted = Vec::with_capacity(documents.len().div_ceil(batch_size));
        for (chunk_index, chunk) in chunks.enumerate() {
            debug!(
                "Submitting chunk {} ({} documents) to index '{}'",
                chunk_index,
                chunk.len(),
                self.uid
            );
            match self.write_documents(chunk, primary_key, mode).await {
                Ok(task) => submitted.push(task),
                Err(source) => {
                    return Err(ClientError::Batch {
                        chunk_index,
                        submitted,
                        source: Box::new(source),
                    })
                }
            }
        }

        info!(
            "Submitted {} documents to index '{}' in {} chunk(s)",
            documents.len(),
            self.uid,
            submitted.len()
        );
        Ok(submitted)
    }
}
