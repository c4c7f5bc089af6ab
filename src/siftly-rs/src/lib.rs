//! Siftly Client Library
//!
//! HTTP client for search services speaking the Meilisearch REST protocol.
//! Every call goes through one request pipeline; mutating calls return a
//! [`TaskInfo`] that [`Client::wait_for_task`] resolves to a terminal [`Task`].

mod client;
mod documents;
mod index;
mod keys;
mod request;
mod tasks;
mod tenant;
pub mod transport;

#[cfg(test)]
mod testing;

use std::time::Duration;

pub use client::Client;
pub use documents::chunk_documents;
pub use index::Index;
pub use siftly_core::*;
pub use tasks::{TaskPoller, WaitParams};
pub use tenant::{TenantTokenClaims, TenantTokenOptions};
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{function}: request failed: {source}")]
    Transport {
        function: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("{function}: server rejected request with status {status}: {error}")]
    Api {
        function: &'static str,
        status: u16,
        error: ApiError,
    },

    #[error("{function}: unexpected status {status}: {body}")]
    Status {
        function: &'static str,
        status: u16,
        body: String,
    },

    #[error("{function}: failed to decode response: {source}")]
    Decode {
        function: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{function}: failed to encode request body: {source}")]
    Encode {
        function: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("task {task_uid} did not reach a terminal state within {waited:?}")]
    WaitTimeout { task_uid: u64, waited: Duration },

    #[error("wait for task {task_uid} was cancelled")]
    WaitCancelled { task_uid: u64 },

    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("batch chunk {chunk_index} failed after {} chunk(s) were accepted: {source}", .submitted.len())]
    Batch {
        chunk_index: usize,
        /// Handles of the chunks the server accepted before the failure
        submitted: Vec<TaskInfo>,
        #[source]
        source: Box<ClientError>,
    },

    #[error("failed to sign tenant token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of a rejected request, if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } | ClientError::Status { status, .. } => Some(*status),
            ClientError::Batch { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Decoded service error payload, if the server sent one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api { error, .. } => Some(error),
            ClientError::Batch { source, .. } => source.api_error(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, ClientError::WaitTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
