//! Request pipeline shared by every endpoint.
//!
//! Builds the headers, encodes the body as JSON, checks the status against the
//! accepted set and decodes either the expected type or the service error.

use crate::transport::{HttpRequest, HttpResponse};
use crate::{ApiError, Client, ClientError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

const CLIENT_AGENT: &str = concat!("siftly-rs/", env!("CARGO_PKG_VERSION"));

/// One endpoint call. `B` is the request body type; bodiless calls use `()`.
pub(crate) struct Request<'a, B: ?Sized = ()> {
    function: &'static str,
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<&'a B>,
    accepted: &'static [StatusCode],
}

impl Request<'static, ()> {
    fn new(function: &'static str, method: Method, path: impl Into<String>) -> Self {
        Self {
            function,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            accepted: &[StatusCode::OK],
        }
    }

    pub(crate) fn get(function: &'static str, path: impl Into<String>) -> Self {
        Self::new(function, Method::GET, path)
    }

    pub(crate) fn post(function: &'static str, path: impl Into<String>) -> Self {
        Self::new(function, Method::POST, path)
    }

    pub(crate) fn put(function: &'static str, path: impl Into<String>) -> Self {
        Self::new(function, Method::PUT, path)
    }

    pub(crate) fn patch(function: &'static str, path: impl Into<String>) -> Self {
        Self::new(function, Method::PATCH, path)
    }

    pub(crate) fn delete(function: &'static str, path: impl Into<String>) -> Self {
        Self::new(function, Method::DELETE, path)
    }
}

impl<'a, B: ?Sized> Request<'a, B> {
    pub(crate) fn with_body<'b, C: Serialize + ?Sized>(self, body: &'b C) -> Request<'b, C> {
        Request {
            function: self.function,
            method: self.method,
            path: self.path,
            query: self.query,
            body: Some(body),
            accepted: self.accepted,
        }
    }

    pub(crate) fn with_query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Replace the accepted status set (default: 200 only)
    pub(crate) fn accept(mut self, statuses: &'static [StatusCode]) -> Self {
        self.accepted = statuses;
        self
    }

    fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{}?{}", self.path, query)
    }
}

impl Client {
    /// Run `request` and decode the body into `T`
    pub(crate) async fn execute<B, T>(&self, request: Request<'_, B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let function = request.function;
        let response = self.send(request).await?;
        serde_json::from_slice(&response.body)
            .map_err(|source| ClientError::Decode { function, source })
    }

    /// Run `request` for an endpoint that answers without a body
    pub(crate) async fn execute_no_content<B>(&self, request: Request<'_, B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(request).await.map(|_| ())
    }

    async fn send<B>(&self, request: Request<'_, B>) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let function = request.function;
        let accepted = request.accepted;
        let http = self.build(request)?;
        let method = http.method.clone();
        let path = http.path.clone();

        let response = self
            .transport
            .send(http)
            .await
            .map_err(|source| ClientError::Transport { function, source })?;

        debug!("{} {} {} -> {}", function, method, path, response.status);

        if !accepted.contains(&response.status) {
            return Err(rejected(function, &response));
        }

        Ok(response)
    }

    fn build<B>(&self, request: Request<'_, B>) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_AGENT));
        if let Some(authorization) = &self.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }

        let body = match request.body {
            Some(body) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                let bytes = serde_json::to_vec(body).map_err(|source| ClientError::Encode {
                    function: request.function,
                    source,
                })?;
                Some(bytes)
            }
            None => None,
        };

        Ok(HttpRequest {
            path: request.path_and_query(),
            method: request.method,
            headers,
            body,
        })
    }
}

fn rejected(function: &'static str, response: &HttpResponse) -> ClientError {
    let status = response.status.as_u16();
    match serde_json::from_slice::<ApiError>(&response.body) {
        Ok(error) => {
            warn!("{} rejected with {}: {}", function, status, error);
            ClientError::Api {
                function,
                status,
                error,
            }
        }
        Err(_) => {
            warn!("{} rejected with {} and no service error body", function, status);
            ClientError::Status {
                function,
                status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            }
        }
    }
}
