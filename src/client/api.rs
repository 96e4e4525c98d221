//! Thin HTTP wrapper over reqwest shared by the session and the cache.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outgoing requests never wait longer than this; expiry surfaces as
/// [`ClientError::Timeout`], which callers may retry. There is no
/// automatic retry.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status. Definitive; not
    /// worth retrying unchanged.
    #[error("server rejected the request ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Timeout)
    }

    /// Status of a definitive server rejection, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// `{"message": ...}` body used by error responses and by delete.
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Same client with a caller-chosen deadline instead of the default.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> ClientResult<T> {
        self.send(self.http.get(self.url(path)), token).await
    }

    pub async fn get_with_query<Q, T>(
        &self,
        path: &str,
        query: &Q,
        token: Option<&str>,
    ) -> ClientResult<T>
    where
        Q: Serialize,
        T: DeserializeOwned,
    {
        self.send(self.http.get(self.url(path)).query(query), token)
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> ClientResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.send(self.http.post(self.url(path)).json(body), token)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> ClientResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.send(self.http.put(self.url(path)).json(body), token)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> ClientResult<T> {
        self.send(self.http.delete(self.url(path)), token).await
    }

    /// With no token the request simply carries no Authorization
    /// header; the server answers 401 on protected routes.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> ClientResult<T> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(ClientError::Api {
                status,
                message: error_message(response).await,
            })
        }
    }
}

async fn error_message(response: Response) -> String {
    match response.json::<ApiMessage>().await {
        Ok(body) => body.message,
        Err(_) => "request failed".to_string(),
    }
}
