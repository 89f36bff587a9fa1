//! HTTP client for the hosted document store.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use plaudit_core::error::{Error, ProtocolError, TransportError};
use plaudit_core::StoreUrl;

/// Error body returned by the store on failed requests.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct StoreErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Map a reqwest error onto the transport error taxonomy.
fn map_transport(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout { duration_ms: 0 }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// HTTP client for store requests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    store: StoreUrl,
}

impl HttpClient {
    /// Create a new HTTP client for the given store.
    pub fn new(store: StoreUrl) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("plaudit/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client, store }
    }

    /// Returns the store URL this client is configured for.
    pub fn store(&self) -> &StoreUrl {
        &self.store
    }

    /// POST a JSON body and decode a JSON response.
    #[instrument(skip(self, body), fields(store = %self.store))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.store.endpoint_url(path);
        debug!(%url, "store POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .headers(self.json_headers())
            .send()
            .await
            .map_err(map_transport)?;

        self.handle_response(response).await
    }

    /// PATCH a JSON body, expecting no response content.
    #[instrument(skip(self, body), fields(store = %self.store))]
    pub async fn patch_no_response<B>(&self, path: &str, body: &B) -> Result<(), Error>
    where
        B: Serialize,
    {
        let url = self.store.endpoint_url(path);
        debug!(%url, "store PATCH");

        let response = self
            .client
            .patch(&url)
            .json(body)
            .headers(self.json_headers())
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Protocol(error))
        }
    }

    /// DELETE, expecting no response content.
    #[instrument(skip(self), fields(store = %self.store))]
    pub async fn delete_no_response(&self, path: &str) -> Result<(), Error> {
        let url = self.store.endpoint_url(path);
        debug!(%url, "store DELETE");

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Protocol(error))
        }
    }

    fn json_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Handle a store response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "store response");

        if status.is_success() {
            let body = response.json::<R>().await.map_err(map_transport)?;
            Ok(body)
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Protocol(error))
        }
    }

    /// Parse a store error response.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<StoreErrorResponse>().await {
            Ok(error_body) => ProtocolError::new(status, error_body.error, error_body.message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}
