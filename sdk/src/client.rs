//! HTTP I/O for the request executor.
//!
//! One [`WopiClient`] is built per run. Redirects are never followed (test
//! cases assert them explicitly) and the request timeout is derived from the
//! configured access-token TTL.

use {
    crate::capture::ResponseCapture,
    reqwest::{redirect, Client, Method, Url},
    std::time::{Duration, Instant},
    thiserror::Error,
};

/// User agent sent unless a case demands the Office-native one.
pub const DEFAULT_USER_AGENT: &str =
    concat!("wopitest/", env!("CARGO_PKG_VERSION"));

/// User agent sent for Office-native-client test cases.
pub const OFFICE_NATIVE_USER_AGENT: &str = "Microsoft Office Word 2014";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Exchange {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Connection-pooled HTTP client shared by every case in a run.
pub struct WopiClient {
    http: Client,
}

impl WopiClient {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self { http })
    }

    /// Issue one exchange and capture the response.
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        user_agent: &str,
        headers: &[(String, String)],
        body: Option<Vec<u8>>,
    ) -> Result<ResponseCapture, TransportError> {
        log::debug!("{method} {url}");
        let started = Instant::now();

        let mut request = self
            .http
            .request(method, url.clone())
            .header(reqwest::header::USER_AGENT, user_agent);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|source| TransportError::Exchange {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let mut captured = Vec::new();
        for (name, value) in response.headers() {
            match value.to_str() {
                Ok(value) => captured.push((name.to_string(), value.to_string())),
                Err(_) => log::warn!("dropping non-UTF-8 response header '{name}'"),
            }
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Exchange {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        log::debug!("-> {} in {:?}", status, started.elapsed());
        Ok(ResponseCapture::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            captured,
            body,
            started.elapsed(),
        ))
    }
}
