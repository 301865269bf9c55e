//! HTTP transport for the proof service.
//!
//! # Responsibilities
//! - Build the `GET <endpoint>?pairs=<id>` request
//! - Route through the configured forward proxy, if any
//! - Enforce the per-attempt deadline
//! - Hand status, content type and body to the classifier untouched

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, PRAGMA, USER_AGENT};
use std::time::Duration;
use url::Url;

use crate::config::ProofConfig;
use crate::load_balancer::PairId;
use crate::proof::types::{FetchError, FetchResult, RawResponse};

/// Something that can perform one proof request.
pub trait ProofTransport: Send + Sync {
    fn get<'a>(&'a self, pair: PairId, user_agent: &'a str) -> BoxFuture<'a, FetchResult<RawResponse>>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport for `endpoint`, optionally through `proxy_url`.
    pub fn new(endpoint: &str, proxy_url: Option<&str>, timeout: Duration) -> FetchResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| FetchError::Malformed(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(proxy_url) = proxy_url.filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| FetchError::Malformed(format!("invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!(endpoint = %endpoint, "Proof requests routed through proxy");
        } else {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Malformed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Build a transport from the proof section of the config.
    pub fn from_config(config: &ProofConfig) -> FetchResult<Self> {
        Self::new(
            &config.endpoint,
            config.proxy_url.as_deref(),
            Duration::from_secs(config.attempt_timeout_secs),
        )
    }

    /// Full request URL for a pair.
    pub fn url_for(&self, pair: PairId) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("pairs", &pair.to_string());
        url
    }

    async fn request(&self, pair: PairId, user_agent: &str) -> FetchResult<RawResponse> {
        let send = self
            .client
            .get(self.url_for(pair))
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header(USER_AGENT, user_agent)
            .send();

        let response = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => return Err(FetchError::Timeout(self.timeout.as_secs())),
            Ok(Err(e)) => return Err(FetchError::Transport(e.to_string())),
            Err(_) => return Err(FetchError::Timeout(self.timeout.as_secs())),
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout.as_secs())
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        Ok(RawResponse {
            status: Some(status),
            content_type,
            body,
        })
    }
}

impl ProofTransport for HttpTransport {
    fn get<'a>(&'a self, pair: PairId, user_agent: &'a str) -> BoxFuture<'a, FetchResult<RawResponse>> {
        self.request(pair, user_agent).boxed()
    }
}
