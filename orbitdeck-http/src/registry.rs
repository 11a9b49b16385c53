//! Client for the chain registry (`GET /api/orbit-chain/dashboard`).
//!
//! [`RegistryClient::fetch`] is the strict call: one request, errors
//! returned as-is. [`RegistryClient::fetch_all`] never fails; on any error
//! it hands back the built-in sample set together with the error so the
//! caller can show a warning. Neither retries nor caches.
//!
//! [`Dashboard`] sits on top and keeps the last successful listing when a
//! later refresh falls back.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use orbitdeck::record::{self, ChainRecord, StatusSummary};
use orbitdeck::table::{self, TablePage, TableViewState};
use reqwest::Client;
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::constants::DASHBOARD_PATH;
use crate::error::RegistryError;

/// Where a set of records came from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// Returned by the registry.
    Live,
    /// Substituted because the registry call failed.
    Fallback(Arc<RegistryError>),
}

/// Outcome of [`RegistryClient::fetch_all`].
#[derive(Debug, Clone)]
pub struct RegistryFetch {
    /// Normalized records, live or fallback.
    pub records: Vec<ChainRecord>,
    /// Provenance of `records`.
    pub source: RecordSource,
}

impl RegistryFetch {
    /// Returns `true` if the records came from the registry.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.source, RecordSource::Live)
    }

    /// The failure that caused a fallback, if any.
    #[must_use]
    pub fn error(&self) -> Option<&RegistryError> {
        match &self.source {
            RecordSource::Live => None,
            RecordSource::Fallback(err) => Some(err),
        }
    }
}

/// A client for the chain registry endpoint.
#[derive(Clone, Debug)]
pub struct RegistryClient {
    /// Base URL of the backend (e.g. `https://orbit.example/`)
    base_url: Url,
    /// Full URL of the dashboard listing
    dashboard_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Optional custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl RegistryClient {
    /// Constructs a client from the backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UrlParse`] if the listing URL cannot be built.
    pub fn try_new(base_url: Url) -> Result<Self, RegistryError> {
        let dashboard_url =
            base_url
                .join(DASHBOARD_PATH)
                .map_err(|e| RegistryError::UrlParse {
                    context: "Failed to construct dashboard URL",
                    source: e,
                })?;
        Ok(Self {
            base_url,
            dashboard_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
        })
    }

    /// Returns the base URL used by this client.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the computed listing URL.
    pub const fn dashboard_url(&self) -> &Url {
        &self.dashboard_url
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reuses an existing HTTP client (and its connection pool).
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Fetches and normalizes the registry with exactly one `GET`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on transport failure, a non-2xx status, a
    /// non-JSON body, or a body that is neither a list nor a `chains`
    /// envelope.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "orbitdeck.registry.fetch", skip_all, err)
    )]
    pub async fn fetch(&self) -> Result<Vec<ChainRecord>, RegistryError> {
        let context = "GET /api/orbit-chain/dashboard";
        let mut req = self.client.get(self.dashboard_url.clone());
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| RegistryError::Http { context, source: e })?;

        let status = http_response.status();
        if !status.is_success() {
            let body = http_response
                .text()
                .await
                .map_err(|e| RegistryError::ResponseBodyRead { context, source: e })?;
            return Err(RegistryError::HttpStatus {
                context,
                status,
                body,
            });
        }

        let body = http_response
            .json::<Value>()
            .await
            .map_err(|e| RegistryError::JsonDeserialization { context, source: e })?;
        let records = record::parse_payload(&body)?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(count = records.len(), "Fetched chain registry");

        Ok(records)
    }

    /// Fetches the registry, substituting the sample set on any failure.
    pub async fn fetch_all(&self) -> RegistryFetch {
        match self.fetch().await {
            Ok(records) => RegistryFetch {
                records,
                source: RecordSource::Live,
            },
            Err(err) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(kind = %err.kind(), error = %err, "Chain registry unavailable, showing sample chains");
                RegistryFetch {
                    records: record::fallback_records(),
                    source: RecordSource::Fallback(Arc::new(err)),
                }
            }
        }
    }
}

/// Converts a string URL into a `RegistryClient`, normalizing the trailing slash.
impl TryFrom<&str> for RegistryClient {
    type Error = RegistryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| RegistryError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        Self::try_new(url)
    }
}

/// Registry records as shown on the dashboard.
///
/// Starts out with the sample set. A successful refresh replaces the records;
/// a failed one keeps whatever was last fetched successfully and only records
/// the error.
#[derive(Debug)]
pub struct Dashboard {
    client: RegistryClient,
    records: Vec<ChainRecord>,
    live: bool,
    last_error: Option<Arc<RegistryError>>,
}

impl Dashboard {
    /// Creates a dashboard showing the sample set.
    #[must_use]
    pub fn new(client: RegistryClient) -> Self {
        Self {
            client,
            records: record::fallback_records(),
            live: false,
            last_error: None,
        }
    }

    /// Re-fetches the registry.
    ///
    /// Returns the error if this refresh fell back.
    pub async fn refresh(&mut self) -> Option<Arc<RegistryError>> {
        let fetch = self.client.fetch_all().await;
        match fetch.source {
            RecordSource::Live => {
                self.records = fetch.records;
                self.live = true;
                self.last_error = None;
            }
            RecordSource::Fallback(err) => {
                if !self.live {
                    self.records = fetch.records;
                }
                self.last_error = Some(err);
            }
        }
        self.last_error.clone()
    }

    /// Records currently shown.
    #[must_use]
    pub fn records(&self) -> &[ChainRecord] {
        &self.records
    }

    /// Returns `true` once any refresh has succeeded.
    #[must_use]
    pub const fn has_live_data(&self) -> bool {
        self.live
    }

    /// Error from the most recent refresh, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&RegistryError> {
        self.last_error.as_deref()
    }

    /// Per-status counts of the shown records.
    #[must_use]
    pub fn summary(&self) -> StatusSummary {
        record::summarize(&self.records)
    }

    /// Renders one table page of the shown records.
    #[must_use]
    pub fn page(&self, view: &TableViewState) -> TablePage {
        table::apply(&self.records, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use orbitdeck::ErrorKind;
    use orbitdeck::record::ChainStatus;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, response: ResponseTemplate, hits: u64) {
        Mock::given(method("GET"))
            .and(path("/api/orbit-chain/dashboard"))
            .respond_with(response)
            .expect(hits)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> RegistryClient {
        RegistryClient::try_from(server.uri().as_str()).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_is_normalized() {
        let server = MockServer::start().await;
        let body = json!({"chains": [{"chain_id": 5, "chain_name": "X", "user_address": "0xabc"}]});
        mount(&server, ResponseTemplate::new(200).set_body_json(body), 1).await;

        let fetch = client_for(&server).fetch_all().await;
        assert!(fetch.is_live());
        assert_eq!(fetch.records.len(), 1);
        let record = &fetch.records[0];
        assert_eq!(record.chain_id, Some(5));
        assert_eq!(record.chain_name, "X");
        assert_eq!(record.owner_address, "0xabc");
        assert_eq!(record.status, ChainStatus::Unknown);
    }

    #[tokio::test]
    async fn test_bare_list_accepted() {
        let server = MockServer::start().await;
        let body = json!([
            {"chainId": "421613", "rollupName": "Legacy", "state": "PAUSED"},
            {"chain_id": 7, "chain_name": "Fresh", "status": "active"}
        ]);
        mount(&server, ResponseTemplate::new(200).set_body_json(body), 1).await;

        let records = client_for(&server).fetch().await.unwrap();
        assert_eq!(records[0].chain_id, Some(421_613));
        assert_eq!(records[0].chain_name, "Legacy");
        assert_eq!(records[0].status, ChainStatus::Paused);
        assert_eq!(records[1].status, ChainStatus::Active);
    }

    #[tokio::test]
    async fn test_server_error_falls_back_after_one_request() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(503).set_body_string("down"), 1).await;

        let fetch = client_for(&server).fetch_all().await;
        assert!(!fetch.is_live());
        assert_eq!(fetch.records, record::fallback_records());
        let err = fetch.error().unwrap();
        assert_eq!(err.kind(), ErrorKind::NetworkTransport);
        assert!(matches!(
            err,
            RegistryError::HttpStatus { status, .. } if *status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"data": []})),
            1,
        )
        .await;

        let fetch = client_for(&server).fetch_all().await;
        assert_eq!(fetch.records.len(), 3);
        assert_eq!(fetch.error().unwrap().kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string("<html>"), 1).await;
        let err = client_for(&server).fetch().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_empty_list_is_live_not_fallback() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(json!([])), 1).await;
        let fetch = client_for(&server).fetch_all().await;
        assert!(fetch.is_live());
        assert!(fetch.records.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back() {
        let client = RegistryClient::try_from("http://127.0.0.1:1")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let fetch = client.fetch_all().await;
        assert!(!fetch.is_live());
        assert_eq!(fetch.error().unwrap().kind(), ErrorKind::NetworkTransport);
    }

    #[test]
    fn test_url_normalization() {
        let client = RegistryClient::try_from("https://orbit.example/backend//").unwrap();
        assert_eq!(
            client.dashboard_url().as_str(),
            "https://orbit.example/backend/api/orbit-chain/dashboard"
        );
        assert!(RegistryClient::try_from("not a url").is_err());
    }

    #[tokio::test]
    async fn test_dashboard_keeps_last_known_good() {
        let server = MockServer::start().await;
        let live = json!([{"chain_id": 99, "chain_name": "Live", "status": "deploying"}]);
        Mock::given(method("GET"))
            .and(path("/api/orbit-chain/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(live))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/orbit-chain/dashboard"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut dashboard = Dashboard::new(client_for(&server));
        assert_eq!(dashboard.records().len(), 3);
        assert!(!dashboard.has_live_data());

        assert!(dashboard.refresh().await.is_none());
        assert_eq!(dashboard.records()[0].chain_name, "Live");
        assert_eq!(dashboard.summary().deploying, 1);

        let err = dashboard.refresh().await;
        assert!(err.is_some());
        assert_eq!(dashboard.records().len(), 1);
        assert_eq!(dashboard.records()[0].chain_name, "Live");
        assert!(dashboard.last_error().is_some());
        assert_eq!(dashboard.page(&TableViewState::default()).total_items, 1);
    }

    #[tokio::test]
    async fn test_dashboard_falls_back_before_first_success() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(500), 1).await;
        let mut dashboard = Dashboard::new(client_for(&server));
        assert!(dashboard.refresh().await.is_some());
        assert_eq!(dashboard.records(), record::fallback_records().as_slice());
        assert_eq!(dashboard.summary().paused, 1);
    }
}
