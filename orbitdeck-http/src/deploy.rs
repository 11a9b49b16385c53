//! Deployment submission (`POST /api/orbit-chain/deploy`).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use http::HeaderMap;
use orbitdeck::deploy::{DeployRequest, DeploymentForm};
use reqwest::Client;
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::constants::DEPLOY_PATH;
use crate::error::DeployError;

/// Result of a [`DeploymentSubmitter::submit`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service accepted the request. Carries the response body: parsed
    /// JSON when possible, the raw text otherwise, `null` when empty.
    Accepted(Value),
    /// Another submission was in flight; this call did nothing.
    Busy,
}

/// Clears the busy flag when a submission ends, including when its future is
/// dropped.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits deployment requests, one at a time.
///
/// Clones share the busy flag, so the one-in-flight rule holds across them.
#[derive(Clone, Debug)]
pub struct DeploymentSubmitter {
    /// Full URL of the deploy endpoint
    deploy_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Optional custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
    /// Set while a submission is in flight
    busy: Arc<AtomicBool>,
}

impl DeploymentSubmitter {
    /// Constructs a submitter from the backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::UrlParse`] if the endpoint URL cannot be built.
    pub fn try_new(base_url: &Url) -> Result<Self, DeployError> {
        let deploy_url = base_url
            .join(DEPLOY_PATH)
            .map_err(|e| DeployError::UrlParse {
                context: "Failed to construct deploy URL",
                source: e,
            })?;
        Ok(Self {
            deploy_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
            busy: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the computed endpoint URL.
    pub const fn deploy_url(&self) -> &Url {
        &self.deploy_url
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

    /// Returns `true` while a submission is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validates `form` against the connected wallet and posts it.
    ///
    /// Returns [`SubmitOutcome::Busy`] without doing anything if another
    /// submission is in flight.
    ///
    /// # Errors
    ///
    /// - [`DeployError::Validation`] if no wallet address is given or the
    ///   chain id is not numeric; no request is sent
    /// - [`DeployError::Transport`] if the service cannot be reached
    /// - [`DeployError::Rejected`] with the response body for a non-2xx status
    pub async fn submit(
        &self,
        form: &DeploymentForm,
        wallet_address: Option<&str>,
    ) -> Result<SubmitOutcome, DeployError> {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            #[cfg(feature = "telemetry")]
            tracing::debug!("Deployment already in flight, ignoring submit");
            return Ok(SubmitOutcome::Busy);
        };
        let request = form.to_request(wallet_address)?;
        self.post(&request).await.map(SubmitOutcome::Accepted)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "orbitdeck.deploy.submit",
            skip_all,
            fields(chain_id = request.chain_id),
            err
        )
    )]
    async fn post(&self, request: &DeployRequest) -> Result<Value, DeployError> {
        let context = "POST /api/orbit-chain/deploy";
        let mut req = self.client.post(self.deploy_url.clone()).json(request);
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| DeployError::Transport { context, source: e })?;

        let status = http_response.status();
        let body = http_response
            .text()
            .await
            .map_err(|e| DeployError::ResponseBodyRead { context, source: e })?;
        if !status.is_success() {
            return Err(DeployError::Rejected { status, body });
        }
        Ok(parse_body(body))
    }
}

fn parse_body(body: String) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use orbitdeck::ErrorKind;
    use orbitdeck::deploy::ValidationError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn submitter_for(server: &MockServer) -> DeploymentSubmitter {
        let base = format!("{}/", server.uri()).parse::<Url>().unwrap();
        DeploymentSubmitter::try_new(&base).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_chain_id_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let form = DeploymentForm::new("Test", "abc");
        let err = submitter_for(&server)
            .submit(&form, Some("0x123"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeployError::Validation(ValidationError::InvalidChainId(_))
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_wallet_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = submitter_for(&server)
            .submit(&DeploymentForm::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeployError::Validation(ValidationError::MissingWallet)
        ));
    }

    #[tokio::test]
    async fn test_posts_wire_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orbit-chain/deploy"))
            .and(body_json(json!({
                "chain_id": 39713,
                "chain_name": "Zora Network",
                "user_address": "0x123"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"job_id": "j-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let form = DeploymentForm::new("Zora Network", "39713");
        let outcome = submitter_for(&server)
            .submit(&form, Some("0x123"))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted(json!({"job_id": "j-1"})));
    }

    #[tokio::test]
    async fn test_rejection_surfaces_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orbit-chain/deploy"))
            .respond_with(ResponseTemplate::new(409).set_body_string("chain id already taken"))
            .mount(&server)
            .await;

        let err = submitter_for(&server)
            .submit(&DeploymentForm::new("Dup", "10"), Some("0x123"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "chain id already taken");
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert!(matches!(err, DeployError::Rejected { status, .. } if status == StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic() {
        let base = "http://127.0.0.1:1/".parse::<Url>().unwrap();
        let submitter = DeploymentSubmitter::try_new(&base)
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let err = submitter
            .submit(&DeploymentForm::new("X", "1"), Some("0x123"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkTransport);
        assert_eq!(
            err.to_string(),
            "Could not reach the deployment service. Please try again."
        );
        assert!(!submitter.is_busy());
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orbit-chain/deploy"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = submitter_for(&server);
        let first = tokio::spawn({
            let submitter = submitter.clone();
            async move {
                submitter
                    .submit(&DeploymentForm::new("A", "1"), Some("0x123"))
                    .await
            }
        });
        while !submitter.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = submitter
            .submit(&DeploymentForm::new("B", "2"), Some("0x123"))
            .await
            .unwrap();
        assert_eq!(second, SubmitOutcome::Busy);

        assert_eq!(first.await.unwrap().unwrap(), SubmitOutcome::Accepted(Value::Null));
        assert!(!submitter.is_busy());
    }

    #[test]
    fn test_parse_body_shapes() {
        assert_eq!(parse_body(String::new()), Value::Null);
        assert_eq!(parse_body("{\"ok\":true}".into()), json!({"ok": true}));
        assert_eq!(parse_body("queued".into()), json!("queued"));
    }
}
