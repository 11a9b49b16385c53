//! Console commands.
//!
//! Each command takes the loaded [`ConsoleConfig`] and returns a serializable
//! report; the binary only parses arguments and prints.

use orbitdeck::ErrorKind;
use orbitdeck::deploy::DeploymentForm;
use orbitdeck::networks::SupportedChain;
use orbitdeck::record::StatusSummary;
use orbitdeck::table::{SortDirection, SortField, StatusFilter, TablePage, TableViewState};
use orbitdeck_http::{
    Dashboard, DeployError, DeploymentSubmitter, RegistryClient, RegistryError, SubmitOutcome,
};
use serde::Serialize;
use serde_json::Value;

use crate::config::{ConfigError, ConsoleConfig};

/// Errors surfaced by a console command.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Registry client could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Deployment failed.
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

impl ConsoleError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Deploy(e) => e.kind(),
        }
    }
}

/// Table settings for [`list_chains`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainsQuery {
    /// Case-insensitive text filter.
    pub filter: Option<String>,
    /// Status tab.
    pub status: StatusFilter,
    /// Sort column; unsorted when `None`.
    pub sort: Option<SortField>,
    /// Sort descending instead of ascending.
    pub descending: bool,
    /// Zero-based page.
    pub page: usize,
    /// Rows per page; the configured size when `None`.
    pub page_size: Option<usize>,
}

impl ChainsQuery {
    /// Builds the table view this query describes.
    ///
    /// The page is applied last, since every other setting resets it.
    #[must_use]
    pub fn view(&self, default_page_size: usize) -> TableViewState {
        let mut view = TableViewState::with_page_size(self.page_size.unwrap_or(default_page_size));
        if let Some(filter) = &self.filter {
            view.set_filter_text(filter.as_str());
        }
        view.set_status_filter(self.status);
        if let Some(field) = self.sort {
            let direction = if self.descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            view.set_sort(field, direction);
        }
        view.go_to_page(self.page);
        view
    }
}

/// Output of [`list_chains`].
#[derive(Debug, Clone, Serialize)]
pub struct ChainsReport {
    /// `false` when the sample set is shown.
    pub live: bool,
    /// Why the registry fetch fell back, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// The requested page.
    #[serde(flatten)]
    pub page: TablePage,
}

/// Output of [`summarize_chains`].
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    /// `false` when the sample set is counted.
    pub live: bool,
    /// Why the registry fetch fell back, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Per-status counts.
    #[serde(flatten)]
    pub summary: StatusSummary,
}

/// Output of [`deploy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeployReport {
    /// The service accepted the request.
    Accepted {
        /// Response body as returned by the service.
        response: Value,
    },
    /// Another submission was already in flight.
    Busy,
}

impl From<SubmitOutcome> for DeployReport {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Accepted(response) => Self::Accepted { response },
            SubmitOutcome::Busy => Self::Busy,
        }
    }
}

async fn load_dashboard(config: &ConsoleConfig) -> Result<(Dashboard, Option<String>), ConsoleError> {
    let mut client = RegistryClient::try_new(config.base_url()?)?;
    if let Some(timeout) = config.timeout() {
        client = client.with_timeout(timeout);
    }
    let mut dashboard = Dashboard::new(client);
    let warning = dashboard.refresh().await.map(|err| {
        #[cfg(feature = "telemetry")]
        tracing::warn!(error = %err, "Showing sample chains");
        err.to_string()
    });
    Ok((dashboard, warning))
}

/// Fetches the registry and renders one page of the chain table.
///
/// A failed fetch is not an error: the sample set is shown with a warning.
///
/// # Errors
///
/// Returns [`ConsoleError`] if the configured URL is unusable.
pub async fn list_chains(
    config: &ConsoleConfig,
    query: &ChainsQuery,
) -> Result<ChainsReport, ConsoleError> {
    let (dashboard, warning) = load_dashboard(config).await?;
    Ok(ChainsReport {
        live: dashboard.has_live_data(),
        warning,
        page: dashboard.page(&query.view(config.page_size)),
    })
}

/// Fetches the registry and counts records per status.
///
/// # Errors
///
/// Returns [`ConsoleError`] if the configured URL is unusable.
pub async fn summarize_chains(config: &ConsoleConfig) -> Result<SummaryReport, ConsoleError> {
    let (dashboard, warning) = load_dashboard(config).await?;
    Ok(SummaryReport {
        live: dashboard.has_live_data(),
        warning,
        summary: dashboard.summary(),
    })
}

/// Built-in wallet networks plus the configured extras, by chain id.
#[must_use]
pub fn list_networks(config: &ConsoleConfig) -> Vec<SupportedChain> {
    orbitdeck_evm::default_catalog()
        .with_chains(config.networks.iter().cloned())
        .iter()
        .cloned()
        .collect()
}

/// Validates and submits a deployment on behalf of `wallet_address`.
///
/// # Errors
///
/// Returns [`ConsoleError::Deploy`] for validation, transport, or service
/// rejection failures.
pub async fn deploy(
    config: &ConsoleConfig,
    form: &DeploymentForm,
    wallet_address: Option<&str>,
) -> Result<DeployReport, ConsoleError> {
    let mut submitter = DeploymentSubmitter::try_new(&config.base_url()?)?;
    if let Some(timeout) = config.timeout() {
        submitter = submitter.with_timeout(timeout);
    }
    let outcome = submitter.submit(form, wallet_address).await?;
    Ok(outcome.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitdeck::deploy::ValidationError;
    use orbitdeck::record::ChainStatus;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ConsoleConfig {
        ConsoleConfig {
            api_url: server.uri(),
            ..ConsoleConfig::default()
        }
    }

    fn registry_body() -> Value {
        json!({
            "chains": [
                {"chain_id": 7, "chain_name": "Beta", "owner_address": "0xb", "status": "active"},
                {"chain_id": 3, "chain_name": "alpha", "owner_address": "0xa", "status": "paused"},
                {"chainId": "0x10", "name": "Gamma", "ownerAddress": "0xc", "status": "deploying"}
            ]
        })
    }

    #[test]
    fn test_query_view_keeps_requested_page() {
        let query = ChainsQuery {
            filter: Some("a".into()),
            sort: Some(SortField::ChainName),
            descending: true,
            page: 2,
            page_size: Some(5),
            ..ChainsQuery::default()
        };
        let view = query.view(10);
        assert_eq!(view.page_index(), 2);
        assert_eq!(view.page_size(), 5);
        assert_eq!(view.filter_text(), "a");
        assert_eq!(view.sort_direction(), SortDirection::Descending);
    }

    #[tokio::test]
    async fn test_list_chains_live() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orbit-chain/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(registry_body()))
            .expect(1)
            .mount(&server)
            .await;

        let query = ChainsQuery {
            sort: Some(SortField::ChainName),
            ..ChainsQuery::default()
        };
        let report = list_chains(&config_for(&server), &query).await.unwrap();
        assert!(report.live);
        assert!(report.warning.is_none());
        let names: Vec<_> = report.page.rows.iter().map(|r| r.chain_name.as_str()).collect();
        assert_eq!(names, ["alpha", "Beta", "Gamma"]);
        assert_eq!(report.page.rows[2].chain_id, Some(16));
    }

    #[tokio::test]
    async fn test_list_chains_falls_back_with_warning() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let query = ChainsQuery {
            status: StatusFilter::Paused,
            ..ChainsQuery::default()
        };
        let report = list_chains(&config_for(&server), &query).await.unwrap();
        assert!(!report.live);
        assert!(report.warning.is_some());
        assert_eq!(report.page.total_items, 1);
        assert_eq!(report.page.rows[0].status, ChainStatus::Paused);

        let rendered = serde_json::to_value(&report).unwrap();
        assert_eq!(rendered["live"], json!(false));
        assert_eq!(rendered["total_pages"], json!(1));
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orbit-chain/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(registry_body()))
            .mount(&server)
            .await;

        let report = summarize_chains(&config_for(&server)).await.unwrap();
        assert!(report.live);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.active, 1);
        assert_eq!(report.summary.deploying, 1);
    }

    #[test]
    fn test_networks_merge_configured_entries() {
        let extra = SupportedChain {
            chain_id: 39713,
            name: "Zora Network".into(),
            native_symbol: "ETH".into(),
            native_decimals: 18,
            explorer_base_url: "https://explorer.zora.energy".into(),
            rpc_url: "https://rpc.zora.energy".into(),
        };
        let config = ConsoleConfig {
            networks: vec![extra.clone()],
            ..ConsoleConfig::default()
        };
        let networks = list_networks(&config);
        assert_eq!(networks.len(), orbitdeck_evm::SUPPORTED_CHAINS.len() + 1);
        assert!(networks.contains(&extra));
        assert!(networks.windows(2).all(|w| w[0].chain_id < w[1].chain_id));
    }

    #[tokio::test]
    async fn test_deploy_reports_acceptance() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orbit-chain/deploy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let report = deploy(
            &config_for(&server),
            &DeploymentForm::new("Zora Network", "39713"),
            Some("0x123"),
        )
        .await
        .unwrap();
        assert_eq!(
            report,
            DeployReport::Accepted {
                response: json!({"ok": true})
            }
        );
        assert_eq!(
            serde_json::to_value(&report).unwrap()["status"],
            json!("accepted")
        );
    }

    #[tokio::test]
    async fn test_deploy_without_wallet_is_validation_error() {
        let server = MockServer::start().await;
        let err = deploy(&config_for(&server), &DeploymentForm::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Deploy(DeployError::Validation(ValidationError::MissingWallet))
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
