//! Endpoint paths and defaults for the OrbitDeck backend.

/// Registry listing, relative to the API base URL.
pub const DASHBOARD_PATH: &str = "./api/orbit-chain/dashboard";

/// Deployment submission, relative to the API base URL.
pub const DEPLOY_PATH: &str = "./api/orbit-chain/deploy";

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/";
