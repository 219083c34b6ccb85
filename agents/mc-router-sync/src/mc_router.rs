//! mc-router API Client
//!
//! Reads and mutates the live route table of an mc-router instance through
//! its REST API (`/routes`).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::auth::{Authenticator, NoneAuth};
use crate::error::ClientError;
use crate::http::{build_client, ensure_status, DEFAULT_REQUEST_TIMEOUT};
use crate::route::{Route, Routes};

/// The route table being kept in sync
#[async_trait]
pub trait McRouter: Send + Sync {
    /// Read the current route set
    async fn get_routes(&self) -> Result<Routes, ClientError>;

    /// Create the route, or replace the backend of an existing one
    async fn register_route(&self, route: &Route) -> Result<(), ClientError>;

    /// Remove the route for `server_address`
    async fn delete_route(&self, server_address: &str) -> Result<(), ClientError>;
}

/// Body of `GET /routes`.
///
/// mc-router answers with an `{address: backend}` object; some deployments
/// front it with a proxy that returns a list of routes instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GetRoutesResponse {
    Mappings(BTreeMap<String, String>),
    List(Routes),
}

impl From<GetRoutesResponse> for Routes {
    fn from(response: GetRoutesResponse) -> Self {
        match response {
            GetRoutesResponse::Mappings(mappings) => parse_mappings(mappings),
            GetRoutesResponse::List(routes) => routes,
        }
    }
}

/// Convert an address -> backend mapping into routes, ordered by address
pub fn parse_mappings(mappings: BTreeMap<String, String>) -> Routes {
    mappings
        .into_iter()
        .map(|(server_address, backend)| Route {
            server_address,
            backend,
        })
        .collect()
}

/// HTTP client for the mc-router API
pub struct McRouterClient {
    host: String,
    client: Client,
    auth: Arc<dyn Authenticator>,
}

impl McRouterClient {
    /// Create a client with no authentication and the default timeout
    pub fn new(host: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(host, Arc::new(NoneAuth), DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_options(
        host: impl Into<String>,
        auth: Arc<dyn Authenticator>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let host: String = host.into();
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            client: build_client(timeout)?,
            auth,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn routes_url(&self) -> String {
        format!("{}/routes", self.host)
    }

    fn route_url(&self, server_address: &str) -> String {
        format!("{}/routes/{}", self.host, urlencoding::encode(server_address))
    }
}

#[async_trait]
impl McRouter for McRouterClient {
    async fn get_routes(&self) -> Result<Routes, ClientError> {
        let request = self
            .client
            .get(self.routes_url())
            .header(ACCEPT, "application/json");
        let request = self.auth.authenticate(request)?;

        let response = request.send().await?;
        let response = ensure_status(response, &[StatusCode::OK]).await?;

        let body = response.bytes().await?;
        let parsed: GetRoutesResponse = serde_json::from_slice(&body)?;
        let routes = Routes::from(parsed);

        debug!(host = %self.host, count = routes.len(), "Fetched mc-router routes");
        Ok(routes)
    }

    async fn register_route(&self, route: &Route) -> Result<(), ClientError> {
        let request = self.client.post(self.routes_url()).json(route);
        let request = self.auth.authenticate(request)?;

        let response = request.send().await?;
        ensure_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;

        Ok(())
    }

    async fn delete_route(&self, server_address: &str) -> Result<(), ClientError> {
        let request = self.client.delete(self.route_url(server_address));
        let request = self.auth.authenticate(request)?;

        let response = request.send().await?;
        ensure_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT]).await?;

        Ok(())
    }
}
