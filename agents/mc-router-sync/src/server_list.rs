//! Server List Client
//!
//! Reads the desired route set from the external server list API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::auth::{Authenticator, NoneAuth};
use crate::error::ClientError;
use crate::http::{build_client, ensure_status, DEFAULT_REQUEST_TIMEOUT};
use crate::route::Routes;

/// Source of the desired route set
#[async_trait]
pub trait ServerList: Send + Sync {
    /// Fetch the full desired route set; never returns partial data
    async fn get_servers(&self) -> Result<Routes, ClientError>;
}

/// HTTP client for the server list API
pub struct ServerListClient {
    endpoint: String,
    client: Client,
    auth: Arc<dyn Authenticator>,
}

impl ServerListClient {
    /// Create a client with no authentication and the default timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(endpoint, Arc::new(NoneAuth), DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        auth: Arc<dyn Authenticator>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_client(timeout)?,
            auth,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ServerList for ServerListClient {
    async fn get_servers(&self) -> Result<Routes, ClientError> {
        let request = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json");
        let request = self.auth.authenticate(request)?;

        let response = request.send().await?;
        let response = ensure_status(response, &[StatusCode::OK]).await?;

        let body = response.bytes().await?;
        let routes: Routes = serde_json::from_slice(&body)?;

        debug!(endpoint = %self.endpoint, count = routes.len(), "Fetched server list");
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ApiKeyAuth, AuthError};
    use crate::route::Route;
    use reqwest::RequestBuilder;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FailingAuth;

    impl Authenticator for FailingAuth {
        fn authenticate(&self, _request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
            Err(AuthError::Failed("auth error".to_string()))
        }
    }

    fn servers_body() -> serde_json::Value {
        serde_json::json!([
            {"serverAddress": "server1.example.com", "backend": "backend1:25565"},
            {"serverAddress": "server2.example.com", "backend": "backend2:25565"}
        ])
    }

    #[test]
    fn test_new_server_list_client() {
        let client = ServerListClient::new("http://api.example.com/servers").unwrap();
        assert_eq!(client.endpoint(), "http://api.example.com/servers");
    }

    #[tokio::test]
    async fn test_get_servers_without_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/servers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(servers_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ServerListClient::new(format!("{}/api/servers", server.uri())).unwrap();
        let routes = client.get_servers().await.unwrap();

        assert_eq!(
            routes,
            vec![
                Route::new("server1.example.com", "backend1:25565"),
                Route::new("server2.example.com", "backend2:25565"),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_servers_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let auth = Arc::new(ApiKeyAuth::new("test-api-key").unwrap());
        let client =
            ServerListClient::with_options(server.uri(), auth, DEFAULT_REQUEST_TIMEOUT).unwrap();

        let routes = client.get_servers().await.unwrap();
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn test_get_servers_rejects_non_200() {
        for status in [401u16, 500] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;

            let client = ServerListClient::new(server.uri()).unwrap();
            let err = client.get_servers().await.unwrap_err();

            match err {
                ClientError::UnexpectedStatus { status: got, body } => {
                    assert_eq!(got, status);
                    assert_eq!(body, "nope");
                }
                other => panic!("expected UnexpectedStatus, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_get_servers_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = ServerListClient::new(server.uri()).unwrap();
        let err = client.get_servers().await.unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_servers_auth_failure_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            ServerListClient::with_options(server.uri(), Arc::new(FailingAuth), DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        let err = client.get_servers().await.unwrap_err();

        assert!(matches!(err, ClientError::Auth(AuthError::Failed(_))));
    }
}
