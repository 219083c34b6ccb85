//! Shared HTTP plumbing for the outbound clients

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::error::ClientError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the HTTP client used for all outbound calls
pub fn build_client(timeout: Duration) -> Result<Client, ClientError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mc-router-sync/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}

/// Pass the response through if its status is one of `accepted`,
/// otherwise turn it into `UnexpectedStatus` carrying the body.
pub async fn ensure_status(
    response: Response,
    accepted: &[StatusCode],
) -> Result<Response, ClientError> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    })
}
