//! Error types for the sync agent

use thiserror::Error;

use crate::auth::AuthError;
use crate::reconciler::ActionKind;

/// Failure of a single call to the server list or mc-router
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to authenticate request: {0}")]
    Auth(#[from] AuthError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which side of the reconciliation a fetch was reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    ServerList,
    McRouter,
}

impl std::fmt::Display for StateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateSource::ServerList => write!(f, "server list"),
            StateSource::McRouter => write!(f, "mc-router routes"),
        }
    }
}

/// Failure of a reconciliation pass
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Desired or current state could not be read; nothing was applied
    #[error("failed to fetch {source_name}: {source}")]
    Fetch {
        source_name: StateSource,
        #[source]
        source: ClientError,
    },

    /// An action was rejected; earlier actions in the pass stay applied
    #[error("failed to {kind} route {server_address}: {source}")]
    Apply {
        kind: ActionKind,
        server_address: String,
        #[source]
        source: ClientError,
    },
}

impl ReconcileError {
    /// Address of the route whose action failed, if this is an apply error
    pub fn server_address(&self) -> Option<&str> {
        match self {
            ReconcileError::Apply { server_address, .. } => Some(server_address),
            ReconcileError::Fetch { .. } => None,
        }
    }
}

/// Invalid startup configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{flag} is invalid: {reason}")]
    InvalidUrl { flag: &'static str, reason: String },

    #[error("auth-token is required when auth-type is {0}")]
    MissingApiKey(crate::auth::AuthType),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
