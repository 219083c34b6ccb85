//! mc-router Sync Agent Library
//!
//! Keeps the route table of an mc-router instance converged on the routes
//! published by a server list API.
//!
//! ## Architecture
//!
//! - **Server list**: authoritative desired state (`ServerList`)
//! - **mc-router**: live route table being corrected (`McRouter`)
//! - **Reconciler**: diff -> plan -> apply, on a fixed interval
//! - **Health**: liveness endpoint for orchestrator probes

pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod mc_router;
pub mod reconciler;
pub mod route;
pub mod server_list;

pub use auth::{build_authenticator, ApiKeyAuth, AuthType, Authenticator, NoneAuth};
pub use config::{Args, SyncConfig};
pub use error::{ClientError, ConfigError, ReconcileError};
pub use mc_router::{McRouter, McRouterClient};
pub use reconciler::{Action, ActionKind, Diff, PassReport, Reconciler};
pub use route::{Route, Routes};
pub use server_list::{ServerList, ServerListClient};
