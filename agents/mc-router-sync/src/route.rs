//! Route Types
//!
//! The unit of synchronization: a server address mapped to a backend.
//! Both the server list and mc-router speak this type on the wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single route from a public server address to a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Hostname players connect with (e.g. "survival.example.com")
    pub server_address: String,
    /// Connection target mc-router forwards to (e.g. "10.0.0.5:25565")
    pub backend: String,
}

impl Route {
    pub fn new(server_address: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            backend: backend.into(),
        }
    }
}

/// A route set as transmitted over the wire
pub type Routes = Vec<Route>;

/// Collapse a route sequence into an address -> backend map.
///
/// Later entries overwrite earlier ones for the same address, but the
/// address keeps the position where it was first seen.
pub fn route_map(routes: &[Route]) -> IndexMap<&str, &str> {
    let mut map = IndexMap::with_capacity(routes.len());
    for route in routes {
        map.insert(route.server_address.as_str(), route.backend.as_str());
    }
    map
}
