//! Diff Engine
//!
//! Joins the desired and current route sets on server address.

use serde::Serialize;

use crate::route::{route_map, Route};

/// Membership and backends of one server address on both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diff {
    pub server_address: String,
    /// Backend from the server list; empty when `in_desired` is false
    pub desired_backend: String,
    /// Backend mc-router currently has; empty when `in_current` is false
    pub current_backend: String,
    pub in_desired: bool,
    pub in_current: bool,
}

impl Diff {
    fn new(server_address: &str, desired: Option<&str>, current: Option<&str>) -> Self {
        Self {
            server_address: server_address.to_string(),
            desired_backend: desired.unwrap_or_default().to_string(),
            current_backend: current.unwrap_or_default().to_string(),
            in_desired: desired.is_some(),
            in_current: current.is_some(),
        }
    }

    /// Present on both sides with the same backend
    pub fn is_in_sync(&self) -> bool {
        self.in_desired && self.in_current && self.desired_backend == self.current_backend
    }
}

/// Build one `Diff` per address present in either set.
///
/// Desired addresses come first in server list order, followed by addresses
/// only mc-router knows about, in the order mc-router returned them.
pub fn compute_diffs(desired: &[Route], current: &[Route]) -> Vec<Diff> {
    let desired = route_map(desired);
    let current = route_map(current);

    let mut diffs = Vec::with_capacity(desired.len() + current.len());

    for (&address, &backend) in &desired {
        diffs.push(Diff::new(address, Some(backend), current.get(address).copied()));
    }

    for (&address, &backend) in &current {
        if !desired.contains_key(address) {
            diffs.push(Diff::new(address, None, Some(backend)));
        }
    }

    diffs
}
