//! Action Planner
//!
//! Turns diffs into the mutations mc-router needs. Updates are expressed as
//! `Add`: mc-router's register endpoint replaces an existing route.

use serde::Serialize;

use super::diff::Diff;
use crate::route::Route;

/// Kind of mutation, used in logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Add,
    Delete,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Add => write!(f, "add"),
            ActionKind::Delete => write!(f, "delete"),
        }
    }
}

/// A single mutation against mc-router
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Create or update the route
    Add {
        server_address: String,
        backend: String,
    },
    /// Remove the route
    Delete { server_address: String },
}

impl Action {
    pub fn add(server_address: impl Into<String>, backend: impl Into<String>) -> Self {
        Action::Add {
            server_address: server_address.into(),
            backend: backend.into(),
        }
    }

    pub fn delete(server_address: impl Into<String>) -> Self {
        Action::Delete {
            server_address: server_address.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Add { .. } => ActionKind::Add,
            Action::Delete { .. } => ActionKind::Delete,
        }
    }

    pub fn server_address(&self) -> &str {
        match self {
            Action::Add { server_address, .. } | Action::Delete { server_address } => {
                server_address
            }
        }
    }

    /// The route to register, for `Add`
    pub fn route(&self) -> Option<Route> {
        match self {
            Action::Add {
                server_address,
                backend,
            } => Some(Route::new(server_address.clone(), backend.clone())),
            Action::Delete { .. } => None,
        }
    }
}

/// Plan the action for a single diff, if any
pub fn plan_one(diff: &Diff) -> Option<Action> {
    match (diff.in_desired, diff.in_current) {
        (true, false) => Some(Action::add(&diff.server_address, &diff.desired_backend)),
        (true, true) if diff.desired_backend != diff.current_backend => {
            Some(Action::add(&diff.server_address, &diff.desired_backend))
        }
        (false, true) => Some(Action::delete(&diff.server_address)),
        _ => None,
    }
}

/// Plan actions for all diffs, preserving diff order
pub fn plan(diffs: &[Diff]) -> Vec<Action> {
    diffs.iter().filter_map(plan_one).collect()
}
