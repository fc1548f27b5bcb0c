//! Backend connection registry.
//!
//! # Responsibilities
//! - Dial every configured backend once, sharing channels between groups with the same address and TLS settings
//! - Record per-group failures without aborting startup
//! - Resolve a resource kind to its shared transport on the hot path
//!
//! # Design Decisions
//! - Populated before serving, read-only afterwards (no locks)
//! - A missing connection only affects the resources routed to that group

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::backend::connection::{Dialer, RpcTransport};
use crate::backend::error::ConnectionError;
use crate::config::{BackendConfig, BackendTlsConfig};
use crate::observability::metrics;
use crate::resources::ResourceKind;

/// Identity of a channel: groups share one only when both fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChannelKey {
    address: String,
    tls: Option<BackendTlsConfig>,
}

impl ChannelKey {
    fn of(backend: &BackendConfig) -> Self {
        Self {
            address: backend.address.clone(),
            tls: backend.tls.clone(),
        }
    }
}

/// Connection outcome for one backend group.
#[derive(Debug, Clone)]
enum GroupState {
    Connected { key: ChannelKey },
    Failed { address: String, error: ConnectionError },
}

/// Per-group status reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStatus {
    pub group: String,
    pub address: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Owns every backend transport for the process lifetime.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// (address, tls) → shared transport
    connections: HashMap<ChannelKey, Arc<dyn RpcTransport>>,
    /// backend group → outcome
    groups: HashMap<String, GroupState>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dial every backend. Failures are logged and recorded, never returned.
    pub async fn connect_all(backends: &[BackendConfig], dialer: &dyn Dialer) -> Self {
        let mut registry = Self::new();
        for backend in backends {
            if let Err(e) = registry.connect(backend, dialer).await {
                tracing::error!(
                    group = %backend.name,
                    address = %backend.address,
                    error = %e,
                    "Backend unreachable; its resources will answer with errors"
                );
            }
        }
        registry
    }

    /// Connect a backend group, reusing an existing channel for the same address and TLS settings.
    pub async fn connect(
        &mut self,
        backend: &BackendConfig,
        dialer: &dyn Dialer,
    ) -> Result<Arc<dyn RpcTransport>, ConnectionError> {
        let key = ChannelKey::of(backend);
        if let Some(existing) = self.connections.get(&key) {
            tracing::debug!(
                group = %backend.name,
                address = %backend.address,
                "Reusing backend channel"
            );
            let transport = existing.clone();
            self.mark_connected(&backend.name, key);
            return Ok(transport);
        }

        match dialer.dial(backend).await {
            Ok(transport) => {
                self.connections.insert(key.clone(), transport.clone());
                self.mark_connected(&backend.name, key);
                Ok(transport)
            }
            Err(error) => {
                metrics::record_backend_connected(&backend.name, false);
                self.groups.insert(
                    backend.name.clone(),
                    GroupState::Failed {
                        address: backend.address.clone(),
                        error: error.clone(),
                    },
                );
                Err(error)
            }
        }
    }

    fn mark_connected(&mut self, group: &str, key: ChannelKey) {
        metrics::record_backend_connected(group, true);
        self.groups
            .insert(group.to_string(), GroupState::Connected { key });
    }

    /// Register a ready plaintext transport for a group.
    pub fn insert(&mut self, group: impl Into<String>, transport: Arc<dyn RpcTransport>) {
        let key = ChannelKey {
            address: transport.address().to_string(),
            tls: None,
        };
        self.connections.insert(key.clone(), transport);
        self.groups.insert(group.into(), GroupState::Connected { key });
    }

    /// Shared transport for a resource kind.
    pub fn get(&self, kind: ResourceKind) -> Result<Arc<dyn RpcTransport>, ConnectionError> {
        self.group(kind.descriptor().backend_group)
    }

    /// Shared transport for a backend group.
    pub fn group(&self, group: &str) -> Result<Arc<dyn RpcTransport>, ConnectionError> {
        let not_connected = || ConnectionError::NotConnected {
            group: group.to_string(),
        };
        match self.groups.get(group) {
            Some(GroupState::Connected { key }) => self
                .connections
                .get(key)
                .cloned()
                .ok_or_else(not_connected),
            _ => Err(not_connected()),
        }
    }

    /// Number of distinct channels held.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Status of every known group, sorted by name.
    pub fn statuses(&self) -> Vec<GroupStatus> {
        let mut statuses: Vec<GroupStatus> = self
            .groups
            .iter()
            .map(|(group, state)| match state {
                GroupState::Connected { key } => GroupStatus {
                    group: group.clone(),
                    address: key.address.clone(),
                    connected: true,
                    error: None,
                },
                GroupState::Failed { address, error } => GroupStatus {
                    group: group.clone(),
                    address: address.clone(),
                    connected: false,
                    error: Some(error.to_string()),
                },
            })
            .collect();
        statuses.sort_by(|a, b| a.group.cmp(&b.group));
        statuses
    }

    /// True when every known group is connected.
    pub fn all_connected(&self) -> bool {
        self.groups
            .values()
            .all(|s| matches!(s, GroupState::Connected { .. }))
    }
}
