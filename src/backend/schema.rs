//! Protobuf schema of the backend services.
//!
//! # Responsibilities
//! - Load the compiled `FileDescriptorSet` named by `rpc.descriptor_set`
//! - Resolve a method path to its request and reply message types
//! - Report catalogue methods the schema does not describe

use std::fs;
use std::path::Path;

use prost_reflect::{DescriptorPool, MethodDescriptor};
use thiserror::Error;

use crate::resources::catalog;

/// Failure to load or query the backend schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("rpc.descriptor_set is not configured")]
    NotConfigured,

    #[error("failed to read descriptor set {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor set {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("method '{0}' is not described by the descriptor set")]
    UnknownMethod(String),
}

/// Descriptor pool shared by every backend transport.
#[derive(Debug, Clone)]
pub struct ServiceSchema {
    pool: DescriptorPool,
}

impl ServiceSchema {
    pub fn new(pool: DescriptorPool) -> Self {
        Self { pool }
    }

    /// Read a binary `FileDescriptorSet` (as written by `protoc --descriptor_set_out`).
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let display = path.display().to_string();
        let bytes = fs::read(path).map_err(|source| SchemaError::Read {
            path: display.clone(),
            source,
        })?;
        let pool = DescriptorPool::decode(bytes.as_slice()).map_err(|e| SchemaError::Decode {
            path: display,
            reason: e.to_string(),
        })?;
        Ok(Self::new(pool))
    }

    /// Method for a path such as `/user_service.StudentService/GetById`.
    pub fn method(&self, path: &str) -> Result<MethodDescriptor, SchemaError> {
        let unknown = || SchemaError::UnknownMethod(path.to_string());
        let (service, method) = path
            .trim_start_matches('/')
            .split_once('/')
            .ok_or_else(unknown)?;
        self.pool
            .get_service_by_name(service)
            .and_then(|s| s.methods().find(|m| m.name() == method))
            .ok_or_else(unknown)
    }

    /// Catalogue method paths with no matching method in the schema.
    pub fn missing_methods(&self) -> Vec<String> {
        catalog::all()
            .iter()
            .flat_map(|d| d.operations.iter().map(move |op| d.method_path(op)))
            .filter(|path| self.method(path).is_err())
            .collect()
    }
}
