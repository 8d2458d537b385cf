// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration
//!
//! Loaded from TOML. Every section is optional and falls back to defaults.

use crate::ledger::DEFAULT_ABANDON_AFTER;
use crate::query::Namespace;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Certificate file name looked up in the working directory
pub const CERTIFICATE_FILE_NAME: &str = "mongocert.pem";

/// Fallback certificate location
pub const SYSTEM_CERTIFICATE_PATH: &str = "/etc/ssl/certs/mongocert.pem";

/// Errors from loading or resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("client certificate not found (searched: {})", display_paths(.searched))]
    CertificateNotFound { searched: Vec<PathBuf> },
    #[error("not a PEM certificate: {}", .0.display())]
    InvalidCertificate(PathBuf),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub retry: RetryConfig,
    pub drain: DrainConfig,
    pub groups: GroupConfig,
    /// Collection name to database overrides
    pub routes: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.database.is_empty() {
            return Err(ConfigError::Invalid(
                "connection.database must not be empty".to_string(),
            ));
        }
        if self.connection.hosts.is_empty() {
            return Err(ConfigError::Invalid(
                "connection.hosts must not be empty".to_string(),
            ));
        }
        if self.retry.read_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.read_attempts must be at least 1".to_string(),
            ));
        }
        if self.drain.abandon_after == 0 {
            return Err(ConfigError::Invalid(
                "drain.abandon_after must be at least 1".to_string(),
            ));
        }
        if self.drain.interval.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::Invalid(
                "drain.interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Database a collection lives in
    pub fn database_for(&self, collection: &str) -> &str {
        self.routes
            .get(collection)
            .map(String::as_str)
            .unwrap_or(&self.connection.database)
    }

    pub fn namespace(&self, collection: &str) -> Namespace {
        Namespace::new(self.database_for(collection), collection)
    }
}

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Comma-separated `host:port` list
    pub hosts: String,
    pub replica_set: String,
    pub database: String,
    /// Explicit client certificate; otherwise looked up at startup
    pub certificate: Option<PathBuf>,
    /// Upper bound on connection establishment
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hosts: "localhost:27017".to_string(),
            replica_set: "rs0".to_string(),
            database: "logs".to_string(),
            certificate: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectionConfig {
    /// Connection URI for X.509 authentication against a replica set
    pub fn uri(&self, certificate: &Path) -> String {
        format!(
            "mongodb://{}/{}?tls=true&replicaSet={}&authSource=%24external\
             &authMechanism=MONGODB-X509&retryWrites=true&w=majority\
             &tlsCertificateKeyFile={}",
            self.hosts,
            self.database,
            self.replica_set,
            certificate.display()
        )
    }

    /// Candidate certificate paths in lookup order
    pub fn certificate_candidates(&self, cwd: &Path) -> Vec<PathBuf> {
        match &self.certificate {
            Some(explicit) if explicit.is_absolute() => vec![explicit.clone()],
            Some(relative) => vec![cwd.join(relative)],
            None => vec![
                cwd.join(CERTIFICATE_FILE_NAME),
                PathBuf::from(SYSTEM_CERTIFICATE_PATH),
            ],
        }
    }

    /// Find the client certificate and check it holds PEM data
    pub fn resolve_certificate(&self, cwd: &Path) -> Result<PathBuf, ConfigError> {
        let candidates = self.certificate_candidates(cwd);
        let Some(found) = candidates.iter().find(|p| p.is_file()) else {
            return Err(ConfigError::CertificateNotFound {
                searched: candidates,
            });
        };

        let content = std::fs::read_to_string(found)?;
        if !content.contains("-----BEGIN ") {
            return Err(ConfigError::InvalidCertificate(found.clone()));
        }
        Ok(found.clone())
    }
}

/// Read-side retry budget
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempts per read call
    pub read_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { read_attempts: 3 }
    }
}

/// Ledger drain behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrainConfig {
    /// Failed drains after which a batch is dropped
    pub abandon_after: u16,
    /// Periodic drain interval; absent means drain only after successful writes
    #[serde(with = "humantime_serde")]
    pub interval: Option<Duration>,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            abandon_after: DEFAULT_ABANDON_AFTER,
            interval: None,
        }
    }
}

/// Fields used by grouped and per-label queries
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupConfig {
    pub label_field: String,
    pub date_field: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            label_field: "jobHub".to_string(),
            date_field: "Date of posting".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
