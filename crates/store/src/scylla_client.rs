#![cfg(feature = "scylla-backend")]
//! Thin ScyllaDB connection wrapper, grounded on the networked-store client
//! pattern: a resolved `scylla::Session` plus the keyspace it was set up
//! against.

use scylla::{Session, SessionBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub replication_factor: u8,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["127.0.0.1:9042".to_string()],
            keyspace: "mdgate".to_string(),
            replication_factor: 1,
        }
    }
}

pub struct ScyllaClient {
    session: Session,
    config: ScyllaConfig,
}

impl ScyllaClient {
    pub async fn connect(config: ScyllaConfig) -> Result<Self> {
        let session = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .build()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { session, config })
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        crate::schema::create_keyspace(&self.session, &self.config.keyspace, self.config.replication_factor)
            .await?;
        crate::schema::create_tables(&self.session, &self.config.keyspace).await?;
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn keyspace(&self) -> &str {
        &self.config.keyspace
    }
}
