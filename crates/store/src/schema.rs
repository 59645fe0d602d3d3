#![cfg(feature = "scylla-backend")]
//! Keyspace and table DDL for the networked store backend.

use scylla::Session;

use crate::error::{Result, StoreError};

pub async fn create_keyspace(session: &Session, keyspace: &str, replication_factor: u8) -> Result<()> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {replication_factor}}}"
    );
    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(())
}

pub async fn create_tables(session: &Session, keyspace: &str) -> Result<()> {
    let sessions = format!(
        "CREATE TABLE IF NOT EXISTS {keyspace}.sessions (
            id text PRIMARY KEY,
            user_id text,
            created_at text,
            last_activity text,
            context text,
            request_count int,
            request_window_start text,
            metadata text
        ) WITH default_time_to_live = 86400"
    );
    session
        .query_unpaged(sessions, &[])
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    let cache = format!(
        "CREATE TABLE IF NOT EXISTS {keyspace}.cache (
            key text PRIMARY KEY,
            query_type text,
            response_data text,
            created_at text,
            ttl_seconds int
        )"
    );
    session
        .query_unpaged(cache, &[])
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(())
}
