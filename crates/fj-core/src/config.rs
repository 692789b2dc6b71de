// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide configuration (spec.md §6). Loading itself (reading env
//! vars) is `fj-daemon`'s job via `dotenvy`/`envy`; this struct only
//! defines the recognized keys and their defaults so every other crate
//! and every test can construct one without touching the environment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

fn default_concurrency() -> usize {
    4
}

fn default_job_timeout_secs() -> u64 {
    15 * 60
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_scheduler_lock_key() -> String {
    "fj:scheduler:leader".to_string()
}

fn default_scheduler_lock_ttl_secs() -> u64 {
    30
}

fn default_worker_id() -> String {
    format!(
        "{}-{}",
        hostname_fallback(),
        uuid::Uuid::new_v4().simple()
    )
}

fn hostname_fallback() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "worker".to_string())
}

fn default_registry_namespace() -> String {
    "fj".to_string()
}

fn default_heartbeat_interval_secs() -> u64 {
    10
}

fn default_heartbeat_ttl_secs() -> u64 {
    30
}

fn default_top_n_deals() -> usize {
    3
}

fn default_queue_group() -> String {
    "fj-workers".to_string()
}

fn default_queue_stream_prefix() -> String {
    "fj".to_string()
}

fn default_queue_block_timeout_ms() -> u64 {
    1_000
}

fn default_queue_visibility_timeout_secs() -> u64 {
    45
}

fn default_dead_letter_max_attempts() -> u32 {
    5
}

fn default_provider_call_timeout_secs() -> u64 {
    90
}

fn default_route_worker_job_timeout_secs() -> u64 {
    15 * 60
}

fn default_price_graph_sweep_delay_ms() -> u64 {
    750
}

fn default_database_url() -> String {
    "postgres://localhost/flight_jobs".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_provider_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_continuous_sweep_routes_path() -> String {
    "config/continuous_sweep_routes.json".to_string()
}

fn default_continuous_sweep_international_only() -> bool {
    false
}

/// Recognized configuration keys from spec.md §6, plus the Redis/Postgres
/// connection strings the ambient stack needs. Every field has a
/// sensible default so `Config::default()` (used pervasively in tests)
/// never needs a `.env` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    #[serde(default = "default_scheduler_lock_key")]
    pub scheduler_lock_key: String,
    #[serde(default = "default_scheduler_lock_ttl_secs")]
    pub scheduler_lock_ttl_secs: u64,

    #[serde(default = "default_worker_id")]
    pub worker_id: String,
    #[serde(default = "default_registry_namespace")]
    pub registry_namespace: String,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    #[serde(default = "default_heartbeat_ttl_secs")]
    pub heartbeat_ttl_secs: u64,

    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
    #[serde(default = "default_top_n_deals")]
    pub top_n_deals: usize,

    #[serde(default = "default_queue_group")]
    pub queue_group: String,
    #[serde(default = "default_queue_stream_prefix")]
    pub queue_stream_prefix: String,
    #[serde(default = "default_queue_block_timeout_ms")]
    pub queue_block_timeout_ms: u64,
    #[serde(default = "default_queue_visibility_timeout_secs")]
    pub queue_visibility_timeout_secs: u64,
    #[serde(default = "default_dead_letter_max_attempts")]
    pub dead_letter_max_attempts: u32,

    #[serde(default = "default_provider_call_timeout_secs")]
    pub provider_call_timeout_secs: u64,
    #[serde(default = "default_route_worker_job_timeout_secs")]
    pub route_worker_job_timeout_secs: u64,
    #[serde(default = "default_price_graph_sweep_delay_ms")]
    pub price_graph_sweep_delay_ms: u64,

    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Base URL of the third-party flights provider this process queries.
    /// The provider's own internals are out of scope (spec.md §1); this
    /// is only the address `fj-daemon`'s HTTP adapter dials.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Path to a JSON file listing the `{origin, destination}` route
    /// universe `ContinuousSweep` iterates (spec.md §4.7 "configurable
    /// route universe"). Relational/graph persistence for this is out
    /// of scope, so the universe is a flat file rather than a table.
    #[serde(default = "default_continuous_sweep_routes_path")]
    pub continuous_sweep_routes_path: String,
    /// Mirrors `ContinuousSweepConfigSnapshot::international_only`;
    /// kept here (rather than only in the persisted snapshot) so a
    /// restart can detect a change against the restored progress.
    #[serde(default = "default_continuous_sweep_international_only")]
    pub continuous_sweep_international_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            job_timeout_secs: default_job_timeout_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            scheduler_lock_key: default_scheduler_lock_key(),
            scheduler_lock_ttl_secs: default_scheduler_lock_ttl_secs(),
            worker_id: default_worker_id(),
            registry_namespace: default_registry_namespace(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            heartbeat_ttl_secs: default_heartbeat_ttl_secs(),
            excluded_airlines: HashSet::new(),
            top_n_deals: default_top_n_deals(),
            queue_group: default_queue_group(),
            queue_stream_prefix: default_queue_stream_prefix(),
            queue_block_timeout_ms: default_queue_block_timeout_ms(),
            queue_visibility_timeout_secs: default_queue_visibility_timeout_secs(),
            dead_letter_max_attempts: default_dead_letter_max_attempts(),
            provider_call_timeout_secs: default_provider_call_timeout_secs(),
            route_worker_job_timeout_secs: default_route_worker_job_timeout_secs(),
            price_graph_sweep_delay_ms: default_price_graph_sweep_delay_ms(),
            database_url: default_database_url(),
            redis_url: default_redis_url(),
            provider_base_url: default_provider_base_url(),
            continuous_sweep_routes_path: default_continuous_sweep_routes_path(),
            continuous_sweep_international_only: default_continuous_sweep_international_only(),
        }
    }
}

impl Config {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn scheduler_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.scheduler_lock_ttl_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn heartbeat_ttl(&self) -> Duration {
        Duration::from_secs(self.heartbeat_ttl_secs)
    }

    pub fn queue_block_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_block_timeout_ms)
    }

    pub fn queue_visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.queue_visibility_timeout_secs)
    }

    pub fn provider_call_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_call_timeout_secs)
    }

    pub fn route_worker_job_timeout(&self) -> Duration {
        Duration::from_secs(self.route_worker_job_timeout_secs)
    }

    pub fn price_graph_sweep_delay(&self) -> Duration {
        Duration::from_millis(self.price_graph_sweep_delay_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
