// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status a worker reports in its heartbeat (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Starting,
    Active,
    Processing,
    Error,
    Stopping,
    Stopped,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Starting => "starting",
            WorkerStatus::Active => "active",
            WorkerStatus::Processing => "processing",
            WorkerStatus::Error => "error",
            WorkerStatus::Stopping => "stopping",
            WorkerStatus::Stopped => "stopped",
        }
    }
}

/// TTL-backed worker liveness record (spec.md §3/§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHeartbeat {
    pub id: String,
    pub hostname: String,
    pub status: WorkerStatus,
    pub current_job: Option<String>,
    pub processed_jobs: u64,
    pub concurrency: usize,
    pub started_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
    pub version: String,
}

impl WorkerHeartbeat {
    pub fn starting(id: impl Into<String>, hostname: impl Into<String>, concurrency: usize) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            hostname: hostname.into(),
            status: WorkerStatus::Starting,
            current_job: None,
            processed_jobs: 0,
            concurrency,
            started_at: now,
            last_heartbeat: now,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
