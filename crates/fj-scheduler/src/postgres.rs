// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::error::ScheduleError;
use crate::store::ScheduledJobStore;
use crate::types::ScheduledJobDef;

/// `ScheduledJobDef` is stored whole, as JSONB, under its own `enabled`
/// column so `list_enabled` can filter server-side without deserializing
/// disabled rows. Queries are built with the runtime-checked
/// `sqlx::query` API rather than the `query!` macros, so this crate
/// links against no particular live schema at compile time.
pub struct PostgresScheduledJobStore {
    pool: PgPool,
}

impl PostgresScheduledJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduledJobStore for PostgresScheduledJobStore {
    async fn list_enabled(&self) -> Result<Vec<ScheduledJobDef>, ScheduleError> {
        let rows = sqlx::query("SELECT data FROM scheduled_jobs WHERE enabled = true")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let data: serde_json::Value = row.try_get("data").map_err(sqlx::Error::from)?;
                serde_json::from_value(data).map_err(|e| ScheduleError::Store(e.to_string()))
            })
            .collect()
    }

    async fn get(&self, id: &str) -> Result<ScheduledJobDef, ScheduleError> {
        let row = sqlx::query("SELECT data FROM scheduled_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
        let data: serde_json::Value = row.try_get("data").map_err(sqlx::Error::from)?;
        serde_json::from_value(data).map_err(|e| ScheduleError::Store(e.to_string()))
    }

    async fn upsert(&self, def: ScheduledJobDef) -> Result<(), ScheduleError> {
        let data = serde_json::to_value(&def).map_err(|e| ScheduleError::Store(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO scheduled_jobs (id, enabled, data, last_run)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                enabled = EXCLUDED.enabled,
                data = EXCLUDED.data,
                last_run = EXCLUDED.last_run
            "#,
        )
        .bind(&def.id)
        .bind(def.enabled)
        .bind(data)
        .bind(def.last_run)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), ScheduleError> {
        let result = sqlx::query("DELETE FROM scheduled_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ScheduleError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_last_run(&self, id: &str, at: DateTime<Utc>) -> Result<(), ScheduleError> {
        let mut def = self.get(id).await?;
        def.last_run = Some(at);
        let data = serde_json::to_value(&def).map_err(|e| ScheduleError::Store(e.to_string()))?;

        sqlx::query("UPDATE scheduled_jobs SET data = $1, last_run = $2 WHERE id = $3")
            .bind(data)
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
