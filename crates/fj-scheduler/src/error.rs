// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("scheduled job not found: {0}")]
    NotFound(String),
    #[error("scheduled job store error: {0}")]
    Store(String),
}

impl PartialEq for ScheduleError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScheduleError::InvalidSchedule(a), ScheduleError::InvalidSchedule(b)) => a == b,
            (ScheduleError::NotFound(a), ScheduleError::NotFound(b)) => a == b,
            (ScheduleError::Store(a), ScheduleError::Store(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ScheduleError {}

impl From<sqlx::Error> for ScheduleError {
    fn from(err: sqlx::Error) -> Self {
        ScheduleError::Store(err.to_string())
    }
}
