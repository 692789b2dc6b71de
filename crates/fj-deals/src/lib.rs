// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `DealDetector`: baseline computation and classification of persisted
//! results (spec.md §2, "DealDetector"). Baselines themselves
//! (`RouteBaseline`, `refresh_route_baseline`) are owned by
//! `fj-resultstore`; this crate only adds the classification threshold
//! the core applies on top of them.

pub mod classify;

pub use classify::{classify_price, DealClassification, DealThresholds};
