// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `PriceGraphSweep` and `ContinuousSweep` (spec.md §4.6/§4.7): the
//! batch (origin × destination × trip-length × class) scan job and the
//! long-lived, pausable state machine that continuously re-emits it
//! across a configurable route universe.

pub mod continuous;
pub mod error;
pub mod price_graph_sweep;

pub use continuous::{
    ContinuousPriceGraphPayload, ContinuousPriceGraphWorker, ContinuousSweep, ContinuousSweepQueryDefaults,
    ContinuousSweepSnapshot, Route, SweepState,
};
pub use error::SweepError;
pub use price_graph_sweep::{PriceGraphSweep, PriceGraphSweepPayload, SweepOutcome, SweepStatus};
