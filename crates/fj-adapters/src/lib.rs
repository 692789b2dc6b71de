// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Minimal adapters for external collaborators spec.md treats as out of
//! scope but whose contracts the core still depends on. Today that is
//! just the operational notifier (spec.md §7): stall/error-spike/
//! rate-limited/sweep-lifecycle alerts, rate-limited so the same alert
//! kind for the same route/sweep never fires more than once every five
//! minutes. Real delivery (email/Slack/etc.) is out of scope; only the
//! contract and the rate-limiting the core depends on are implemented.

pub mod notify;

pub use notify::{LogNotifier, NotifyEvent, NotifyKind, Notifier, RateLimitedNotifier};
