// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Type-erased facade over `fj_election::LeaderElector<B>` so the
//! Manager does not need to carry a `LockBackend` generic parameter of
//! its own.

use async_trait::async_trait;
use fj_election::{backend::LockBackend, LeaderElector};
use std::sync::Arc;

#[async_trait]
pub trait LeaderElection: Send + Sync {
    fn is_leader(&self) -> bool;
    fn start(&self);
    async fn stop(&self);
}

#[async_trait]
impl<B: LockBackend + 'static> LeaderElection for Arc<LeaderElector<B>> {
    fn is_leader(&self) -> bool {
        self.as_ref().is_leader()
    }

    fn start(&self) {
        LeaderElector::start(self)
    }

    async fn stop(&self) {
        LeaderElector::stop(self).await
    }
}
