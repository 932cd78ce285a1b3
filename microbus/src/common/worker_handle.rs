/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace};

use crate::traits::WorkerHandleInterface;
use crate::worker::WorkerId;

/// A cloneable reference to a started worker.
///
/// The handle does not keep the worker alive; it only lets others terminate
/// it and wait for it. Handles compare equal when they refer to the same worker.
#[derive(Clone)]
pub struct WorkerHandle {
    pub(crate) id: WorkerId,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) tracker: TaskTracker,
    pub(crate) stop_timeout: Duration,
}

impl WorkerHandle {
    pub(crate) fn new(id: WorkerId, cancellation_token: CancellationToken, stop_timeout: Duration) -> Self {
        Self {
            id,
            cancellation_token,
            tracker: TaskTracker::new(),
            stop_timeout,
        }
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.id)
            .field("terminated", &self.cancellation_token.is_cancelled())
            .field("running", &!self.tracker.is_empty())
            .finish()
    }
}

impl PartialEq for WorkerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WorkerHandle {}

impl Hash for WorkerHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[async_trait]
impl WorkerHandleInterface for WorkerHandle {
    #[inline]
    fn id(&self) -> &WorkerId {
        &self.id
    }

    fn terminate(&self) {
        if !self.cancellation_token.is_cancelled() {
            trace!(worker = %self.id, "termination requested");
            self.cancellation_token.cancel();
        }
    }

    #[inline]
    fn is_terminated(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    async fn join(&self) {
        self.tracker.wait().await;
    }

    #[instrument(skip(self))]
    async fn stop(&self) -> anyhow::Result<()> {
        self.terminate();
        if tokio::time::timeout(self.stop_timeout, self.join()).await.is_err() {
            return Err(anyhow::anyhow!(
                "worker {} did not stop within {:?}",
                self.id,
                self.stop_timeout
            ));
        }
        trace!(worker = %self.id, "worker stopped");
        Ok(())
    }
}
