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

use std::fmt::Debug;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, instrument, trace};

use crate::common::runtime_inner::RuntimeInner;
use crate::common::{BusConfig, MessageBus, WorkerHandle};
use crate::traits::{MicroService, WorkerHandleInterface};
use crate::worker::{Idle, ManagedWorker, WorkerId};

/// Owns one [`MessageBus`] and keeps track of the workers started on it.
///
/// Created by [`BusApp::launch`](crate::common::BusApp::launch). Clones share
/// the same bus, registry and configuration. Workers created here get a
/// cancellation token derived from the runtime's, so
/// [`shutdown_all`](Self::shutdown_all) can reach every one of them.
#[derive(Debug, Clone)]
pub struct BusRuntime(pub(crate) Arc<RuntimeInner>);

impl Default for BusRuntime {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl BusRuntime {
    pub(crate) fn new(config: BusConfig) -> Self {
        Self(Arc::new(RuntimeInner::new(config)))
    }

    /// The bus shared by this runtime's workers.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &MessageBus {
        &self.0.bus
    }

    /// The configuration this runtime was launched with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.0.config
    }

    /// Number of started workers that have not exited yet.
    #[inline]
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.0.workers.len()
    }

    /// Handles of every started worker that has not exited yet.
    #[must_use]
    pub fn workers(&self) -> Vec<WorkerHandle> {
        self.0.workers.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Creates an idle worker named `name` on this runtime's bus.
    pub fn new_worker<Model>(&self, name: impl Into<Arc<str>>) -> ManagedWorker<Idle, Model>
    where
        Model: Default + Send + Debug + 'static,
    {
        let worker = ManagedWorker::new_in(self, name.into());
        trace!(worker = %worker.id(), "new worker");
        worker
    }

    /// Creates an idle worker with the configured default name.
    pub fn new_worker_default<Model>(&self) -> ManagedWorker<Idle, Model>
    where
        Model: Default + Send + Debug + 'static,
    {
        let name = self.0.config.defaults.worker_name.clone();
        self.new_worker(name)
    }

    /// Creates a worker, lets `setup` declare its reactions and hooks, and starts it.
    pub async fn spawn_worker<Model>(
        &self,
        name: impl Into<Arc<str>>,
        setup: impl FnOnce(&mut ManagedWorker<Idle, Model>),
    ) -> WorkerHandle
    where
        Model: Default + Send + Debug + 'static,
    {
        let mut worker = self.new_worker(name);
        setup(&mut worker);
        worker.start().await
    }

    /// Creates, initializes and starts a [`MicroService`].
    #[instrument(skip(self, name), fields(service = std::any::type_name::<S>()))]
    pub async fn spawn_service<S: MicroService>(&self, name: impl Into<Arc<str>>) -> WorkerHandle {
        self.spawn_worker(name, S::initialize).await
    }

    pub(crate) fn track(&self, handle: &WorkerHandle) {
        self.0.workers.insert(handle.id.clone(), handle.clone());
    }

    pub(crate) fn forget(&self, id: &WorkerId) {
        self.0.workers.remove(id);
    }

    /// Waits until every started worker has exited on its own.
    ///
    /// Workers started while waiting are not waited for.
    pub async fn join_all(&self) {
        let handles = self.workers();
        trace!(workers = handles.len(), "waiting for workers to exit");
        join_all(handles.iter().map(|handle| handle.join())).await;
    }

    /// Terminates every worker and waits for them to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the workers did not all exit within the configured
    /// system shutdown timeout. In that case the runtime's cancellation token is
    /// cancelled, so workers created on this runtime afterwards start terminated.
    #[instrument(skip(self))]
    pub async fn shutdown_all(&self) -> anyhow::Result<()> {
        let handles = self.workers();
        trace!(workers = handles.len(), "stopping all workers");

        let stops = handles.iter().map(|handle| async move {
            if let Err(e) = handle.stop().await {
                error!("Error stopping worker {}: {:?}", handle.id(), e);
            }
        });

        let timeout = self.0.config.system_shutdown_timeout();
        if tokio::time::timeout(timeout, join_all(stops)).await.is_err() {
            error!("System-wide shutdown timeout expired after {:?}. Cancelling remaining workers.", timeout);
            self.0.cancellation_token.cancel();
            return Err(anyhow::anyhow!(
                "workers did not shut down within {timeout:?}"
            ));
        }
        trace!("all workers stopped");
        Ok(())
    }
}
