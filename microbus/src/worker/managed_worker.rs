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
use std::fmt::Debug;
use std::fmt::Formatter;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::trace;

pub use idle::Idle;
pub use started::Started;

use crate::common::{BusConfig, BusRuntime, LifecycleHook, MessageBus, ReactorMap, WorkerHandle};
use crate::message::{WorkerState, WorkerStateChanged};
use crate::worker::WorkerId;

mod idle;
mod started;

/// A worker: user state plus the reactions that drive it.
///
/// The `State` parameter is a type-state marker:
///
/// *   [`Idle`]: created but not running. Reactions and lifecycle hooks are
///     declared here with [`on_event`](ManagedWorker::on_event),
///     [`on_broadcast`](ManagedWorker::on_broadcast) and friends.
/// *   [`Started`]: registered with the bus and running its loop on its own
///     task. This is the state reactions and hooks see.
///
/// A worker handles one message at a time, in inbox order, and awaits each
/// reaction's future before taking the next message.
pub struct ManagedWorker<State, Model: Default + Send + Debug + 'static> {
    pub(crate) id: WorkerId,

    pub(crate) bus: MessageBus,

    pub(crate) handle: WorkerHandle,

    /// Runtime to report to when started, if the worker was created by one.
    pub(crate) runtime: Option<BusRuntime>,

    /// The user-defined state of this worker.
    pub model: Model,

    pub(crate) announce: bool,

    pub(crate) after_start: LifecycleHook<Model>,
    pub(crate) before_stop: LifecycleHook<Model>,
    pub(crate) after_stop: LifecycleHook<Model>,

    pub(crate) reactors: ReactorMap<Model>,

    _worker_state: PhantomData<State>,
}

impl<State, Model: Default + Send + Debug + 'static> ManagedWorker<State, Model> {
    /// The worker's identity on the bus.
    #[inline]
    pub const fn id(&self) -> &WorkerId {
        &self.id
    }

    /// The worker's diagnostic name.
    #[inline]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// The bus this worker is (or will be) registered with.
    #[inline]
    pub const fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// A handle for terminating and joining this worker.
    ///
    /// Joining only completes for workers that were started.
    #[inline]
    pub const fn handle(&self) -> &WorkerHandle {
        &self.handle
    }

    /// Whether this worker broadcasts [`WorkerStateChanged`] on start and stop.
    #[inline]
    pub const fn announces_lifecycle(&self) -> bool {
        self.announce
    }

    pub(crate) fn from_parts(
        bus: MessageBus,
        name: Arc<str>,
        cancellation_token: CancellationToken,
        config: &BusConfig,
        runtime: Option<BusRuntime>,
    ) -> Self {
        let id = WorkerId::new(name);
        let handle = WorkerHandle::new(
            id.clone(),
            cancellation_token,
            config.worker_shutdown_timeout(),
        );
        Self {
            id,
            bus,
            handle,
            runtime,
            model: Model::default(),
            announce: config.behavior.announce_lifecycle,
            after_start: None,
            before_stop: None,
            after_stop: None,
            reactors: ReactorMap::new(),
            _worker_state: PhantomData,
        }
    }
}

impl<State, Model: Default + Send + Debug + 'static> Debug
    for ManagedWorker<State, Model>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedWorker")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("reactions", &self.reactors.len())
            .finish_non_exhaustive()
    }
}

/// Keeps a started worker registered; dropping it takes the worker off the bus.
///
/// Created before the worker's task is spawned and moved into it, so the
/// worker is unregistered however the task ends: a normal exit, a panic in a
/// reaction or hook, or the task being dropped by a shutting-down runtime.
pub(crate) struct Registration {
    pub(crate) bus: MessageBus,
    pub(crate) id: WorkerId,
    pub(crate) announce: bool,
    pub(crate) runtime: Option<BusRuntime>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.announce {
            self.bus.send_broadcast(WorkerStateChanged::new(
                self.id.clone(),
                WorkerState::Stopped,
            ));
        }
        self.bus.unregister(&self.id);
        if let Some(runtime) = &self.runtime {
            runtime.forget(&self.id);
        }
        trace!(worker = %self.id, "worker left the bus");
    }
}
