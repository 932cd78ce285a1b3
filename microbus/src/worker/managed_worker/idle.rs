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

use std::any::TypeId;
use std::fmt::Debug;
use std::future::Future;
use std::mem;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, instrument, trace};

use crate::common::{BusRuntime, MessageBus, ReactionFuture, ReactorItem, WorkerHandle, CONFIG};
use crate::message::{BroadcastContext, Envelope, EventContext};
use crate::traits::{Broadcast, Event};
use crate::worker::managed_worker::Registration;
use crate::worker::{ManagedWorker, Started};

/// Type-state marker for a worker that has been created but not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Idle;

impl<Model: Default + Send + Debug + 'static> ManagedWorker<Idle, Model> {
    /// Creates a worker on `bus` without a runtime.
    ///
    /// It uses the global configuration and its own cancellation token.
    /// Prefer [`BusRuntime::new_worker`] when the worker should take part in
    /// [`BusRuntime::shutdown_all`].
    pub fn on_bus(bus: &MessageBus, name: impl Into<Arc<str>>) -> Self {
        Self::from_parts(bus.clone(), name.into(), CancellationToken::new(), &CONFIG, None)
    }

    pub(crate) fn new_in(runtime: &BusRuntime, name: Arc<str>) -> Self {
        Self::from_parts(
            runtime.0.bus.clone(),
            name,
            runtime.0.cancellation_token.child_token(),
            &runtime.0.config,
            Some(runtime.clone()),
        )
    }

    /// Declares how this worker handles events of type `E` and subscribes it to them on start.
    ///
    /// The reaction receives the running worker and an [`EventContext`] it can
    /// use to complete the event. Declaring a second reaction for the same type
    /// replaces the first.
    #[instrument(skip(self, reaction), level = "debug")]
    pub fn on_event<E: Event>(
        &mut self,
        reaction: impl Fn(&mut ManagedWorker<Started, Model>, EventContext<E>) -> ReactionFuture
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        let type_name = std::any::type_name::<E>();
        trace!(type_name, "adding event reaction");
        let react = Box::new(
            move |worker: &mut ManagedWorker<Started, Model>, envelope: &Envelope| -> ReactionFuture {
                let (Some(event), Some(id)) = (envelope.downcast_ref::<E>(), envelope.event_id()) else {
                    error!(type_name, "event reaction called with an incompatible envelope");
                    return Box::pin(async {});
                };
                let context = EventContext {
                    event: event.clone(),
                    id,
                    timestamp: envelope.timestamp(),
                    bus: worker.bus.clone(),
                };
                reaction(worker, context)
            },
        );
        self.reactors.insert(
            TypeId::of::<E>(),
            ReactorItem {
                type_name,
                subscribe: |bus, id| bus.subscribe_event::<E>(id),
                react,
            },
        );
        self
    }

    /// Declares how this worker handles broadcasts of type `B` and subscribes it to them on start.
    ///
    /// Declaring a second reaction for the same type replaces the first.
    #[instrument(skip(self, reaction), level = "debug")]
    pub fn on_broadcast<B: Broadcast>(
        &mut self,
        reaction: impl Fn(&mut ManagedWorker<Started, Model>, BroadcastContext<B>) -> ReactionFuture
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        let type_name = std::any::type_name::<B>();
        trace!(type_name, "adding broadcast reaction");
        let react = Box::new(
            move |worker: &mut ManagedWorker<Started, Model>, envelope: &Envelope| -> ReactionFuture {
                let Some(broadcast) = envelope.downcast_ref::<B>() else {
                    error!(type_name, "broadcast reaction called with an incompatible envelope");
                    return Box::pin(async {});
                };
                let context = BroadcastContext {
                    broadcast: broadcast.clone(),
                    timestamp: envelope.timestamp(),
                };
                reaction(worker, context)
            },
        );
        self.reactors.insert(
            TypeId::of::<B>(),
            ReactorItem {
                type_name,
                subscribe: |bus, id| bus.subscribe_broadcast::<B>(id),
                react,
            },
        );
        self
    }

    /// Runs once on the worker's task, after it is registered and subscribed
    /// and before it takes its first message. Messages sent from here may
    /// already be answered by other workers.
    pub fn after_start<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedWorker<Started, Model>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.after_start = Some(Box::new(
            move |worker: &ManagedWorker<Started, Model>| -> ReactionFuture { Box::pin(f(worker)) },
        ));
        self
    }

    /// Runs when the loop ends, while the worker is still registered.
    pub fn before_stop<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedWorker<Started, Model>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.before_stop = Some(Box::new(
            move |worker: &ManagedWorker<Started, Model>| -> ReactionFuture { Box::pin(f(worker)) },
        ));
        self
    }

    /// Runs last, after the worker has unregistered from the bus.
    pub fn after_stop<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedWorker<Started, Model>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.after_stop = Some(Box::new(
            move |worker: &ManagedWorker<Started, Model>| -> ReactionFuture { Box::pin(f(worker)) },
        ));
        self
    }

    /// Overrides `behavior.announce_lifecycle` for this worker.
    pub fn announce_lifecycle(&mut self, announce: bool) -> &mut Self {
        self.announce = announce;
        self
    }

    /// Registers the worker, subscribes it to every type it reacts to, and
    /// spawns its loop.
    ///
    /// Registration and subscriptions are in place when this returns, so
    /// messages sent afterwards reach the worker even if its task has not
    /// been scheduled yet. Must be called within a Tokio runtime.
    #[instrument(skip(self))]
    pub async fn start(mut self) -> WorkerHandle {
        let reactors = mem::take(&mut self.reactors);

        self.bus.register(&self.id);
        let registration = Registration {
            bus: self.bus.clone(),
            id: self.id.clone(),
            announce: self.announce,
            runtime: self.runtime.clone(),
        };
        for item in reactors.values() {
            (item.subscribe)(&self.bus, &self.id);
            trace!(worker = %self.id, message = item.type_name, "subscribed");
        }

        let handle = self.handle.clone();
        if let Some(runtime) = &self.runtime {
            runtime.track(&handle);
        }

        let worker: ManagedWorker<Started, Model> = self.into();
        handle.tracker.spawn(worker.wake(reactors, registration));
        handle.tracker.close();

        trace!(worker = %handle.id, "worker started");
        handle
    }
}

impl<Model: Default + Send + Debug + 'static> From<ManagedWorker<Idle, Model>>
    for ManagedWorker<Started, Model>
{
    fn from(value: ManagedWorker<Idle, Model>) -> Self {
        Self {
            id: value.id,
            bus: value.bus,
            handle: value.handle,
            runtime: value.runtime,
            model: value.model,
            announce: value.announce,
            after_start: value.after_start,
            before_stop: value.before_stop,
            after_stop: value.after_stop,
            reactors: value.reactors,
            _worker_state: std::marker::PhantomData,
        }
    }
}
