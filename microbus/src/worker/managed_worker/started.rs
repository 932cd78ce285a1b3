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

use tracing::{instrument, trace, warn};

use crate::common::{Outcome, ReactorMap};
use crate::message::{Envelope, WorkerState, WorkerStateChanged};
use crate::traits::{Broadcast, Event, WorkerHandleInterface};
use crate::worker::managed_worker::Registration;
use crate::worker::ManagedWorker;

/// Type-state marker for a worker whose loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Started;

impl<Model: Default + Send + Debug + 'static> ManagedWorker<Started, Model> {
    /// Asks this worker to leave its loop once the current reaction's future completes.
    pub fn terminate(&self) {
        self.handle.terminate();
    }

    /// Sends an event on this worker's bus. See [`MessageBus::send_event`](crate::common::MessageBus::send_event).
    pub fn send_event<E: Event>(&self, event: E) -> Option<Outcome<E::Reply>> {
        self.bus.send_event(event)
    }

    /// Sends a broadcast on this worker's bus. See [`MessageBus::send_broadcast`](crate::common::MessageBus::send_broadcast).
    pub fn send_broadcast<B: Broadcast>(&self, broadcast: B) -> usize {
        self.bus.send_broadcast(broadcast)
    }

    #[instrument(skip_all, fields(worker = %self.id))]
    pub(crate) async fn wake(mut self, reactors: ReactorMap<Model>, registration: Registration) {
        let after_start = self.after_start.as_ref().map(|hook| hook(&self));
        if let Some(hook) = after_start {
            hook.await;
        }
        if self.announce {
            self.bus.send_broadcast(WorkerStateChanged::new(self.id.clone(), WorkerState::Started));
        }

        let cancel_token = self.handle.cancellation_token.clone();
        loop {
            tokio::select! {
                biased;
                () = cancel_token.cancelled() => {
                    trace!("termination requested; leaving loop");
                    break;
                }
                incoming = self.bus.await_message(&self.id) => {
                    match incoming {
                        Ok(envelope) => self.dispatch(&reactors, &envelope).await,
                        Err(e) => {
                            trace!(%e, "inbox closed; leaving loop");
                            break;
                        }
                    }
                }
            }
        }

        let before_stop = self.before_stop.as_ref().map(|hook| hook(&self));
        if let Some(hook) = before_stop {
            hook.await;
        }
        drop(registration);
        let after_stop = self.after_stop.as_ref().map(|hook| hook(&self));
        if let Some(hook) = after_stop {
            hook.await;
        }
        trace!("worker stopped");
    }

    async fn dispatch(&mut self, reactors: &ReactorMap<Model>, envelope: &Envelope) {
        let Some(item) = reactors.get(&envelope.type_id()) else {
            warn!(
                message = envelope.type_name(),
                "no reaction for this message type; ignoring it"
            );
            return;
        };
        trace!(message = item.type_name, event = ?envelope.event_id(), "dispatching");
        let reaction = (item.react)(self, envelope);
        reaction.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::common::{BusConfig, BusRuntime, Reaction};
    use crate::message::BusError;
    use crate::traits::{Broadcast, Event, WorkerHandleInterface};

    #[derive(Debug, Clone)]
    struct Explode;

    impl Broadcast for Explode {}

    #[derive(Debug, Clone)]
    struct Ask;

    impl Event for Ask {
        type Reply = u8;
    }

    #[derive(Debug, Default)]
    struct Fragile;

    #[tokio::test]
    async fn panicking_reaction_still_unregisters() {
        let runtime = BusRuntime::new(BusConfig::default());
        let mut worker = runtime.new_worker::<Fragile>("fragile");
        worker
            .on_broadcast::<Explode>(|_, _| panic!("reaction failed"))
            .on_event::<Ask>(|_, _| Reaction::ready());
        let id = worker.id().clone();
        let handle = worker.start().await;

        // an event left in flight must be abandoned once the worker is gone
        let pending = runtime.bus().send_event(Ask).expect("subscribed");
        assert_eq!(runtime.bus().send_broadcast(Explode), 1);

        tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .expect("worker task ended");
        assert!(!runtime.bus().is_registered(&id));
        assert_eq!(runtime.bus().subscriber_count::<Ask>(), 0);
        assert_eq!(runtime.worker_count(), 0);
        assert_eq!(pending.get().await, Err(BusError::Abandoned));
    }
}
