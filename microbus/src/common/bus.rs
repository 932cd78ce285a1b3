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

use std::any::{Any, TypeId};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use static_assertions::assert_impl_all;
use tracing::{debug, error, instrument, trace, warn};

use crate::common::inbox::Inbox;
use crate::common::{BusConfig, Outcome, Resolver, CONFIG};
use crate::message::{BusError, Envelope, EventId};
use crate::traits::{Broadcast, BusMessage, Event};
use crate::worker::WorkerId;

/// The broker every worker talks through.
///
/// A `MessageBus` owns one inbox per registered worker, one subscriber
/// rotation per message type, and the table of events that have been routed
/// but not yet completed. It owns no task: every operation runs on the calling
/// task and only takes short per-key locks, so it is safe to call from any
/// worker, from a reaction, or from plain setup code.
///
/// The handle is cheap to clone; clones share the same bus. There is no
/// process-wide instance. Create one with [`MessageBus::new`] (or let
/// [`BusRuntime`](crate::common::BusRuntime) create it) and hand it to the
/// workers that should share it.
///
/// # Routing
///
/// *   Events ([`send_event`](Self::send_event)) go to exactly one subscriber, chosen round-robin
///     per event type. The sender gets an [`Outcome`] resolved by [`complete`](Self::complete).
/// *   Broadcasts ([`send_broadcast`](Self::send_broadcast)) go to every worker subscribed at the
///     moment of sending.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

assert_impl_all!(MessageBus: Send, Sync, Clone);

struct BusInner {
    inboxes: DashMap<WorkerId, Arc<Inbox>>,
    rotations: DashMap<TypeId, Rotation>,
    in_flight: DashMap<EventId, InFlight>,
    next_event: AtomicU64,
    inbox_warn_depth: usize,
}

/// Subscribers of one message type, in dispatch order.
struct Rotation {
    type_name: &'static str,
    members: VecDeque<WorkerId>,
}

/// A routed event waiting for its reply.
struct InFlight {
    resolver: Box<dyn Any + Send + Sync>,
    handler: WorkerId,
    type_name: &'static str,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("registered", &self.inner.inboxes.len())
            .field("message_types", &self.inner.rotations.len())
            .field("in_flight", &self.inner.in_flight.len())
            .finish()
    }
}

impl MessageBus {
    /// Creates an empty bus using the global [`CONFIG`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CONFIG)
    }

    /// Creates an empty bus using the given configuration.
    #[must_use]
    pub fn with_config(config: &BusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                inboxes: DashMap::new(),
                rotations: DashMap::new(),
                in_flight: DashMap::new(),
                next_event: AtomicU64::new(1),
                inbox_warn_depth: config.limits.inbox_warn_depth,
            }),
        }
    }

    /// Gives the worker an inbox.
    ///
    /// Registering an already registered worker changes nothing; in particular
    /// messages already queued for it are kept.
    #[instrument(level = "trace", skip_all, fields(worker = %worker))]
    pub fn register(&self, worker: &WorkerId) {
        match self.inner.inboxes.entry(worker.clone()) {
            Entry::Occupied(_) => trace!("already registered"),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Inbox::default()));
                debug!("registered");
            }
        }
    }

    /// Removes every trace of the worker from the bus.
    ///
    /// The inbox is closed (waking the worker if it is waiting in
    /// [`await_message`](Self::await_message)) and its queued envelopes are
    /// discarded. The worker leaves every rotation. Events routed to it that were
    /// never completed are dropped from the in-flight table, so their senders
    /// observe [`BusError::Abandoned`].
    ///
    /// Unregistering an unknown worker is a no-op.
    #[instrument(level = "trace", skip_all, fields(worker = %worker))]
    pub fn unregister(&self, worker: &WorkerId) {
        // Removing the inbox waits out any sender holding a guard on it, so every
        // in-flight entry for this worker is recorded before the sweep below.
        let discarded = match self.inner.inboxes.remove(worker) {
            Some((_, inbox)) => inbox.close(),
            None => {
                trace!("unregister of a worker with no inbox");
                0
            }
        };

        for mut rotation in self.inner.rotations.iter_mut() {
            rotation.members.retain(|member| member != worker);
        }

        let before = self.inner.in_flight.len();
        self.inner
            .in_flight
            .retain(|_, entry| entry.handler != *worker);
        let abandoned = before.saturating_sub(self.inner.in_flight.len());

        debug!(discarded, abandoned, "unregistered");
    }

    /// Adds the worker to the rotation for event type `E`.
    ///
    /// Returns `false` if the worker is not registered or was already
    /// subscribed; a worker appears in a rotation at most once.
    pub fn subscribe_event<E: Event>(&self, worker: &WorkerId) -> bool {
        self.subscribe(TypeId::of::<E>(), std::any::type_name::<E>(), worker)
    }

    /// Adds the worker to the subscribers of broadcast type `B`.
    ///
    /// Returns `false` if the worker is not registered or was already subscribed.
    pub fn subscribe_broadcast<B: Broadcast>(&self, worker: &WorkerId) -> bool {
        self.subscribe(TypeId::of::<B>(), std::any::type_name::<B>(), worker)
    }

    #[instrument(level = "trace", skip_all, fields(worker = %worker, message = type_name))]
    fn subscribe(&self, type_id: TypeId, type_name: &'static str, worker: &WorkerId) -> bool {
        // Held until the rotation is updated, so a concurrent unregister sweeps
        // this subscription or makes the lookup fail.
        let Some(_inbox) = self.inner.inboxes.get(worker) else {
            trace!("subscription from a worker with no inbox ignored");
            return false;
        };
        let mut rotation = self
            .inner
            .rotations
            .entry(type_id)
            .or_insert_with(|| Rotation {
                type_name,
                members: VecDeque::new(),
            });
        if rotation.members.contains(worker) {
            trace!("duplicate subscription ignored");
            return false;
        }
        rotation.members.push_back(worker.clone());
        trace!(position = rotation.members.len(), "subscribed");
        true
    }

    /// Routes an event to the next subscriber of `E` in round-robin order.
    ///
    /// Returns `None` when nobody can handle it: there are no subscribers, or
    /// every subscriber left between being chosen and being delivered to.
    /// Otherwise the event is queued in the chosen worker's inbox and the
    /// returned [`Outcome`] resolves when that worker calls
    /// [`complete`](Self::complete).
    pub fn send_event<E: Event>(&self, event: E) -> Option<Outcome<E::Reply>> {
        let type_id = TypeId::of::<E>();
        let type_name = std::any::type_name::<E>();
        let attempts = self
            .inner
            .rotations
            .get(&type_id)
            .map_or(0, |rotation| rotation.members.len());
        if attempts == 0 {
            trace!(event = type_name, "no subscribers; event not routed");
            return None;
        }

        let mut event = Some(event);
        for _ in 0..attempts {
            let target = self.next_in_rotation(type_id)?;
            let Some(inbox) = self.inner.inboxes.get(&target) else {
                trace!(event = type_name, worker = %target, "chosen worker already gone, trying the next");
                continue;
            };

            let id = EventId(self.inner.next_event.fetch_add(1, Ordering::Relaxed));
            let (resolver, outcome) = Outcome::routed(id);
            // Recorded before the envelope is visible, so a fast completion finds it.
            self.inner.in_flight.insert(
                id,
                InFlight {
                    resolver: Box::new(resolver),
                    handler: target.clone(),
                    type_name,
                },
            );
            let depth = inbox.push(Envelope::for_event(event.take()?, id));
            drop(inbox);

            trace!(event = type_name, %id, worker = %target, "event routed");
            self.check_depth(&target, depth);
            return Some(outcome);
        }
        None
    }

    /// Pops the head of the rotation for `type_id` and pushes it back on the tail.
    fn next_in_rotation(&self, type_id: TypeId) -> Option<WorkerId> {
        let mut rotation = self.inner.rotations.get_mut(&type_id)?;
        let next = rotation.members.pop_front()?;
        rotation.members.push_back(next.clone());
        Some(next)
    }

    /// Delivers the broadcast to every worker subscribed to `B` right now.
    ///
    /// The subscriber list is snapshotted first; workers that subscribe while the
    /// broadcast is being delivered do not receive it, and snapshotted workers
    /// that unregister meanwhile are skipped. All recipients share one envelope.
    /// Returns the number of inboxes it was placed in.
    pub fn send_broadcast<B: Broadcast>(&self, broadcast: B) -> usize {
        let type_name = std::any::type_name::<B>();
        let snapshot: Vec<WorkerId> = match self.inner.rotations.get(&TypeId::of::<B>()) {
            Some(rotation) => rotation.members.iter().cloned().collect(),
            None => {
                trace!(broadcast = type_name, "no subscribers");
                return 0;
            }
        };

        let envelope = Envelope::for_broadcast(broadcast);
        let mut delivered = 0;
        for worker in &snapshot {
            let Some(inbox) = self.inner.inboxes.get(worker) else {
                continue;
            };
            let depth = inbox.push(envelope.clone());
            drop(inbox);
            delivered += 1;
            self.check_depth(worker, depth);
        }
        trace!(broadcast = type_name, delivered, "broadcast sent");
        delivered
    }

    /// Resolves the outcome of a routed event with `reply`.
    ///
    /// The event leaves the in-flight table, so each event is completed at most
    /// once. Completing an event that is not in flight (never routed, already
    /// completed, or abandoned by an unregister) is a no-op. Returns whether an
    /// outcome was resolved.
    pub fn complete<E: Event>(&self, id: EventId, reply: E::Reply) -> bool {
        let Some((_, entry)) = self.inner.in_flight.remove(&id) else {
            trace!(%id, "completion for an event that is not in flight; ignored");
            return false;
        };

        let InFlight {
            resolver,
            handler,
            type_name,
        } = entry;
        match resolver.downcast::<Resolver<E::Reply>>() {
            Ok(resolver) => {
                trace!(%id, worker = %handler, "event completed");
                resolver.resolve(reply)
            }
            Err(resolver) => {
                error!(
                    %id,
                    routed_as = type_name,
                    completed_as = std::any::type_name::<E>(),
                    "completion with the wrong event type; leaving the event in flight"
                );
                self.inner.in_flight.insert(
                    id,
                    InFlight {
                        resolver,
                        handler,
                        type_name,
                    },
                );
                false
            }
        }
    }

    /// Waits for the next envelope in the worker's inbox, oldest first.
    ///
    /// # Errors
    ///
    /// [`BusError::UnregisteredWorker`] if the worker has no inbox when called, or
    /// is unregistered while waiting.
    pub async fn await_message(&self, worker: &WorkerId) -> Result<Envelope, BusError> {
        let inbox = self
            .inner
            .inboxes
            .get(worker)
            .map(|inbox| Arc::clone(inbox.value()))
            .ok_or_else(|| BusError::UnregisteredWorker(worker.clone()))?;
        inbox
            .pop()
            .await
            .ok_or_else(|| BusError::UnregisteredWorker(worker.clone()))
    }

    /// `true` if the worker currently has an inbox.
    #[must_use]
    pub fn is_registered(&self, worker: &WorkerId) -> bool {
        self.inner.inboxes.contains_key(worker)
    }

    /// Number of registered workers.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.inner.inboxes.len()
    }

    /// Number of registered workers carrying the given diagnostic name.
    #[must_use]
    pub fn registered_named(&self, name: &str) -> usize {
        self.inner
            .inboxes
            .iter()
            .filter(|entry| entry.key().name() == name)
            .count()
    }

    /// Number of envelopes waiting in the worker's inbox, or `None` if it is not registered.
    #[must_use]
    pub fn pending(&self, worker: &WorkerId) -> Option<usize> {
        self.inner.inboxes.get(worker).map(|inbox| inbox.len())
    }

    /// `true` if the worker is registered and has nothing queued.
    #[must_use]
    pub fn is_drained(&self, worker: &WorkerId) -> bool {
        self.pending(worker) == Some(0)
    }

    /// Number of workers subscribed to message type `M`.
    #[must_use]
    pub fn subscriber_count<M: BusMessage>(&self) -> usize {
        self.inner
            .rotations
            .get(&TypeId::of::<M>())
            .map_or(0, |rotation| rotation.members.len())
    }

    /// `true` if the worker is subscribed to message type `M`.
    #[must_use]
    pub fn is_subscribed<M: BusMessage>(&self, worker: &WorkerId) -> bool {
        self.inner
            .rotations
            .get(&TypeId::of::<M>())
            .is_some_and(|rotation| rotation.members.contains(worker))
    }

    /// Number of events routed but not yet completed or abandoned.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.len()
    }

    fn check_depth(&self, worker: &WorkerId, depth: usize) {
        let limit = self.inner.inbox_warn_depth;
        if limit > 0 && depth >= limit && depth % limit == 0 {
            let types: Vec<&'static str> = self
                .inner
                .rotations
                .iter()
                .filter(|rotation| rotation.members.contains(worker))
                .map(|rotation| rotation.type_name)
                .collect();
            warn!(worker = %worker, depth, subscribed_to = ?types, "inbox is growing; its worker is not keeping up");
        }
    }
}
