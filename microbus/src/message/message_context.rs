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
use std::time::SystemTime;

use crate::common::MessageBus;
use crate::message::EventId;
use crate::traits::{Broadcast, Event};

/// What an event reaction receives: the event, its identity and a way to complete it.
///
/// Completing through the context is equivalent to calling
/// [`MessageBus::complete`] with [`EventContext::id`].
#[derive(Debug, Clone)]
pub struct EventContext<E: Event> {
    pub(crate) event: E,
    pub(crate) id: EventId,
    pub(crate) timestamp: SystemTime,
    pub(crate) bus: MessageBus,
}

impl<E: Event> EventContext<E> {
    /// The event being handled.
    #[inline]
    pub const fn event(&self) -> &E {
        &self.event
    }

    /// The identity the bus assigned to this event when it was routed.
    #[inline]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// When the sender created the event.
    #[inline]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Resolves the sender's [`Outcome`](crate::common::Outcome) with `reply`.
    ///
    /// Returns `false` if the event had already been completed, in which case the
    /// sender keeps the first reply.
    pub fn complete(&self, reply: E::Reply) -> bool {
        self.bus.complete::<E>(self.id, reply)
    }
}

/// What a broadcast reaction receives.
#[derive(Debug, Clone)]
pub struct BroadcastContext<B: Broadcast> {
    pub(crate) broadcast: B,
    pub(crate) timestamp: SystemTime,
}

impl<B: Broadcast> BroadcastContext<B> {
    /// The broadcast being handled.
    #[inline]
    pub const fn broadcast(&self) -> &B {
        &self.broadcast
    }

    /// When the sender created the broadcast.
    #[inline]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }
}
