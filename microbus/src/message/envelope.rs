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
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::traits::{Broadcast, BusMessage, Event};

/// Identity of one routed event instance.
///
/// Allocated by the bus when an event is actually routed to a subscriber and
/// used as the key of the in-flight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

/// A message as it sits in a worker's inbox.
///
/// The payload is reference counted so one broadcast can be placed into many
/// inboxes without copying it. The concrete `TypeId` is captured at
/// construction and is the key used to find the receiving worker's reaction.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub(crate) message: Arc<dyn BusMessage>,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) event_id: Option<EventId>,
    pub(crate) timestamp: SystemTime,
}

impl Envelope {
    pub(crate) fn for_event<E: Event>(event: E, id: EventId) -> Self {
        Self {
            message: Arc::new(event),
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            event_id: Some(id),
            timestamp: SystemTime::now(),
        }
    }

    pub(crate) fn for_broadcast<B: Broadcast>(broadcast: B) -> Self {
        Self {
            message: Arc::new(broadcast),
            type_id: TypeId::of::<B>(),
            type_name: std::any::type_name::<B>(),
            event_id: None,
            timestamp: SystemTime::now(),
        }
    }

    /// The type-erased payload.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &dyn BusMessage {
        self.message.as_ref()
    }

    /// Borrows the payload as `M` if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<M: BusMessage>(&self) -> Option<&M> {
        self.message.as_any().downcast_ref::<M>()
    }

    /// `TypeId` of the concrete payload.
    #[inline]
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the concrete payload type, for diagnostics.
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The event identity, or `None` for broadcasts.
    #[inline]
    #[must_use]
    pub const fn event_id(&self) -> Option<EventId> {
        self.event_id
    }

    /// When the envelope was created by the sender.
    #[inline]
    #[must_use]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }
}
