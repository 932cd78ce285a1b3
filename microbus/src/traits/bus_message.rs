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
use std::any::Any;
use std::fmt::Debug;

/// A marker trait for every type that can travel through the [`MessageBus`](crate::common::MessageBus).
///
/// It combines `Any`, `Send`, `Sync` and `Debug` so that messages can be shared
/// between worker tasks, logged, and downcast back to their concrete type when
/// a worker dispatches them to a reaction.
///
/// A blanket implementation covers every qualifying type. Domain code never
/// implements this directly; it implements [`Event`] or [`Broadcast`] instead.
pub trait BusMessage: Any + Send + Sync + Debug {
    /// Returns the message as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T> BusMessage for T
where
    T: Any + Send + Sync + Debug,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A request whose sender expects exactly one outcome of type [`Event::Reply`].
///
/// Events are routed round-robin to one subscriber. The sender receives an
/// [`Outcome`](crate::common::Outcome) that resolves when the handling worker
/// completes the event.
///
/// Identity is per send: the bus tags each routed instance with a fresh
/// [`EventId`](crate::message::EventId), so two equal values sent separately are
/// two distinct events.
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct Ping;
///
/// impl Event for Ping {
///     type Reply = String;
/// }
/// ```
pub trait Event: BusMessage + Clone {
    /// The value the handling worker completes this event with.
    type Reply: Clone + Send + Sync + Debug + 'static;
}

/// A notification delivered to every current subscriber, with no result channel.
pub trait Broadcast: BusMessage + Clone {}
