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

//! Internal type aliases for reactions and lifecycle hooks.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::common::MessageBus;
use crate::message::Envelope;
use crate::worker::{ManagedWorker, Started, WorkerId};

/// The future a reaction or lifecycle hook returns.
///
/// It must own everything it uses: copy what you need out of the worker
/// before building it. Build these with [`Reaction`](crate::common::Reaction).
pub type ReactionFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Crate-internal: a worker's reactions, one per message type.
///
/// A plain `HashMap`: reactions are declared while the worker is idle and only
/// read by its own loop afterwards.
pub(crate) type ReactorMap<Model> = HashMap<TypeId, ReactorItem<Model>>;

/// Crate-internal: a reaction with its message type erased.
pub(crate) type EnvelopeReactor<Model> = dyn for<'a, 'b> Fn(&'a mut ManagedWorker<Started, Model>, &'b Envelope) -> ReactionFuture
    + Send
    + Sync
    + 'static;

/// Crate-internal: what `start` needs to know about each declared reaction.
pub(crate) struct ReactorItem<Model: Default + Send + Debug + 'static> {
    pub(crate) type_name: &'static str,
    pub(crate) subscribe: fn(&MessageBus, &WorkerId) -> bool,
    pub(crate) react: Box<EnvelopeReactor<Model>>,
}

/// Crate-internal: an optional lifecycle hook.
pub(crate) type LifecycleHook<Model> =
    Option<Box<dyn Fn(&ManagedWorker<Started, Model>) -> ReactionFuture + Send + Sync + 'static>>;
