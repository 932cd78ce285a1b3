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

use crate::worker::{Idle, ManagedWorker};

/// A domain service built on a [`ManagedWorker`].
///
/// Implementors describe, once, how a worker with this state reacts to the
/// messages it cares about. [`BusRuntime::spawn_service`](crate::common::BusRuntime::spawn_service)
/// builds the worker, calls [`initialize`](MicroService::initialize), and starts it.
///
/// ```rust,ignore
/// #[bus_worker]
/// struct Echo;
///
/// impl MicroService for Echo {
///     fn initialize(worker: &mut ManagedWorker<Idle, Self>) {
///         worker.on_event::<Ping>(|_, ctx| {
///             ctx.complete("pong".to_string());
///             Reaction::ready()
///         });
///     }
/// }
/// ```
pub trait MicroService: Default + Send + Debug + 'static {
    /// Installs reactions and lifecycle hooks on a freshly created worker.
    fn initialize(worker: &mut ManagedWorker<Idle, Self>);
}
