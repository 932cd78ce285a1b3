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

//! The runtime's moving parts.
//!
//! *   [`MessageBus`]: inboxes, subscriber rotations and the in-flight event table.
//! *   [`Outcome`] / [`Resolver`]: the single-assignment result of a routed event.
//! *   [`WorkerHandle`]: terminate and join a started worker.
//! *   [`BusApp`] / [`BusRuntime`]: create a bus and manage the workers on it.
//! *   [`BusConfig`]: configuration loaded from the XDG config directory.
//! *   [`Reaction`]: builders for the futures reactions return.

pub use app::BusApp;
pub use bus::MessageBus;
pub use config::{BusConfig, CONFIG};
pub use outcome::{Outcome, Resolver};
pub use reaction::Reaction;
pub use runtime::BusRuntime;
pub use types::ReactionFuture;
pub(crate) use types::{LifecycleHook, ReactorItem, ReactorMap};
pub use worker_handle::WorkerHandle;

mod app;
mod bus;
pub(crate) mod config;
mod inbox;
mod outcome;
mod reaction;
mod runtime;
mod runtime_inner;
mod types;
mod worker_handle;
