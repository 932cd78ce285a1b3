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

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # microbus
//!
//! An in-process message bus for micro-service style workers, built on Tokio.
//!
//! Workers never call each other. They register with a shared [`MessageBus`](prelude::MessageBus),
//! subscribe to message types, and react to what arrives in their inbox.
//!
//! ## Key Concepts
//!
//! - **Events**: requests with exactly one eventual reply. Each event goes to
//!   one subscriber, chosen round-robin per event type; the sender holds an
//!   [`Outcome`](prelude::Outcome) that resolves when the handler completes it.
//! - **Broadcasts**: fire-and-forget notifications delivered to every worker
//!   subscribed at the moment of sending.
//! - **Workers (`ManagedWorker`)**: a user model plus one reaction per message
//!   type, driven by a loop on its own task. Type-state (`Idle`, `Started`)
//!   separates configuration from running.
//! - **Runtime (`BusRuntime`)**: owns a bus and tracks started workers for
//!   joining and shutdown.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use microbus::prelude::*;
//!
//! #[bus_event(String)]
//! struct Ping;
//!
//! #[bus_worker]
//! struct Echo;
//!
//! let runtime = BusApp::launch();
//! let mut echo = runtime.new_worker::<Echo>("echo");
//! echo.on_event::<Ping>(|_, ctx| {
//!     ctx.complete("pong".to_string());
//!     Reaction::ready()
//! });
//! echo.start().await;
//!
//! let reply = runtime.bus().send_event(Ping).expect("served").get().await?;
//! assert_eq!(reply, "pong");
//! ```

/// Bus, runtime, outcomes and configuration.
pub(crate) mod common;

/// Message envelopes, contexts, errors and the lifecycle broadcast.
pub(crate) mod message;

/// Core traits.
pub(crate) mod traits;

/// The managed worker and its type-state.
pub(crate) mod worker;

/// Everything needed to define messages and workers and to run them.
///
/// ## Macros (from `microbus-macro`)
/// *   `bus_event`: turns a struct into an [`Event`](crate::traits::Event) with the given reply type.
/// *   `bus_broadcast`: turns a struct into a [`Broadcast`](crate::traits::Broadcast).
/// *   `bus_worker`: derives what a worker model needs.
pub mod prelude {
    pub use microbus_macro::*;

    pub use async_trait::async_trait;

    pub use crate::common::{
        BusApp, BusConfig, BusRuntime, MessageBus, Outcome, Reaction, ReactionFuture, Resolver,
        WorkerHandle,
    };
    pub use crate::message::{
        BroadcastContext, BusError, Envelope, EventContext, EventId, WorkerState,
        WorkerStateChanged,
    };
    pub use crate::traits::{Broadcast, BusMessage, Event, MicroService, WorkerHandleInterface};
    pub use crate::worker::{Idle, ManagedWorker, Started, WorkerId};
}
