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

//! Core traits of the runtime.
//!
//! *   [`BusMessage`]: blanket-implemented marker for anything that can sit in an inbox.
//! *   [`Event`]: a request with exactly one eventual reply.
//! *   [`Broadcast`]: a notification for every subscriber.
//! *   [`MicroService`]: a worker state type that knows how to wire its own reactions.
//! *   [`WorkerHandleInterface`]: terminate, join and stop a running worker.

pub use bus_message::{Broadcast, BusMessage, Event};
pub use micro_service::MicroService;
pub use worker_handle_interface::WorkerHandleInterface;

mod bus_message;
mod micro_service;
mod worker_handle_interface;
