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
use derive_new::new;

use crate::traits::Broadcast;
use crate::worker::WorkerId;

/// Where a worker is in its life, as announced by [`WorkerStateChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// The worker is registered, subscribed, initialized and about to wait for messages.
    Started,
    /// The worker left its loop and is unregistering.
    Stopped,
}

/// Broadcast by every announcing worker when it enters and when it leaves its loop.
///
/// Coordinators subscribe to this to learn when the services they depend on
/// have come up or gone away. Announcing is on by default
/// (`behavior.announce_lifecycle`) and can be switched off per worker with
/// [`ManagedWorker::announce_lifecycle`](crate::worker::ManagedWorker::announce_lifecycle).
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct WorkerStateChanged {
    /// The worker whose state changed.
    pub worker: WorkerId,
    /// Its new state.
    pub state: WorkerState,
}

impl Broadcast for WorkerStateChanged {}
