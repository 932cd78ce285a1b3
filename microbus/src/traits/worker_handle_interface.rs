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
use async_trait::async_trait;

use crate::worker::WorkerId;

/// The control surface of a running worker.
///
/// Implemented by [`WorkerHandle`](crate::common::WorkerHandle). Everything here is
/// safe to call from any task, including from inside another worker's reaction.
#[async_trait]
pub trait WorkerHandleInterface: Send + Sync {
    /// The identity of the worker behind this handle.
    fn id(&self) -> &WorkerId;

    /// The worker's diagnostic name.
    fn name(&self) -> &str {
        self.id().name()
    }

    /// Asks the worker to leave its loop once the current reaction, if any, returns.
    ///
    /// Calling this more than once has no further effect.
    fn terminate(&self);

    /// `true` once termination has been requested.
    fn is_terminated(&self) -> bool;

    /// Waits until the worker's task has exited and it has unregistered from the bus.
    async fn join(&self);

    /// Terminates the worker and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker does not exit within the configured
    /// worker shutdown timeout.
    async fn stop(&self) -> anyhow::Result<()>;
}
