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

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::common::{BusConfig, MessageBus, WorkerHandle};
use crate::worker::WorkerId;

/// Shared state behind every clone of a [`BusRuntime`](crate::common::BusRuntime).
#[derive(Debug)]
pub(crate) struct RuntimeInner {
    /// The bus every worker of this runtime is created on.
    pub(crate) bus: MessageBus,

    /// Handles of started workers that have not exited yet.
    pub(crate) workers: DashMap<WorkerId, WorkerHandle>,

    /// Parent of every worker's cancellation token.
    pub(crate) cancellation_token: CancellationToken,

    pub(crate) config: BusConfig,
}

impl RuntimeInner {
    pub(crate) fn new(config: BusConfig) -> Self {
        Self {
            bus: MessageBus::with_config(&config),
            workers: DashMap::new(),
            cancellation_token: CancellationToken::new(),
            config,
        }
    }
}
