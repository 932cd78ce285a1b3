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

use tracing::trace;

use crate::common::{BusConfig, BusRuntime, CONFIG};

/// Entry point for bringing up a bus and the runtime that manages its workers.
///
/// ```rust,ignore
/// let runtime = BusApp::launch();
/// let echo = runtime.spawn_service::<Echo>("echo").await;
/// ```
#[derive(Default, Debug, Clone)]
pub struct BusApp;

impl BusApp {
    /// Creates a runtime with a fresh bus, using the configuration loaded from
    /// the XDG config directory (or the defaults).
    #[must_use]
    pub fn launch() -> BusRuntime {
        trace!("launching bus runtime with loaded configuration");
        Self::launch_with_config(CONFIG.clone())
    }

    /// Creates a runtime with a fresh bus and an explicit configuration.
    #[must_use]
    pub fn launch_with_config(config: BusConfig) -> BusRuntime {
        trace!(?config, "launching bus runtime");
        BusRuntime::new(config)
    }
}
