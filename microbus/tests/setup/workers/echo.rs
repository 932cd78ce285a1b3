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

use microbus::prelude::*;

use crate::setup::messages::Ping;

/// Answers every `Ping` with `"pong"`.
#[bus_worker]
pub struct Echo {
    pub answered: usize,
}

impl MicroService for Echo {
    fn initialize(worker: &mut ManagedWorker<Idle, Self>) {
        worker.on_event::<Ping>(|worker, ctx| {
            worker.model.answered += 1;
            ctx.complete("pong".to_string());
            Reaction::ready()
        });
    }
}
