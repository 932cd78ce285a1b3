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

use std::future::Future;

use crate::common::ReactionFuture;

/// Builders for the [`ReactionFuture`] every reaction returns.
///
/// ```rust,ignore
/// worker
///     .on_broadcast::<Tick>(|worker, _| {
///         worker.model.ticks += 1;
///         Reaction::ready()
///     })
///     .on_event::<Ping>(|worker, ctx| {
///         let bus = worker.bus().clone();
///         Reaction::pending(async move {
///             bus.send_broadcast(Tick);
///             ctx.complete("pong".to_string());
///         })
///     });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reaction;

impl Reaction {
    /// A reaction that did all its work synchronously.
    #[inline]
    #[must_use]
    pub fn ready() -> ReactionFuture {
        Box::pin(async {})
    }

    /// A reaction that continues asynchronously.
    ///
    /// The worker awaits it before taking the next message from its inbox.
    pub fn pending<F>(future: F) -> ReactionFuture
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Box::pin(future)
    }
}
