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
use std::time::Duration;

use crate::worker::WorkerId;

/// Errors surfaced by the [`MessageBus`](crate::common::MessageBus) and by
/// [`Outcome`](crate::common::Outcome) waits.
///
/// Conditions the bus treats as normal are not errors: an event nobody serves
/// comes back as `None` from `send_event`, and a completion for an event that
/// is no longer in flight simply returns `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The worker has no inbox, either because it never registered or because it
    /// was unregistered (possibly while waiting).
    UnregisteredWorker(WorkerId),
    /// The outcome can no longer be resolved: its handling worker unregistered
    /// with the event still pending, or the resolver was dropped.
    Abandoned,
    /// A bounded wait elapsed before the outcome was resolved.
    TimedOut(Duration),
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnregisteredWorker(id) => write!(f, "worker {id} is not registered with the bus"),
            Self::Abandoned => write!(f, "outcome abandoned before it was resolved"),
            Self::TimedOut(after) => write!(f, "outcome not resolved after {after:?}"),
        }
    }
}

impl std::error::Error for BusError {}
