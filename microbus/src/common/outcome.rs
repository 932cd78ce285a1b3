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

use std::fmt::Debug;
use std::time::Duration;

use tokio::sync::watch;

use crate::message::{BusError, EventId};

/// The read side of a single-assignment result: what `send_event` hands the sender.
///
/// Cloning an `Outcome` yields another reader of the same cell. The value is
/// set at most once, by the matching [`Resolver`]; every reader observes the
/// same value.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    rx: watch::Receiver<Option<T>>,
    event: Option<EventId>,
}

/// The write side of a single-assignment result.
///
/// Held by the bus's in-flight table for routed events. Dropping an
/// unresolved `Resolver` abandons its outcomes.
#[derive(Debug)]
pub struct Resolver<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> Outcome<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    /// Creates an unresolved cell not tied to any routed event.
    #[must_use]
    pub fn pending() -> (Resolver<T>, Self) {
        let (tx, rx) = watch::channel(None);
        (Resolver { tx }, Self { rx, event: None })
    }

    pub(crate) fn routed(id: EventId) -> (Resolver<T>, Self) {
        let (resolver, mut outcome) = Self::pending();
        outcome.event = Some(id);
        (resolver, outcome)
    }

    /// The identity of the event this outcome belongs to, if it came from `send_event`.
    #[inline]
    #[must_use]
    pub const fn event_id(&self) -> Option<EventId> {
        self.event
    }

    /// `true` once a value has been set.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// The value, if already set. Never waits.
    #[must_use]
    pub fn try_get(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Waits until the value is set and returns a copy of it.
    ///
    /// # Errors
    ///
    /// [`BusError::Abandoned`] if the resolver went away without setting a value,
    /// for example because the handling worker unregistered.
    pub async fn get(&self) -> Result<T, BusError> {
        let mut rx = self.rx.clone();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(value) = current {
                return Ok(value);
            }
            if rx.changed().await.is_err() {
                // sender dropped; it may still have resolved just before
                let last = rx.borrow().clone();
                return last.ok_or(BusError::Abandoned);
            }
        }
    }

    /// Like [`get`](Self::get), giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`BusError::TimedOut`] when the wait elapses, [`BusError::Abandoned`] as for `get`.
    pub async fn get_timeout(&self, timeout: Duration) -> Result<T, BusError> {
        match tokio::time::timeout(timeout, self.get()).await {
            Ok(result) => result,
            Err(_) => Err(BusError::TimedOut(timeout)),
        }
    }

    /// Blocks the current thread until the value is set.
    ///
    /// For plain threads outside the async runtime. Calling this from inside a
    /// tokio task stalls that task's worker thread.
    ///
    /// # Errors
    ///
    /// As for [`get`](Self::get).
    pub fn blocking_get(&self) -> Result<T, BusError> {
        futures::executor::block_on(self.get())
    }
}

impl<T> Resolver<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    /// Sets the value if it is not set yet and wakes every waiting reader.
    ///
    /// Returns `false`, leaving the first value in place, if it was already set.
    pub fn resolve(&self, value: T) -> bool {
        let mut value = Some(value);
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = value.take();
            true
        })
    }
}
