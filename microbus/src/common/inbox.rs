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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::message::Envelope;

/// A worker's unbounded FIFO of envelopes.
///
/// There is exactly one consumer (the owning worker's loop). Producers push
/// while the bus holds a read guard on the inbox map, so once the inbox has
/// been removed from the map and closed nothing more can arrive.
#[derive(Debug, Default)]
pub(crate) struct Inbox {
    queue: Mutex<VecDeque<Envelope>>,
    ready: Notify,
    closed: AtomicBool,
}

impl Inbox {
    /// Appends an envelope and wakes the consumer. Returns the new depth.
    pub(crate) fn push(&self, envelope: Envelope) -> usize {
        let depth = {
            let mut queue = self.queue.lock();
            queue.push_back(envelope);
            queue.len()
        };
        self.ready.notify_one();
        depth
    }

    /// Waits for the next envelope. `None` once the inbox is closed.
    ///
    /// Cancel safe: an envelope is only taken off the queue on the same poll
    /// that returns it.
    pub(crate) async fn pop(&self) -> Option<Envelope> {
        loop {
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            if let Some(envelope) = self.queue.lock().pop_front() {
                return Some(envelope);
            }
            // notify_one stores a permit if nobody is waiting yet, so a push or
            // close between the checks above and this await is not missed.
            self.ready.notified().await;
        }
    }

    /// Marks the inbox closed, wakes the consumer and discards what was queued.
    /// Returns the number of discarded envelopes.
    pub(crate) fn close(&self) -> usize {
        self.closed.store(true, Ordering::Release);
        let dropped = std::mem::take(&mut *self.queue.lock()).len();
        self.ready.notify_one();
        dropped
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }
}
