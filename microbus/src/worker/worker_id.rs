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
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_WORKER: AtomicU64 = AtomicU64::new(1);

/// Identity of a worker on the bus.
///
/// The name is diagnostic only and need not be unique; two workers with the
/// same name are still different workers. Equality and hashing use the
/// process-wide sequence number allocated by [`WorkerId::new`].
#[derive(Clone)]
pub struct WorkerId {
    seq: u64,
    name: Arc<str>,
}

impl WorkerId {
    /// Allocates a fresh identity with the given diagnostic name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            seq: NEXT_WORKER.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
        }
    }

    /// The diagnostic name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for WorkerId {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for WorkerId {}

impl Hash for WorkerId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seq.hash(state);
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.seq)
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_still_distinct() {
        let a = WorkerId::new("camera");
        let b = WorkerId::new("camera");
        assert_ne!(a, b);
        assert_eq!(a.name(), b.name());
        assert_eq!(a.clone(), a);
    }
}
