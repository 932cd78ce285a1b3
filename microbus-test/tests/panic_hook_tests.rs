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

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use microbus_test::prelude::*;

// Ignored by the harness and called directly below, so no other test in this
// binary touches the process-wide hook.
#[bus_test]
#[ignore]
async fn quiet_test_body() {
    tokio::task::yield_now().await;
}

#[test]
fn previous_panic_hook_is_restored() {
    let seen = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&seen);
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |_| flag.store(true, Ordering::SeqCst)));

    quiet_test_body();
    let caught = panic::catch_unwind(|| panic!("raised after the bus test"));

    let _ = panic::take_hook();
    panic::set_hook(default_hook);
    assert!(caught.is_err());
    assert!(seen.load(Ordering::SeqCst));
}
