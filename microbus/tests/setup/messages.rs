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

/// Asks an echo worker for `"pong"`.
#[bus_event(String)]
pub struct Ping;

/// Asks whoever handles it to add `amount` and report the new total.
#[bus_event(u64)]
pub struct Add {
    pub amount: u64,
}

/// Asks a worker which worker it is.
#[bus_event(WorkerId)]
pub struct WhoAreYou;

/// Fired at every subscriber.
#[bus_broadcast]
pub struct Tick {
    pub n: u32,
}

/// Tells the receiver to leave its loop.
#[bus_broadcast]
pub struct Quit;

/// Nobody declares a reaction for this one.
#[bus_broadcast]
pub struct Stray;
