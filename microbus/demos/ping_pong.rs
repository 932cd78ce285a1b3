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

use microbus::prelude::*;

// --- Messages ---

/// Asked of whichever pong worker is next in line.
#[bus_event(String)]
struct Ping(u32);

/// Sent to every worker once per round.
#[bus_broadcast]
struct Tick(u32);

// --- Workers ---

/// Answers pings and counts the rounds it has seen.
#[bus_worker]
struct Ponger {
    answered: u32,
    rounds: u32,
}

impl MicroService for Ponger {
    fn initialize(worker: &mut ManagedWorker<Idle, Self>) {
        worker
            .on_event::<Ping>(|worker, ctx| {
                worker.model.answered += 1;
                let reply = format!("pong {} from {}", ctx.event().0, worker.name());
                ctx.complete(reply);
                Reaction::ready()
            })
            .on_broadcast::<Tick>(|worker, _| {
                worker.model.rounds += 1;
                Reaction::ready()
            })
            .after_stop(|worker| {
                println!(
                    "{} answered {} pings over {} rounds",
                    worker.name(),
                    worker.model.answered,
                    worker.model.rounds
                );
                Reaction::ready()
            });
    }
}

/// Prints every worker that comes up or goes away.
#[bus_worker]
struct Roster;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. Launch a runtime; it owns the bus every worker shares.
    let runtime = BusApp::launch();

    // 2. A roster that watches lifecycle announcements, silent about itself.
    let mut roster = runtime.new_worker::<Roster>("roster");
    roster
        .announce_lifecycle(false)
        .on_broadcast::<WorkerStateChanged>(|_, ctx| {
            let change = ctx.broadcast();
            println!("{} is now {:?}", change.worker, change.state);
            Reaction::ready()
        });
    roster.start().await;

    // 3. Two pongers share the Ping rotation.
    runtime.spawn_service::<Ponger>("left").await;
    runtime.spawn_service::<Ponger>("right").await;

    // 4. Each round: one broadcast to everyone, two pings served round-robin.
    for round in 0..3 {
        runtime.bus().send_broadcast(Tick(round));
        for n in 0..2 {
            let Some(outcome) = runtime.bus().send_event(Ping(round * 2 + n)) else {
                println!("nobody to answer ping {n}");
                continue;
            };
            println!("{}", outcome.get_timeout(Duration::from_secs(1)).await?);
        }
    }

    // 5. Stop everything; announcements and final counts are printed on the way out.
    runtime.shutdown_all().await?;
    Ok(())
}
