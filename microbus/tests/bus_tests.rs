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

use std::collections::HashMap;
use std::time::Duration;

use microbus::prelude::*;
use microbus_test::prelude::*;
use tracing::info;

use crate::setup::*;

mod setup;

fn quiet_config() -> BusConfig {
    let mut config = BusConfig::default();
    config.behavior.announce_lifecycle = false;
    config
}

#[bus_test]
async fn test_ping_pong() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(quiet_config());
    let mut echo = runtime.new_worker::<Echo>("echo");
    Echo::initialize(&mut echo);
    echo.after_stop(|worker| {
        assert_eq!(worker.model.answered, 2, "echo should have answered twice");
        Reaction::ready()
    });
    let echo = echo.start().await;

    let first = runtime.bus().send_event(Ping).expect("echo subscribed");
    assert_eq!(first.get().await?, "pong");
    info!("first ping answered");

    // a single-subscriber rotation keeps choosing the same worker
    let second = runtime.bus().send_event(Ping).expect("echo subscribed");
    assert_eq!(second.get_timeout(Duration::from_secs(1)).await?, "pong");
    assert!(first.is_done() && second.is_done());
    assert_ne!(first.event_id(), second.event_id());

    echo.stop().await?;
    Ok(())
}

#[bus_test]
async fn test_ping_pong_between_workers() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(quiet_config());
    runtime.spawn_service::<Echo>("echo").await;

    // a second worker asks from inside its own startup hook
    let mut asker = runtime.new_worker::<Echo>("asker");
    let (resolver, heard) = Outcome::<String>::pending();
    let resolver = std::sync::Arc::new(resolver);
    asker.after_start(move |worker| {
        let outcome = worker.send_event(Ping);
        let resolver = resolver.clone();
        async move {
            if let Some(outcome) = outcome {
                if let Ok(reply) = outcome.get().await {
                    resolver.resolve(reply);
                }
            }
        }
    });
    asker.start().await;

    assert_eq!(heard.get_timeout(Duration::from_secs(2)).await?, "pong");
    runtime.shutdown_all().await?;
    Ok(())
}

#[bus_test]
async fn test_round_robin_across_workers() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(quiet_config());
    let mut ids = Vec::new();
    for name in ["first", "second", "third"] {
        let mut worker = runtime.new_worker::<Echo>(name);
        worker.on_event::<WhoAreYou>(|worker, ctx| {
            ctx.complete(worker.id().clone());
            Reaction::ready()
        });
        ids.push(worker.id().clone());
        worker.start().await;
    }

    let mut served: HashMap<WorkerId, usize> = HashMap::new();
    let mut order = Vec::new();
    for _ in 0..9 {
        let who = runtime
            .bus()
            .send_event(WhoAreYou)
            .expect("three subscribers")
            .get()
            .await?;
        order.push(who.clone());
        *served.entry(who).or_default() += 1;
    }

    for id in &ids {
        assert_eq!(served.get(id), Some(&3), "{id} should have served three events");
    }
    // subscription order is the dispatch order
    assert_eq!(&order[..3], &ids[..]);
    assert_eq!(&order[3..6], &ids[..]);

    runtime.shutdown_all().await?;
    Ok(())
}

#[bus_test]
async fn test_broadcast_reaches_every_subscriber() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(quiet_config());

    let mut handles = Vec::new();
    for n in 0..3 {
        let mut counter = runtime.new_worker::<Counter>(format!("counter-{n}"));
        Counter::initialize(&mut counter);
        counter.after_stop(|worker| {
            assert_eq!(worker.model.ticks, 5, "every tick should arrive");
            Reaction::ready()
        });
        handles.push(counter.start().await);
    }
    // subscribed to nothing; broadcasts must not reach it
    runtime.spawn_service::<Echo>("bystander").await;

    for n in 0..5 {
        assert_eq!(runtime.bus().send_broadcast(Tick { n }), 3);
    }

    // inboxes are FIFO: once each counter has answered an Add queued behind the
    // ticks, every tick has been handled
    for _ in &handles {
        runtime.bus().send_event(Add { amount: 0 }).expect("counters").get().await?;
    }

    runtime.shutdown_all().await?;
    Ok(())
}

#[bus_test]
async fn test_async_reactions_complete_in_order() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(quiet_config());
    runtime.spawn_service::<Counter>("counter").await;

    let outcomes: Vec<_> = (1..=4)
        .map(|amount| runtime.bus().send_event(Add { amount }).expect("counter"))
        .collect();

    let mut totals = Vec::new();
    for outcome in outcomes {
        totals.push(outcome.get().await?);
    }
    assert_eq!(totals, vec![1, 3, 6, 10]);

    runtime.shutdown_all().await?;
    Ok(())
}

#[bus_test]
async fn test_unserved_event_returns_none() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(quiet_config());
    assert!(runtime.bus().send_event(Ping).is_none());

    let echo = runtime.spawn_service::<Echo>("echo").await;
    echo.stop().await?;
    assert!(runtime.bus().send_event(Ping).is_none());
    assert_eq!(runtime.bus().registered_count(), 0);
    Ok(())
}

#[bus_test]
async fn test_stopped_handler_abandons_pending_events() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(quiet_config());

    // never completes what it receives
    let mut sink = runtime.new_worker::<Echo>("sink");
    sink.on_event::<Ping>(|_, _| Reaction::ready());
    let sink = sink.start().await;

    let outcome = runtime.bus().send_event(Ping).expect("sink subscribed");
    let id = outcome.event_id().expect("routed");
    sink.stop().await?;

    assert_eq!(outcome.get().await, Err(BusError::Abandoned));
    assert!(!runtime.bus().complete::<Ping>(id, "late".to_string()));
    assert_eq!(runtime.bus().in_flight_count(), 0);
    Ok(())
}
