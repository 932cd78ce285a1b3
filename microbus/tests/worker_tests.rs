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

use std::sync::Arc;
use std::time::Duration;

use microbus::prelude::*;
use microbus_test::prelude::*;
use parking_lot::Mutex;

use crate::setup::*;

mod setup;

#[bus_worker]
struct Watcher {
    seen: Vec<(WorkerId, WorkerState)>,
}

#[bus_worker]
struct Quitter {
    ticks: u32,
}

#[bus_test]
async fn test_lifecycle_announcements() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch_with_config(BusConfig::default());

    let announcer = runtime.new_worker::<Echo>("announcer");
    let announcer_id = announcer.id().clone();

    let (saw_stop, stopped) = Outcome::<WorkerId>::pending();
    let saw_stop = Arc::new(saw_stop);
    let mut watcher = runtime.new_worker::<Watcher>("watcher");
    let expected = announcer_id.clone();
    watcher
        .announce_lifecycle(false)
        .on_broadcast::<WorkerStateChanged>(move |worker, ctx| {
            let change = ctx.broadcast().clone();
            if change.state == WorkerState::Stopped {
                saw_stop.resolve(change.worker.clone());
            }
            worker.model.seen.push((change.worker, change.state));
            Reaction::ready()
        })
        .after_stop(move |worker| {
            assert_eq!(
                worker.model.seen,
                vec![
                    (expected.clone(), WorkerState::Started),
                    (expected.clone(), WorkerState::Stopped),
                ]
            );
            Reaction::ready()
        });
    watcher.start().await;

    let announcer = announcer.start().await;
    announcer.stop().await?;

    assert_eq!(stopped.get_timeout(Duration::from_secs(2)).await?, announcer_id);
    runtime.shutdown_all().await?;
    Ok(())
}

#[bus_test]
async fn test_terminate_from_reaction() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch();
    let mut quitter = runtime.new_worker::<Quitter>("quitter");
    quitter
        .on_broadcast::<Tick>(|worker, _| {
            worker.model.ticks += 1;
            Reaction::ready()
        })
        .on_broadcast::<Quit>(|worker, _| {
            worker.terminate();
            Reaction::ready()
        })
        .after_stop(|worker| {
            assert_eq!(worker.model.ticks, 1, "ticks after Quit must not be handled");
            Reaction::ready()
        });
    let id = quitter.id().clone();
    let handle = quitter.start().await;

    runtime.bus().send_broadcast(Tick { n: 1 });
    runtime.bus().send_broadcast(Quit);
    runtime.bus().send_broadcast(Tick { n: 2 });

    tokio::time::timeout(Duration::from_secs(2), handle.join()).await?;
    assert!(handle.is_terminated());
    assert!(!runtime.bus().is_registered(&id));
    assert_eq!(runtime.worker_count(), 0);
    Ok(())
}

#[bus_test]
async fn test_missing_reaction_is_ignored() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch();
    let echo = runtime.spawn_service::<Echo>("echo").await;

    // subscribed behind the worker's back; it has no reaction for Stray
    runtime.bus().subscribe_broadcast::<Stray>(echo.id());
    assert_eq!(runtime.bus().send_broadcast(Stray), 1);

    let reply = runtime.bus().send_event(Ping).expect("echo subscribed").get().await?;
    assert_eq!(reply, "pong");
    assert!(!echo.is_terminated());

    runtime.shutdown_all().await?;
    Ok(())
}

#[bus_test]
async fn test_hooks_run_in_order() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch();
    let log: Arc<Mutex<Vec<(&'static str, bool)>>> = Arc::default();

    let mut worker = runtime.new_worker::<Echo>("hooked");
    let (after_start, before_stop, after_stop) = (log.clone(), log.clone(), log.clone());
    worker
        .after_start(move |worker| {
            after_start
                .lock()
                .push(("after_start", worker.bus().is_registered(worker.id())));
            Reaction::ready()
        })
        .before_stop(move |worker| {
            before_stop
                .lock()
                .push(("before_stop", worker.bus().is_registered(worker.id())));
            Reaction::ready()
        })
        .after_stop(move |worker| {
            after_stop
                .lock()
                .push(("after_stop", worker.bus().is_registered(worker.id())));
            Reaction::ready()
        });
    let handle = worker.start().await;
    handle.stop().await?;

    assert_eq!(
        *log.lock(),
        vec![("after_start", true), ("before_stop", true), ("after_stop", false)]
    );
    Ok(())
}

#[bus_test]
async fn test_redeclared_reaction_replaces_the_first() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch();
    let handle = runtime
        .spawn_worker::<Echo>("fickle", |worker| {
            worker
                .on_event::<Ping>(|_, ctx| {
                    ctx.complete("first".to_string());
                    Reaction::ready()
                })
                .on_event::<Ping>(|_, ctx| {
                    ctx.complete("second".to_string());
                    Reaction::ready()
                });
        })
        .await;

    assert_eq!(runtime.bus().subscriber_count::<Ping>(), 1);
    let reply = runtime.bus().send_event(Ping).expect("fickle subscribed").get().await?;
    assert_eq!(reply, "second");

    handle.stop().await?;
    Ok(())
}

#[bus_test]
async fn test_join_all_waits_for_self_terminating_workers() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch();
    for n in 0..3 {
        runtime
            .spawn_worker::<Quitter>(format!("quitter-{n}"), |worker| {
                worker.on_broadcast::<Quit>(|worker, _| {
                    worker.terminate();
                    Reaction::ready()
                });
            })
            .await;
    }
    assert_eq!(runtime.worker_count(), 3);
    assert_eq!(runtime.bus().send_broadcast(Quit), 3);

    tokio::time::timeout(Duration::from_secs(2), runtime.join_all()).await?;
    assert_eq!(runtime.worker_count(), 0);
    assert_eq!(runtime.bus().registered_count(), 0);
    Ok(())
}

#[bus_test]
async fn test_shutdown_all_stops_everything() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = BusApp::launch();
    runtime.spawn_service::<Echo>("echo").await;
    runtime.spawn_service::<Echo>("echo").await;
    runtime.spawn_service::<Counter>("counter").await;

    assert_eq!(runtime.worker_count(), 3);
    assert_eq!(runtime.bus().registered_named("echo"), 2);
    assert_eq!(runtime.bus().subscriber_count::<Ping>(), 2);

    runtime.shutdown_all().await?;
    assert_eq!(runtime.worker_count(), 0);
    assert_eq!(runtime.bus().registered_count(), 0);
    assert_eq!(runtime.bus().subscriber_count::<Ping>(), 0);
    Ok(())
}

#[bus_test]
async fn test_default_worker_name() -> anyhow::Result<()> {
    initialize_tracing();
    let mut config = BusConfig::default();
    config.defaults.worker_name = "drone".to_string();
    let runtime = BusApp::launch_with_config(config);

    let mut worker = runtime.new_worker_default::<Echo>();
    Echo::initialize(&mut worker);
    assert_eq!(worker.name(), "drone");
    let handle = worker.start().await;
    assert_eq!(runtime.bus().registered_named("drone"), 1);

    handle.stop().await?;
    Ok(())
}

#[bus_test]
async fn test_worker_on_a_bare_bus() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::with_config(&BusConfig::default());
    let mut solo = ManagedWorker::<Idle, Echo>::on_bus(&bus, "solo");
    Echo::initialize(&mut solo);
    let solo = solo.start().await;

    assert_eq!(bus.send_event(Ping).expect("solo subscribed").get().await?, "pong");
    solo.stop().await?;
    assert!(!bus.is_registered(solo.id()));
    Ok(())
}
