//! The async run loop on tokio.

mod common;

use std::time::Duration;

use common::{scheduler, status, FakeController, RecordingNotifier, ScriptedTrigger};
use sentinel_core::{Health, SyncState};
use sentinel_daemon::{run, RunOptions};
use tokio::time::Instant;

fn options(max_cycles: u64) -> RunOptions {
    RunOptions {
        poll_interval: Duration::ZERO,
        error_backoff: Duration::ZERO,
        max_cycles: Some(max_cycles),
    }
}

fn timed_options(max_cycles: u64) -> RunOptions {
    RunOptions {
        poll_interval: Duration::from_secs(60),
        error_backoff: Duration::from_secs(30),
        max_cycles: Some(max_cycles),
    }
}

fn assert_elapsed(started: Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_secs(1),
        "expected ~{expected:?}, waited {elapsed:?}"
    );
}

#[tokio::test]
async fn stops_after_the_cycle_limit() {
    let controller = FakeController::with_apps(&[(
        "web",
        status(Health::Healthy, SyncState::Synced, "r1"),
    )]);
    let (notifier, trigger) = (RecordingNotifier::default(), ScriptedTrigger::default());

    let sched = run(scheduler(&controller, &notifier, &trigger), options(3))
        .await
        .expect("run");

    assert_eq!(controller.count("list"), 3);
    assert_eq!(sched.reconciler().len(), 1);
}

#[tokio::test]
async fn failed_cycles_back_off_and_continue() {
    let controller = FakeController::default();
    controller.0.lock().unwrap().fail_listing = true;
    let (notifier, trigger) = (RecordingNotifier::default(), ScriptedTrigger::default());

    let result = run(scheduler(&controller, &notifier, &trigger), options(2)).await;

    assert!(result.is_ok());
    assert_eq!(controller.count("list"), 2);
}

#[tokio::test]
async fn state_survives_across_cycles() {
    let controller = FakeController::with_apps(&[(
        "api",
        status(Health::Degraded, SyncState::Synced, "r1"),
    )]);
    let (notifier, trigger) = (RecordingNotifier::default(), ScriptedTrigger::default());

    let sched = run(scheduler(&controller, &notifier, &trigger), options(5))
        .await
        .expect("run");

    assert_eq!(controller.count("sync:api"), 3);
    assert!(sched.reconciler().state(&"api".into()).unwrap().is_paused());
}

#[tokio::test(start_paused = true)]
async fn good_cycles_are_spaced_by_the_poll_interval() {
    let controller = FakeController::with_apps(&[(
        "web",
        status(Health::Healthy, SyncState::Synced, "r1"),
    )]);
    let (notifier, trigger) = (RecordingNotifier::default(), ScriptedTrigger::default());

    let started = Instant::now();
    run(scheduler(&controller, &notifier, &trigger), timed_options(3))
        .await
        .expect("run");

    // Two sleeps between three cycles; none after the last.
    assert_elapsed(started, Duration::from_secs(120));
}

#[tokio::test(start_paused = true)]
async fn failed_cycles_are_spaced_by_the_error_backoff() {
    let controller = FakeController::default();
    controller.0.lock().unwrap().fail_listing = true;
    let (notifier, trigger) = (RecordingNotifier::default(), ScriptedTrigger::default());

    let started = Instant::now();
    run(scheduler(&controller, &notifier, &trigger), timed_options(3))
        .await
        .expect("run");

    assert_elapsed(started, Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn empty_listing_backs_off_like_an_error() {
    let controller = FakeController::default();
    let (notifier, trigger) = (RecordingNotifier::default(), ScriptedTrigger::default());

    let started = Instant::now();
    run(scheduler(&controller, &notifier, &trigger), timed_options(2))
        .await
        .expect("run");

    assert_elapsed(started, Duration::from_secs(30));
    assert_eq!(controller.count("list"), 2);
}
