//! Rotation scheduler integration tests
//!
//! Timer behaviour runs on tokio's paused clock, so `sleep` jumps straight to
//! the next tick and results are deterministic.

mod helpers;

use helpers::drain_events;
use madrasa_common::config::RotationConfig;
use madrasa_common::events::{EventBus, MediaEvent, RotationTrigger};
use madrasa_media::RotationScheduler;
use std::time::Duration;
use tokio::time;

const PERIOD: Duration = Duration::from_millis(5000);
const EPSILON: Duration = Duration::from_millis(5);

fn scheduler(item_count: usize, items_per_view: usize) -> RotationScheduler {
    RotationScheduler::new(item_count, items_per_view, PERIOD, EventBus::new(128))
}

fn triggers(events: &[MediaEvent]) -> Vec<(usize, RotationTrigger)> {
    events
        .iter()
        .filter_map(|event| match event {
            MediaEvent::RotationAdvanced { index, trigger, .. } => Some((*index, *trigger)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_eight_items_four_per_view_scenario() {
    let scheduler = scheduler(8, 4);

    assert_eq!(scheduler.next(), 4);
    assert_eq!(scheduler.next(), 0);

    scheduler.jump_to(4);
    assert_eq!(scheduler.set_items_per_view(3), 4);
    assert_eq!(scheduler.set_items_per_view(6), 2);
}

#[test]
fn test_jump_out_of_range_clamps() {
    let scheduler = scheduler(9, 3);
    assert_eq!(scheduler.jump_to(100), 6);
    assert_eq!(scheduler.jump_to_page(1), 3);
    assert_eq!(scheduler.jump_to_page(50), 6);
}

#[test]
fn test_empty_carousel_is_inert() {
    let scheduler = scheduler(0, 3);
    assert_eq!(scheduler.next(), 0);
    assert_eq!(scheduler.prev(), 0);
    assert_eq!(scheduler.jump_to(7), 0);
    assert_eq!(scheduler.snapshot().page_count, 0);
}

#[test]
fn test_manual_events_only_on_change() {
    let scheduler = scheduler(4, 4);
    let mut rx = scheduler.subscribe();

    scheduler.next();
    scheduler.prev();
    assert!(drain_events(&mut rx).is_empty());

    scheduler.set_item_count(10);
    scheduler.next();
    assert_eq!(
        triggers(&drain_events(&mut rx)),
        vec![(4, RotationTrigger::Manual)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_timer_and_manual_coexist() {
    let scheduler = scheduler(12, 3);
    let mut rx = scheduler.subscribe();
    scheduler.start();

    time::sleep(PERIOD + EPSILON).await;
    assert_eq!(scheduler.next(), 6);
    time::sleep(PERIOD).await;

    assert_eq!(scheduler.snapshot().index, 9);
    assert_eq!(
        triggers(&drain_events(&mut rx)),
        vec![
            (3, RotationTrigger::Timer),
            (6, RotationTrigger::Manual),
            (9, RotationTrigger::Timer),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_tick_is_noop_when_nothing_to_rotate_but_timer_survives() {
    let scheduler = scheduler(3, 4);
    scheduler.start();

    time::sleep(PERIOD * 2 + EPSILON).await;
    assert_eq!(scheduler.snapshot().index, 0);
    assert!(scheduler.is_running());

    // Content grows; the same timer picks it up without a restart
    scheduler.set_item_count(8);
    time::sleep(PERIOD).await;
    assert_eq!(scheduler.snapshot().index, 4);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_start_never_doubles_rate() {
    let scheduler = scheduler(50, 1);

    for _ in 0..10 {
        scheduler.start();
    }
    time::sleep(PERIOD * 4 + EPSILON).await;

    assert_eq!(scheduler.snapshot().index, 4);
}

#[tokio::test(start_paused = true)]
async fn test_restart_resets_cadence() {
    let scheduler = scheduler(10, 1);
    scheduler.start();

    time::sleep(PERIOD - Duration::from_millis(100)).await;
    scheduler.start();
    time::sleep(Duration::from_millis(200)).await;
    assert_eq!(scheduler.snapshot().index, 0);

    time::sleep(PERIOD).await;
    assert_eq!(scheduler.snapshot().index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_then_start() {
    let scheduler = scheduler(10, 2);
    scheduler.start();
    time::sleep(PERIOD + EPSILON).await;

    scheduler.stop();
    time::sleep(PERIOD * 3).await;
    assert_eq!(scheduler.snapshot().index, 2);
    assert!(!scheduler.snapshot().timer_active);

    scheduler.start();
    assert!(scheduler.snapshot().timer_active);
    time::sleep(PERIOD + EPSILON).await;
    assert_eq!(scheduler.snapshot().index, 4);
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_paused_prevents_resume() {
    let scheduler = scheduler(10, 2);
    scheduler.start();
    scheduler.pause();
    scheduler.stop();

    assert!(!scheduler.resume());
    time::sleep(PERIOD * 2).await;
    assert_eq!(scheduler.snapshot().index, 0);
}

#[tokio::test(start_paused = true)]
async fn test_from_config_autoplay() {
    let config = RotationConfig {
        interval_ms: 1000,
        ..RotationConfig::default()
    };
    let scheduler = RotationScheduler::from_config(6, 2, &config, EventBus::new(16));

    assert!(scheduler.is_running());
    assert_eq!(scheduler.interval(), Duration::from_millis(1000));
    time::sleep(Duration::from_millis(2010)).await;
    assert_eq!(scheduler.snapshot().index, 4);
}

#[tokio::test(start_paused = true)]
async fn test_from_config_without_autoplay() {
    let config = RotationConfig {
        autoplay: false,
        ..RotationConfig::default()
    };
    let scheduler = RotationScheduler::from_config(6, 2, &config, EventBus::new(16));

    assert!(!scheduler.is_running());
    time::sleep(config.interval() * 3).await;
    assert_eq!(scheduler.snapshot().index, 0);
}

#[tokio::test(start_paused = true)]
async fn test_two_instances_do_not_share_timers() {
    let first = scheduler(10, 1);
    let second = scheduler(10, 1);
    first.start();
    second.start();

    time::sleep(PERIOD + EPSILON).await;
    first.stop();
    time::sleep(PERIOD).await;

    assert_eq!(first.snapshot().index, 1);
    assert_eq!(second.snapshot().index, 2);
}

#[tokio::test(start_paused = true)]
async fn test_resize_emits_resize_trigger() {
    let scheduler = scheduler(8, 2);
    let mut rx = scheduler.subscribe();
    scheduler.jump_to(6);
    drain_events(&mut rx);

    scheduler.set_items_per_view(4);

    assert_eq!(
        triggers(&drain_events(&mut rx)),
        vec![(4, RotationTrigger::Resize)]
    );
}
