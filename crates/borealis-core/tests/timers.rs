//! Timer bindings: creation, firing and cancellation.

mod common;

use std::time::{Duration, Instant};

use borealis_core::{AttrValue, Bindings, Widget, mount, unmount};
use common::{Log, Probe, hit};

#[test]
fn test_every_timer_binding_creates_a_timer() {
    let log = Log::default();
    let probe = Probe::new(
        "timers",
        &log,
        Bindings::new()
            .every(100, hit)
            .every(250, hit)
            .once(50, hit)
            .once(60, hit)
            .once(70, hit),
    );

    let core = probe.core();
    let ids = core.timer_ids();
    assert_eq!(ids.len(), 5);
    assert_eq!(core.live_timer_count(), 5);

    for id in &ids {
        assert!(core.context().fire_timer(*id));
    }
    assert_eq!(probe.hits(), 5);

    // Intervals keep running, oneshots are gone.
    assert!(ids[..2].iter().all(|id| core.context().is_timer_active(*id)));
    assert!(ids[2..].iter().all(|id| !core.context().is_timer_active(*id)));
    assert_eq!(core.live_timer_count(), 2);
}

#[test]
fn test_interval_fires_repeatedly() {
    let log = Log::default();
    let probe = Probe::new("interval", &log, Bindings::new().declare("interval_100", AttrValue::callback(hit)));
    let core = probe.core();
    let id = core.timer_ids()[0];

    for _ in 0..3 {
        assert!(core.context().fire_timer(id));
    }
    assert_eq!(probe.hits(), 3);
    assert!(core.context().is_timer_active(id));
}

#[test]
fn test_oneshot_fires_once() {
    let log = Log::default();
    let probe = Probe::new("oneshot", &log, Bindings::new().declare("oneshot_50", AttrValue::callback(hit)));
    let core = probe.core();
    let id = core.timer_ids()[0];

    assert!(core.context().fire_timer(id));
    assert!(!core.context().fire_timer(id));
    assert_eq!(probe.hits(), 1);
}

#[test]
fn test_due_timers_fire_from_the_loop() {
    let log = Log::default();
    let probe = Probe::new("loop", &log, Bindings::new().every(10, hit).once(10, hit));
    let context = probe.core().context().clone();

    let fired = context.dispatch_timers(Instant::now() + Duration::from_millis(20));
    assert_eq!(fired, 2);
    assert_eq!(probe.hits(), 2);
    assert_eq!(probe.core().live_timer_count(), 1);
}

#[test]
fn test_unmount_cancels_timers() {
    let log = Log::default();
    let probe = Probe::new("unmount", &log, Bindings::new().every(100, hit).once(100, hit));
    let widget: std::sync::Arc<dyn Widget> = probe.clone();

    mount(&widget);
    assert_eq!(probe.core().live_timer_count(), 2);

    unmount(&widget);
    assert_eq!(probe.core().live_timer_count(), 0);
    assert!(probe.core().timer_ids().is_empty());

    // Timers are not restarted by a remount.
    mount(&widget);
    assert!(probe.core().timer_ids().is_empty());
}

#[test]
fn test_dropping_a_widget_removes_its_timers() {
    let log = Log::default();
    let probe = Probe::new("dropped", &log, Bindings::new().every(100, hit).every(200, hit));
    let context = probe.core().context().clone();
    let ids = probe.core().timer_ids();

    drop(probe);
    assert!(ids.iter().all(|id| !context.is_timer_active(*id)));
}

#[test]
fn test_failing_timer_keeps_running() {
    let log = Log::default();
    let probe = Probe::new(
        "failing",
        &log,
        Bindings::new().every(100, |probe: &Probe, args| {
            hit(probe, args);
            Err::<(), _>("refresh failed")
        }),
    );
    let core = probe.core();
    let id = core.timer_ids()[0];

    assert!(core.context().fire_timer(id));
    assert!(core.context().fire_timer(id));
    assert_eq!(probe.hits(), 2);
}
