//! Integration test: start, stop, resume and drop.

use super::{fast_config, start_fleet, sweeps, wait_for};
use servo_ctrl::TargetCell;
use std::thread;
use std::time::Duration;

// ── Stop / resume ───────────────────────────────────────────────────

#[test]
fn stop_resume_preserves_position() {
    let cell = TargetCell::new(90.0);
    let (mut fleet, port) = start_fleet(vec![fast_config(0)], &[Some(cell.clone())]);
    wait_for("first sweep", || sweeps(&fleet, 0) >= 1);

    fleet.stop();
    // 3276 * 90 / 180 = 1638, / 5 steps = 327
    let status = fleet.status(0).unwrap();
    assert_eq!(status.angle, 90.0);
    assert_eq!(status.duty, 819 + 5 * 327);
    assert!(status.canceled);
    assert_eq!(port.commit_count(0), 5);

    fleet.resume().unwrap();
    assert!(!fleet.status(0).unwrap().canceled);
    thread::sleep(Duration::from_millis(30));
    // Same target after resume: dead-band, nothing written.
    assert_eq!(port.commit_count(0), 5);
    assert_eq!(fleet.status(0).unwrap().angle, 90.0);

    cell.store(0.0);
    wait_for("return sweep", || sweeps(&fleet, 0) >= 2);
    fleet.stop();
    let status = fleet.status(0).unwrap();
    assert_eq!(status.angle, 0.0);
    // -1638 / 5 = -327, back to the initial duty
    assert_eq!(status.duty, 819);
    assert_eq!(port.commit_count(0), 10);
}

#[test]
fn targets_written_while_stopped_apply_after_resume() {
    let cell = TargetCell::new(0.0);
    let (mut fleet, port) = start_fleet(vec![fast_config(0)], &[Some(cell.clone())]);
    fleet.stop();

    cell.store(180.0);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(port.commit_count(0), 0);
    assert_eq!(fleet.status(0).unwrap().angle, 0.0);

    fleet.resume().unwrap();
    wait_for("sweep to 180", || sweeps(&fleet, 0) >= 1);
    fleet.stop();
    assert_eq!(fleet.status(0).unwrap().angle, 180.0);
    assert_eq!(port.committed_duty(0), Some(819 + 5 * 655));
}

#[test]
fn repeated_cycles_keep_every_actuator() {
    let cells: Vec<_> = (0..4).map(|_| Some(TargetCell::new(45.0))).collect();
    let configs = (0..4).map(fast_config).collect();
    let (mut fleet, _port) = start_fleet(configs, &cells);

    for _ in 0..5 {
        fleet.stop();
        assert_eq!(fleet.running_count(), 0);
        fleet.resume().unwrap();
        assert_eq!(fleet.running_count(), 4);
    }

    wait_for("all sweeps", || (0..4).all(|i| sweeps(&fleet, i) >= 1));
    fleet.stop();
    assert!(fleet.statuses().iter().all(|s| s.angle == 45.0));
}

// ── Rebinding ───────────────────────────────────────────────────────

#[test]
fn rebinding_while_stopped() {
    let first = TargetCell::new(30.0);
    let (mut fleet, _port) = start_fleet(vec![fast_config(0)], &[Some(first.clone())]);
    wait_for("first sweep", || sweeps(&fleet, 0) >= 1);
    fleet.stop();
    assert_eq!(fleet.status(0).unwrap().angle, 30.0);

    let second = TargetCell::new(120.0);
    let actuator = fleet.actuator_mut(0).unwrap();
    actuator.set_target(second.clone());
    assert!(matches!(actuator.target(), servo_ctrl::TargetBinding::Bound(c) if c.same_cell(&second)));

    fleet.resume().unwrap();
    wait_for("sweep to new target", || sweeps(&fleet, 0) >= 2);
    fleet.stop();
    assert_eq!(fleet.status(0).unwrap().angle, 120.0);

    // Old cell no longer drives the actuator.
    first.store(10.0);
    fleet.actuator_mut(0).unwrap().unset_target();
    fleet.resume().unwrap();
    thread::sleep(Duration::from_millis(30));
    fleet.stop();
    let status = fleet.status(0).unwrap();
    assert_eq!(status.angle, 120.0);
    assert!(!status.bound);
}

// ── Drop ────────────────────────────────────────────────────────────

#[test]
fn dropping_binding_stops_workers() {
    let cells: Vec<_> = (0..3).map(|_| Some(TargetCell::new(60.0))).collect();
    let configs = (0..3).map(fast_config).collect();
    let (fleet, port) = start_fleet(configs, &cells);
    let monitors = fleet.monitors();
    assert_eq!(monitors.len(), 3);

    drop(fleet);
    assert!(monitors.iter().all(|m| m.status().canceled));

    let commits = port.total_commits();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(port.total_commits(), commits);
}
