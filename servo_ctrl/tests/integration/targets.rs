//! Integration test: how target snapshots turn into duty writes.

use super::{fast_config, start_fleet, sweeps, wait_for};
use servo_common::actuator::ActuatorConfig;
use servo_ctrl::TargetCell;
use servo_ctrl::trajectory;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn written_duties_sum_to_planned_delta() {
    let config = fast_config(0);
    let expected = trajectory::plan(&config, 0.0, 73.3).unwrap();
    let (mut fleet, port) = start_fleet(vec![config], &[Some(TargetCell::new(73.3))]);
    wait_for("sweep", || sweeps(&fleet, 0) >= 1);
    fleet.stop();

    let history = port.history(0);
    assert_eq!(history.len(), expected.steps as usize);
    let last = *history.last().unwrap() as i64;
    assert_eq!(last - 819, expected.total_delta());
    // Every step moves by the same increment.
    let mut previous = 819i64;
    for duty in history {
        assert_eq!(duty as i64 - previous, expected.increment);
        previous = duty as i64;
    }
}

#[test]
fn dead_band_target_never_writes() {
    let (mut fleet, port) = start_fleet(vec![fast_config(0)], &[Some(TargetCell::new(0.4))]);
    thread::sleep(Duration::from_millis(30));
    fleet.stop();
    assert_eq!(port.commit_count(0), 0);
    assert_eq!(fleet.status(0).unwrap().angle, 0.0);
}

#[test]
fn out_of_range_targets_never_write() {
    let cell = TargetCell::new(180.5);
    let (mut fleet, port) = start_fleet(vec![fast_config(0)], &[Some(cell.clone())]);
    for target in [-5.0, f32::NAN, f32::INFINITY, 720.0] {
        cell.store(target);
        thread::sleep(Duration::from_millis(10));
    }
    fleet.stop();
    assert_eq!(port.commit_count(0), 0);
    assert_eq!(fleet.status(0).unwrap().sweeps, 0);
}

#[test]
fn reversed_actuator_mirrors_targets() {
    let normal = fast_config(0);
    let reversed = ActuatorConfig {
        reversed: true,
        ..fast_config(1)
    };
    let (mut fleet, port) = start_fleet(
        vec![normal, reversed],
        &[Some(TargetCell::new(150.0)), Some(TargetCell::new(30.0))],
    );
    wait_for("both sweeps", || sweeps(&fleet, 0) >= 1 && sweeps(&fleet, 1) >= 1);
    fleet.stop();

    assert_eq!(port.history(0), port.history(1));
    assert_eq!(fleet.status(0).unwrap().angle, 150.0);
    assert_eq!(fleet.status(1).unwrap().angle, 150.0);
}

#[test]
fn unbound_actuator_never_writes() {
    let (mut fleet, port) = start_fleet(
        vec![fast_config(0), fast_config(1)],
        &[None, Some(TargetCell::new(90.0))],
    );
    wait_for("bound sweep", || sweeps(&fleet, 1) >= 1);
    thread::sleep(Duration::from_millis(20));
    fleet.stop();

    assert_eq!(port.commit_count(0), 0);
    assert_eq!(port.committed_duty(0), Some(819));
    let status = fleet.status(0).unwrap();
    assert!(!status.bound);
    assert_eq!(status.target, 0.0);
}

#[test]
fn concurrent_writers_yield_whole_values() {
    let cell = TargetCell::new(0.0);
    let (mut fleet, _port) = start_fleet(vec![fast_config(0)], &[Some(cell.clone())]);

    let done = Arc::new(AtomicBool::new(false));
    let writers: Vec<_> = [30.0f32, 150.0]
        .into_iter()
        .map(|value| {
            let cell = cell.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    cell.store(value);
                }
            })
        })
        .collect();

    wait_for("a sweep", || sweeps(&fleet, 0) >= 1);
    done.store(true, Ordering::Relaxed);
    for writer in writers {
        writer.join().unwrap();
    }
    fleet.stop();

    let angle = fleet.status(0).unwrap().angle;
    assert!(angle == 30.0 || angle == 150.0, "torn or foreign angle {angle}");
}

#[test]
fn pwm_faults_are_counted_without_stopping() {
    let cell = TargetCell::new(0.0);
    let (mut fleet, port) = start_fleet(vec![fast_config(0)], &[Some(cell.clone())]);
    port.set_fault(0, true);
    cell.store(90.0);
    wait_for("faulted sweep", || sweeps(&fleet, 0) >= 1);

    port.set_fault(0, false);
    cell.store(0.0);
    wait_for("clean sweep", || sweeps(&fleet, 0) >= 2);
    fleet.stop();

    let status = fleet.status(0).unwrap();
    assert_eq!(status.pwm_errors, 5);
    assert_eq!(status.angle, 0.0);
    assert_eq!(port.commit_count(0), 5);
}
