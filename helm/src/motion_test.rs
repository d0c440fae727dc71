#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn vec_approx_eq(a: DVec3, b: DVec3, tol: f64) -> bool {
    (a - b).length() < tol
}

// --- ease ---

#[test]
fn ease_endpoints() {
    assert!(approx_eq(ease(0.0), 0.0));
    assert!(approx_eq(ease(1.0), 1.0));
}

#[test]
fn ease_clamps_input() {
    assert!(approx_eq(ease(-3.0), 0.0));
    assert!(approx_eq(ease(7.0), 1.0));
}

#[test]
fn ease_is_ahead_of_linear() {
    for t in [0.1, 0.25, 0.5, 0.75, 0.9] {
        assert!(ease(t) > t, "ease({t}) should lead linear");
    }
}

#[test]
fn ease_is_monotonic() {
    let mut prev = ease(0.0);
    for i in 1..=100 {
        let next = ease(f64::from(i) / 100.0);
        assert!(next >= prev);
        prev = next;
    }
}

// --- duration ---

#[test]
fn zero_duration_is_instant() {
    let mut mb = MotionBox::new();
    mb.update_to(DVec3::new(5.0, 0.0, 0.0), 10.0);
    assert_eq!(mb.evolve(10.0), DVec3::new(5.0, 0.0, 0.0));
}

#[test]
fn negative_duration_is_treated_as_zero() {
    let mb = MotionBox::new().duration(-2.0);
    assert!(approx_eq(mb.progress(0.0), 1.0));
}

// --- update_to / evolve ---

#[test]
fn eased_transition_scenario() {
    let mut mb = MotionBox::new().duration(1.0);
    mb.complete(0.0);
    mb.update_to(DVec3::new(10.0, 0.0, 0.0), 0.0);

    assert!(vec_approx_eq(mb.evolve(0.0), DVec3::ZERO, 1e-9));

    let half = mb.evolve(0.5);
    assert!((half.x - 10.0 * (0.25 * std::f64::consts::PI).sin()).abs() < 1e-9);
    assert!((half.x - 7.07).abs() < 0.01);

    assert_eq!(mb.evolve(1.0), DVec3::new(10.0, 0.0, 0.0));
    assert_eq!(mb.evolve(5.0), DVec3::new(10.0, 0.0, 0.0));
}

#[test]
fn evolve_is_pure() {
    let mut mb = MotionBox::new().duration(2.0);
    mb.update_to(DVec3::new(0.0, 8.0, 0.0), 1.0);
    let a = mb.evolve(1.7);
    let b = mb.evolve(1.7);
    assert_eq!(a, b);
    assert_eq!(mb.origin(), DVec3::ZERO);
}

#[test]
fn retarget_mid_flight_has_no_jump() {
    let mut mb = MotionBox::new().duration(1.0);
    mb.update_to(DVec3::new(10.0, 0.0, 0.0), 0.0);
    let before = mb.evolve(0.4);
    mb.update_to(DVec3::new(-10.0, 5.0, 0.0), 0.4);
    let after = mb.evolve(0.4);
    assert!(vec_approx_eq(before, after, 1e-12));
    assert_eq!(mb.origin(), before);
}

#[test]
fn retarget_then_wait_reaches_new_target_exactly() {
    let mut mb = MotionBox::new().duration(0.3);
    mb.update_to(DVec3::new(1.0, 2.0, 3.0), 0.0);
    mb.update_to(DVec3::new(4.0, 5.0, 6.0), 0.1);
    assert_eq!(mb.evolve(0.4), DVec3::new(4.0, 5.0, 6.0));
}

#[test]
fn small_step_after_retarget_is_small() {
    let mut mb = MotionBox::new().duration(1.0);
    mb.update_to(DVec3::new(100.0, 0.0, 0.0), 0.0);
    let at = mb.evolve(0.001);
    assert!(at.x < 1.0);
}

// --- complete ---

#[test]
fn complete_snaps_to_target() {
    let mut mb = MotionBox::new().duration(5.0);
    mb.update_to(DVec3::new(3.0, 3.0, 3.0), 0.0);
    mb.complete(0.1);
    assert_eq!(mb.evolve(0.1), DVec3::new(3.0, 3.0, 3.0));
    assert!(mb.is_settled(0.1));
}

#[test]
fn complete_then_update_starts_from_target() {
    let mut mb = MotionBox::new().duration(1.0);
    mb.update_to(DVec3::new(2.0, 0.0, 0.0), 0.0);
    mb.complete(0.0);
    mb.update_to(DVec3::new(4.0, 0.0, 0.0), 0.0);
    assert_eq!(mb.origin(), DVec3::new(2.0, 0.0, 0.0));
}

#[test]
fn is_settled_tracks_progress() {
    let mut mb = MotionBox::new().duration(1.0);
    mb.update_to(DVec3::new(1.0, 0.0, 0.0), 0.0);
    assert!(!mb.is_settled(0.5));
    assert!(mb.is_settled(1.0));
}
