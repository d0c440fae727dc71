//! Interpolated 3D camera control and the camera-side coordinate transforms.
//!
//! [`CameraControl`] owns two [`MotionBox`]es, one for the eye position and one
//! for the look-at target. Every operation computes a new destination from the
//! boxes' current destinations and re-targets through
//! [`MotionBox::update_to`], so overlapping inputs blend without jumps. The
//! interpolated pose only becomes observable in [`CameraControl::tick`].
//!
//! World space is right-handed with `z` up; the sea surface is the plane
//! `z = 0`. Heights are clamped to `[min_z, max_z]` at every re-target.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{DQuat, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, PerformanceClock};
use crate::consts::{
    EASE_DURATION_SECS, FOV_Y_DEG, MAX_ROTATION_SPEED, MAX_SPEED, MAX_Z, MIN_SPEED_FRACTION, MIN_Z, Z_STEP,
    ZOOM_DIVISOR,
};
use crate::input::{CameraOp, HeldKeys, Key, KeyBindings};
use crate::motion::MotionBox;

/// Zoom never carries the eye more than this share of the way to the target.
const MAX_ZOOM_IN_FRACTION: f64 = 0.9;

/// A single zoom-out step at most doubles the eye-to-target distance.
const MAX_ZOOM_OUT_FRACTION: f64 = -1.0;

/// Directions shorter than this are treated as degenerate.
const DIR_EPSILON: f64 = 1e-9;

/// Tunables for camera motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_z: f64,
    pub max_z: f64,
    /// Radians per rotation step.
    pub max_rotation_speed: f64,
    /// Ground distance per movement step at `max_z`.
    pub max_speed: f64,
    /// Lower bound on the height-scaled speed, as a share of `max_speed`.
    pub min_speed_fraction: f64,
    /// Height change per dolly step, before clamping.
    pub z_step: f64,
    /// Zoom deltas are divided by this to get the fraction of distance covered.
    pub zoom_divisor: f64,
    pub ease_duration_secs: f64,
    pub fov_y_deg: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_z: MIN_Z,
            max_z: MAX_Z,
            max_rotation_speed: MAX_ROTATION_SPEED,
            max_speed: MAX_SPEED,
            min_speed_fraction: MIN_SPEED_FRACTION,
            z_step: Z_STEP,
            zoom_divisor: ZOOM_DIVISOR,
            ease_duration_secs: EASE_DURATION_SECS,
            fov_y_deg: FOV_Y_DEG,
        }
    }
}

/// Orthonormal camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
}

/// Eye position and look-at target for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: DVec3,
    pub target: DVec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self { position: DVec3::new(0.0, 0.0, MIN_Z), target: DVec3::new(0.0, 1.0, 0.0) }
    }
}

impl CameraPose {
    #[must_use]
    pub fn new(position: DVec3, target: DVec3) -> Self {
        Self { position, target }
    }

    /// Unit look direction, or zero when position and target coincide.
    #[must_use]
    pub fn forward(&self) -> DVec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Look direction projected onto the sea plane, as a unit vector.
    ///
    /// `None` when looking straight up or down.
    #[must_use]
    pub fn horizontal_forward(&self) -> Option<DVec2> {
        let flat = (self.target - self.position).truncate();
        if flat.length() < DIR_EPSILON {
            return None;
        }
        Some(flat.normalize())
    }

    /// Angle of the horizontal look direction from world +x, in radians.
    ///
    /// A camera looking straight down keeps "north" (+y) as its heading.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.horizontal_forward().map_or(std::f64::consts::FRAC_PI_2, |h| h.y.atan2(h.x))
    }

    /// The camera's forward/right/up frame. `None` when position equals target.
    #[must_use]
    pub fn basis(&self) -> Option<Basis> {
        let forward = self.forward();
        if forward.length() < DIR_EPSILON {
            return None;
        }
        let side = forward.cross(DVec3::Z);
        let right = if side.length() < DIR_EPSILON {
            let h = self.heading();
            DVec3::new(h.sin(), -h.cos(), 0.0)
        } else {
            side.normalize()
        };
        let up = right.cross(forward).normalize();
        Some(Basis { forward, right, up })
    }

    /// Where the look ray meets the sea plane, if it points below the horizon.
    #[must_use]
    pub fn ground_focus(&self) -> Option<DVec2> {
        intersect_ground(self.position, self.target - self.position)
    }

    /// Cast a perspective ray through a scene pixel and intersect it with the sea plane.
    ///
    /// `screen` and `viewport` are CSS pixels with the origin at the top-left.
    #[must_use]
    pub fn screen_to_ground(&self, screen: DVec2, viewport: DVec2, fov_y_deg: f64) -> Option<DVec2> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let basis = self.basis()?;
        let aspect = viewport.x / viewport.y;
        let ndc_x = 2.0 * screen.x / viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / viewport.y;
        let tan_half = (fov_y_deg.to_radians() * 0.5).tan();
        let dir = basis.forward + basis.right * (ndc_x * tan_half * aspect) + basis.up * (ndc_y * tan_half);
        intersect_ground(self.position, dir)
    }
}

fn intersect_ground(origin: DVec3, dir: DVec3) -> Option<DVec2> {
    if dir.z > -DIR_EPSILON {
        return None;
    }
    let t = -origin.z / dir.z;
    if t < 0.0 {
        return None;
    }
    Some((origin + dir * t).truncate())
}

/// Smoothed camera driven by discrete inputs and polled held keys.
pub struct CameraControl<C: Clock = PerformanceClock> {
    config: CameraConfig,
    clock: C,
    position: MotionBox,
    target: MotionBox,
    held: HeldKeys,
    bindings: KeyBindings,
    pose: CameraPose,
}

impl<C: Clock> CameraControl<C> {
    #[must_use]
    pub fn new(config: CameraConfig, clock: C) -> Self {
        let mut camera = Self {
            config,
            clock,
            position: MotionBox::new().duration(config.ease_duration_secs),
            target: MotionBox::new().duration(config.ease_duration_secs),
            held: HeldKeys::default(),
            bindings: KeyBindings::default(),
            pose: CameraPose::default(),
        };
        let start = CameraPose::default();
        camera.set_pose(start.position, start.target);
        camera
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Place the camera without animation.
    pub fn set_pose(&mut self, position: DVec3, target: DVec3) {
        let now = self.clock.now_secs();
        let clamped = position.with_z(position.z.clamp(self.config.min_z, self.config.max_z));
        let target = target + (clamped - position);
        self.position.update_to(clamped, now);
        self.target.update_to(target, now);
        self.complete();
        self.pose = CameraPose::new(clamped, target);
    }

    /// Finish any in-flight transition on both boxes.
    pub fn complete(&mut self) {
        let now = self.clock.now_secs();
        self.position.complete(now);
        self.target.complete(now);
    }

    /// The pose sampled by the last [`CameraControl::tick`] (or placement).
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// The pose the camera is easing toward.
    #[must_use]
    pub fn destination(&self) -> CameraPose {
        CameraPose::new(self.position.target(), self.target.target())
    }

    /// Whether both boxes have settled at the current time.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        let now = self.clock.now_secs();
        self.position.is_settled(now) && self.target.is_settled(now)
    }

    // --- Operations ---

    /// Move eye and target by the same ground-plane delta.
    pub fn displace_camera(&mut self, delta: DVec2) {
        if !delta.is_finite() {
            return;
        }
        let shift = delta.extend(0.0);
        self.retarget(self.position.target() + shift, self.target.target() + shift);
    }

    /// Move the eye toward (`delta > 0`) or away from the target by `delta / zoom_divisor`
    /// of the current distance. The target stays put.
    pub fn zoom(&mut self, delta: f64) {
        if !delta.is_finite() || self.config.zoom_divisor == 0.0 {
            return;
        }
        let pos = self.position.target();
        let axis = self.target.target() - pos;
        let mut fraction = (delta / self.config.zoom_divisor).clamp(MAX_ZOOM_OUT_FRACTION, MAX_ZOOM_IN_FRACTION);
        if axis.z.abs() > DIR_EPSILON {
            let a = (self.config.min_z - pos.z) / axis.z;
            let b = (self.config.max_z - pos.z) / axis.z;
            fraction = fraction.max(a.min(b)).min(a.max(b));
        }
        let next = pos + axis * fraction;
        self.position.update_to(next, self.clock.now_secs());
    }

    /// Raise or lower eye and target together by `sign * z_step`.
    ///
    /// The delta is clamped before it is applied so the eye stays inside
    /// `[min_z, max_z]` and the eye-to-target offset is preserved exactly.
    pub fn move_camera_on_z(&mut self, sign: f64) {
        if !sign.is_finite() {
            return;
        }
        let pos = self.position.target();
        let lo = self.config.min_z - pos.z;
        let hi = self.config.max_z - pos.z;
        let delta = (sign * self.config.z_step).max(lo.min(0.0)).min(hi.max(0.0));
        let shift = DVec3::new(0.0, 0.0, delta);
        self.retarget(pos + shift, self.target.target() + shift);
    }

    /// Orbit the target around the eye about world vertical by one rotation step.
    pub fn rotate_around_z(&mut self, sign: f64) {
        if !sign.is_finite() {
            return;
        }
        let pos = self.position.target();
        let offset = self.target.target() - pos;
        let turn = DQuat::from_axis_angle(DVec3::Z, sign * self.config.max_rotation_speed);
        self.target.update_to(pos + turn * offset, self.clock.now_secs());
    }

    /// Tilt the look direction about the camera's side axis by one rotation step.
    ///
    /// Positive `sign` tilts upward. A tilt that would carry the look direction
    /// over the vertical is refused.
    pub fn rotate_around_plane(&mut self, sign: f64) {
        if !sign.is_finite() {
            return;
        }
        let pos = self.position.target();
        let offset = self.target.target() - pos;
        let Some(flat) = CameraPose::new(pos, pos + offset).horizontal_forward() else {
            return;
        };
        let side = flat.extend(0.0).cross(DVec3::Z).normalize();
        let tilt = DQuat::from_axis_angle(side, sign * self.config.max_rotation_speed);
        let next = tilt * offset;
        if next.truncate().dot(flat) <= DIR_EPSILON * offset.length() {
            log::debug!("pitch refused: look direction would pass the vertical");
            return;
        }
        self.target.update_to(pos + next, self.clock.now_secs());
    }

    /// Move along the horizontal look direction at height-scaled speed.
    pub fn move_forward(&mut self, sign: f64) {
        let Some(flat) = self.destination().horizontal_forward() else {
            return;
        };
        self.displace_camera(flat * (self.speed() * sign));
    }

    /// Strafe along the horizontal right vector at height-scaled speed.
    pub fn move_sideways(&mut self, sign: f64) {
        let Some(flat) = self.destination().horizontal_forward() else {
            return;
        };
        let right = DVec2::new(flat.y, -flat.x);
        self.displace_camera(right * (self.speed() * sign));
    }

    /// Re-center so the look ray lands on `world` (the minimap click target).
    ///
    /// When the camera looks at or above the horizon the eye itself is moved over `world`.
    pub fn center_on(&mut self, world: DVec2) {
        let dest = self.destination();
        let anchor = dest.ground_focus().unwrap_or_else(|| dest.position.truncate());
        log::debug!("camera re-centering on ({:.1}, {:.1})", world.x, world.y);
        self.displace_camera(world - anchor);
    }

    /// Ground speed for one movement step at the current destination height.
    #[must_use]
    pub fn speed(&self) -> f64 {
        let height = self.position.target().z / self.config.max_z;
        self.config.max_speed * height.max(self.config.min_speed_fraction)
    }

    // --- Held keys ---

    /// Record a key press. Returns `true` if the key drives a camera operation.
    pub fn key_down(&mut self, key: &Key) -> bool {
        self.held.press(key);
        self.bindings.op_for(key).is_some()
    }

    /// Record a key release.
    pub fn key_up(&mut self, key: &Key) {
        self.held.release(key);
    }

    /// Release every held key.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    #[must_use]
    pub fn held_keys(&self) -> &HeldKeys {
        &self.held
    }

    /// Apply one step of every operation bound to a held key.
    pub fn apply_held_keys(&mut self) {
        for op in self.held.active_ops(&self.bindings) {
            self.apply_op(op);
        }
    }

    fn apply_op(&mut self, op: CameraOp) {
        let speed = self.speed();
        match op {
            CameraOp::Forward => self.move_forward(1.0),
            CameraOp::Back => self.move_forward(-1.0),
            CameraOp::StrafeRight => self.move_sideways(1.0),
            CameraOp::StrafeLeft => self.move_sideways(-1.0),
            CameraOp::YawLeft => self.rotate_around_z(1.0),
            CameraOp::YawRight => self.rotate_around_z(-1.0),
            CameraOp::PitchUp => self.rotate_around_plane(1.0),
            CameraOp::PitchDown => self.rotate_around_plane(-1.0),
            CameraOp::Rise => self.move_camera_on_z(1.0),
            CameraOp::Sink => self.move_camera_on_z(-1.0),
            CameraOp::PanNorth => self.displace_camera(DVec2::new(0.0, speed)),
            CameraOp::PanSouth => self.displace_camera(DVec2::new(0.0, -speed)),
            CameraOp::PanEast => self.displace_camera(DVec2::new(speed, 0.0)),
            CameraOp::PanWest => self.displace_camera(DVec2::new(-speed, 0.0)),
        }
    }

    // --- Frame ---

    /// Poll held keys, then sample both boxes. The result is what the scene should render.
    pub fn tick(&mut self) -> CameraPose {
        self.apply_held_keys();
        let now = self.clock.now_secs();
        self.pose = CameraPose::new(self.position.evolve(now), self.target.evolve(now));
        self.pose
    }

    fn retarget(&mut self, position: DVec3, target: DVec3) {
        let now = self.clock.now_secs();
        self.position.update_to(position, now);
        self.target.update_to(target, now);
    }
}
