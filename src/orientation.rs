//! Orientation of the whole tree
//!
//! The controller keeps one running yaw/pitch pair. A tracked hand pulls it
//! towards the hand's position; without a hand the tree spins slowly and its
//! tilt relaxes. Both paths mutate the same values, so gaining or losing the
//! hand never makes the tree jump. Mouse-drag orbiting moves the camera
//! instead and is only accepted while no hand is tracked.

use std::f32::consts::PI;

use glam::{EulerRot, Quat};

use crate::config::SceneConfig;
use crate::hand::HandSignal;
use crate::math::lerp;

/// Camera orbit driven by mouse drag
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitControls {
    /// Rotation around the vertical axis
    pub azimuth: f32,
    /// Angle from the vertical axis, kept strictly inside `(0, π)`
    pub polar: f32,
    /// Drag input is ignored while disabled
    pub enabled: bool,
    sensitivity: f32,
}

impl OrbitControls {
    const POLAR_MARGIN: f32 = 0.01;

    pub fn new(sensitivity: f32) -> Self {
        OrbitControls {
            azimuth: 0.0,
            polar: PI / 2.0,
            enabled: true,
            sensitivity,
        }
    }

    /// Applies a drag of `(dx, dy)` cells; returns whether it was accepted
    pub fn drag(&mut self, dx: f32, dy: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.azimuth -= dx * self.sensitivity;
        self.polar = (self.polar - dy * self.sensitivity)
            .clamp(Self::POLAR_MARGIN, PI - Self::POLAR_MARGIN);
        true
    }

    /// Camera-side rotation applied on top of the tree's own rotation
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.azimuth, PI / 2.0 - self.polar, 0.0)
    }

    pub fn reset(&mut self) {
        self.azimuth = 0.0;
        self.polar = PI / 2.0;
    }
}

/// Resolves the tree's rotation each frame from the hand signal or idle spin
pub struct OrientationController {
    /// Rotation around the vertical axis
    yaw: f32,
    /// Tilt around the horizontal axis
    pitch: f32,
    orbit: OrbitControls,
    idle_spin: f32,
    follow_rate: f32,
    max_pitch: f32,
    relax_rate: f32,
}

impl OrientationController {
    pub fn new(config: &SceneConfig) -> Self {
        OrientationController {
            yaw: 0.0,
            pitch: 0.0,
            orbit: OrbitControls::new(config.drag_sensitivity),
            idle_spin: config.idle_spin,
            follow_rate: config.hand_follow_rate,
            max_pitch: config.max_pitch,
            relax_rate: config.pitch_relax_rate,
        }
    }

    /// Records whether a hand is tracked without advancing the rotation
    pub fn observe(&mut self, hand: Option<HandSignal>) {
        self.orbit.enabled = hand.is_none();
    }

    /// Advances the rotation by one frame
    pub fn update(&mut self, hand: Option<HandSignal>, dt: f32) {
        self.observe(hand);

        match hand {
            Some(signal) => {
                let signal = signal.clamped();
                let target_yaw = signal.x * PI;
                let target_pitch = signal.y * self.max_pitch;
                let step = (dt * self.follow_rate).min(1.0);
                self.yaw = lerp(self.yaw, target_yaw, step);
                self.pitch = lerp(self.pitch, target_pitch, step);
            }
            None => {
                self.yaw += dt * self.idle_spin;
                self.pitch = lerp(self.pitch, 0.0, (dt * self.relax_rate).min(1.0));
            }
        }
    }

    /// Forwards a mouse drag to the orbit controls
    pub fn drag(&mut self, dx: f32, dy: f32) -> bool {
        self.orbit.drag(dx, dy)
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    /// Rotation applied to the composed tree
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    /// Full view rotation: camera orbit on top of the tree rotation
    pub fn view(&self) -> Quat {
        self.orbit.rotation().inverse() * self.rotation()
    }

    /// Returns the tree and camera to their starting orientation
    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.orbit.reset();
    }
}
