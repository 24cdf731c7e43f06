//! The star sitting on top of the tree
//!
//! [`TopperGeometry`] is the immutable extruded star outline, built once with
//! the layout. [`TopperAnimator`] floats, spins and pulses the star each frame.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::config::{SceneConfig, StarConfig};
use crate::error::{Error, Result};
use crate::math::{lerp, Rgb};
use crate::state::Mode;

/// Base color of the star
pub const TOPPER_COLOR: Rgb = Rgb::from_hex(0xFFD700);

/// Bevel profile applied to the extruded outline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bevel {
    pub thickness: f32,
    pub size: f32,
    pub segments: usize,
}

/// One closed outline of the extruded solid at a fixed depth
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    pub z: f32,
    pub points: Vec<Vec3>,
}

/// Extruded star outline
#[derive(Clone, Debug, PartialEq)]
pub struct TopperGeometry {
    /// 2D outline, alternating outer and inner vertices; the loop closes from last to first
    pub outline: Vec<Vec2>,
    /// Extrusion depth
    pub depth: f32,
    pub bevel: Bevel,
}

impl TopperGeometry {
    /// Builds the star outline from its configuration
    pub fn star(config: &StarConfig) -> Result<Self> {
        if config.points < 2 {
            return Err(Error::InvalidArgument(format!(
                "star needs at least 2 points, got {}",
                config.points
            )));
        }
        if !(config.inner_radius > 0.0 && config.outer_radius > config.inner_radius) {
            return Err(Error::InvalidArgument(format!(
                "star radii must satisfy 0 < inner < outer, got inner {} outer {}",
                config.inner_radius, config.outer_radius
            )));
        }
        if config.depth < 0.0 || config.bevel_thickness < 0.0 || config.bevel_size < 0.0 {
            return Err(Error::InvalidArgument(
                "star depth and bevel must not be negative".to_string(),
            ));
        }

        let vertices = config.points * 2;
        let outline = (0..vertices)
            .map(|i| {
                let angle = i as f32 * PI / config.points as f32;
                let radius = if i % 2 == 0 {
                    config.outer_radius
                } else {
                    config.inner_radius
                };
                Vec2::new(angle.cos() * radius, angle.sin() * radius)
            })
            .collect();

        Ok(TopperGeometry {
            outline,
            depth: config.depth,
            bevel: Bevel {
                thickness: config.bevel_thickness,
                size: config.bevel_size,
                segments: config.bevel_segments,
            },
        })
    }

    /// Number of star points
    pub fn points(&self) -> usize {
        self.outline.len() / 2
    }

    /// Outline grown outward by `amount` along each vertex's direction from the center
    fn grown_outline(&self, amount: f32) -> Vec<Vec2> {
        self.outline
            .iter()
            .map(|&p| p + p.normalize_or_zero() * amount)
            .collect()
    }

    /// Ring layers of the extruded solid from back to front, before centering
    fn raw_rings(&self) -> Vec<Ring> {
        let segments = self.bevel.segments.max(1);
        let layer = |z: f32, grow: f32| Ring {
            z,
            points: self
                .grown_outline(grow)
                .into_iter()
                .map(|p| p.extend(z))
                .collect(),
        };

        let mut rings = Vec::new();
        // Back bevel: from the bare outline at -thickness to the full bevel at 0
        if self.bevel.segments > 0 {
            for s in 0..segments {
                let theta = s as f32 / segments as f32 * FRAC_PI_2;
                rings.push(layer(
                    -self.bevel.thickness * theta.cos(),
                    self.bevel.size * theta.sin(),
                ));
            }
        }
        let body = if self.bevel.segments > 0 {
            self.bevel.size
        } else {
            0.0
        };
        rings.push(layer(0.0, body));
        rings.push(layer(self.depth, body));
        // Front bevel mirrors the back one
        if self.bevel.segments > 0 {
            for s in (0..segments).rev() {
                let theta = s as f32 / segments as f32 * FRAC_PI_2;
                rings.push(layer(
                    self.depth + self.bevel.thickness * theta.cos(),
                    self.bevel.size * theta.sin(),
                ));
            }
        }
        rings
    }

    /// Axis-aligned bounds of the extruded solid as `(min, max)`
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for ring in self.raw_rings() {
            for p in ring.points {
                min = min.min(p);
                max = max.max(p);
            }
        }
        (min, max)
    }

    /// Ring layers of the extruded solid, centered on its bounding box
    pub fn rings(&self) -> Vec<Ring> {
        let (min, max) = self.bounding_box();
        let center = (min + max) * 0.5;
        self.raw_rings()
            .into_iter()
            .map(|ring| Ring {
                z: ring.z - center.z,
                points: ring.points.into_iter().map(|p| p - center).collect(),
            })
            .collect()
    }
}

/// Float, spin and pulse state of the topper
pub struct TopperAnimator {
    geometry: TopperGeometry,
    /// Current height
    y: f32,
    /// Accumulated spin around the vertical axis
    spin: f32,
    /// Current uniform scale
    scale: f32,
    /// Time since the animator was created
    elapsed: f32,
    assembled_y: f32,
    dispersed_y: f32,
    speed: f32,
    spin_rate: f32,
}

impl TopperAnimator {
    pub fn new(geometry: TopperGeometry, config: &SceneConfig) -> Self {
        TopperAnimator {
            geometry,
            y: config.topper_assembled_y,
            spin: 0.0,
            scale: 1.0,
            elapsed: 0.0,
            assembled_y: config.topper_assembled_y,
            dispersed_y: config.topper_dispersed_y,
            speed: config.topper_speed,
            spin_rate: config.topper_spin,
        }
    }

    /// Advances the topper by one frame.
    ///
    /// The interpolation fraction is `dt * speed` with no upper cap.
    pub fn advance(&mut self, mode: Mode, dt: f32) {
        self.elapsed += dt;
        let step = dt * self.speed;

        self.spin += dt * self.spin_rate;

        let target_y = match mode {
            Mode::Assembled => self.assembled_y,
            Mode::Dispersed => self.dispersed_y,
        };
        self.y = lerp(self.y, target_y, step);

        let target_scale = match mode {
            Mode::Assembled => 1.0 + (self.elapsed * 3.0).sin() * 0.1,
            Mode::Dispersed => 0.1,
        };
        self.scale = lerp(self.scale, target_scale, step);
    }

    pub fn geometry(&self) -> &TopperGeometry {
        &self.geometry
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, self.y, 0.0)
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Model transform of the star
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.spin),
            self.position(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> TopperAnimator {
        let config = SceneConfig::default();
        let geometry = TopperGeometry::star(&config.star).unwrap();
        TopperAnimator::new(geometry, &config)
    }

    #[test]
    fn test_star_outline_alternates_radii() {
        let star = TopperGeometry::star(&StarConfig::default()).unwrap();
        assert_eq!(star.outline.len(), 10);
        assert_eq!(star.points(), 5);
        for (i, p) in star.outline.iter().enumerate() {
            let expected = if i % 2 == 0 { 1.2 } else { 0.5 };
            assert!((p.length() - expected).abs() < 1e-5);
        }
        // First vertex is an outer tip on the +X axis
        assert!((star.outline[0] - Vec2::new(1.2, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_star_rejects_bad_parameters() {
        let too_few = StarConfig {
            points: 1,
            ..StarConfig::default()
        };
        assert!(TopperGeometry::star(&too_few).is_err());

        let inverted = StarConfig {
            inner_radius: 2.0,
            ..StarConfig::default()
        };
        assert!(TopperGeometry::star(&inverted).is_err());
    }

    #[test]
    fn test_rings_are_centered() {
        let star = TopperGeometry::star(&StarConfig::default()).unwrap();
        let rings = star.rings();
        // Two bevel layers each side plus the two body outlines
        assert_eq!(rings.len(), 6);

        let first = rings.first().unwrap().z;
        let last = rings.last().unwrap().z;
        assert!((first + last).abs() < 1e-5);
        assert!((last - first - 0.6).abs() < 1e-5);
        for pair in rings.windows(2) {
            assert!(pair[0].z <= pair[1].z);
        }
    }

    #[test]
    fn test_floats_up_when_dispersed() {
        let mut topper = animator();
        for _ in 0..600 {
            topper.advance(Mode::Dispersed, 1.0 / 60.0);
        }
        assert!((topper.position().y - 25.0).abs() < 1e-2);
        assert!((topper.scale() - 0.1).abs() < 1e-2);
    }

    #[test]
    fn test_returns_and_pulses_when_assembled() {
        let mut topper = animator();
        for _ in 0..300 {
            topper.advance(Mode::Dispersed, 1.0 / 60.0);
        }
        for _ in 0..900 {
            topper.advance(Mode::Assembled, 1.0 / 60.0);
            assert!(topper.scale() <= 1.1 + 1e-4);
        }
        assert!((topper.position().y - 9.5).abs() < 1e-2);
        assert!(topper.scale() > 0.85);
    }

    #[test]
    fn test_spins_in_both_modes() {
        let mut topper = animator();
        topper.advance(Mode::Assembled, 0.5);
        topper.advance(Mode::Dispersed, 0.5);
        assert!((topper.spin() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_is_not_capped() {
        let mut topper = animator();
        // dt * speed = 0.5: half the distance in a single frame
        topper.advance(Mode::Dispersed, 0.25);
        assert!((topper.position().y - (9.5 + (25.0 - 9.5) * 0.5)).abs() < 1e-4);
    }
}
