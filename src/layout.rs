//! Procedural tree layout
//!
//! Places every particle on a golden-angle spiral wrapped around a cone, with
//! a decaying sinusoidal ripple that reads as stacked branch layers. Each
//! particle also gets a random position inside a cube for the dispersed
//! configuration.

use std::f64::consts::PI;

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

use crate::config::SceneConfig;
use crate::error::{Error, Result};
use crate::math::Rgb;
use crate::topper::TopperGeometry;

/// Angular step between consecutive particles, π·(3 − √5) ≈ 2.39996 rad
pub const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

/// Frequency of the branch-layer ripple along the normalized index
const LAYER_FREQUENCY: f64 = 25.0;
/// Peak amplitude of the branch-layer ripple
const LAYER_AMPLITUDE: f64 = 0.8;

const FOLIAGE_COLOR: Rgb = Rgb::from_hex(0x003318);
const ORNAMENT_COLORS: [Rgb; 2] = [Rgb::from_hex(0xFFD700), Rgb::from_hex(0x8A0A0A)];
const LIGHT_COLORS: [Rgb; 4] = [
    Rgb::from_hex(0x00FFFF),
    Rgb::from_hex(0xFF00FF),
    Rgb::from_hex(0xFFA500),
    Rgb::from_hex(0xFFFFFF),
];

/// Per-category animation rules, fixed at generation time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindRules {
    /// Whether the particle tumbles freely while dispersed
    pub tumbles_when_dispersed: bool,
    /// Fraction of the base scale targeted while dispersed
    pub dispersed_scale: f32,
}

/// Particle category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Dark green needles, the bulk of the tree
    Foliage,
    /// Metallic baubles sitting slightly outside the foliage
    Ornament,
    /// Small emissive cubes
    Light,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [
        ParticleKind::Foliage,
        ParticleKind::Ornament,
        ParticleKind::Light,
    ];

    /// Maps a uniform draw in `[0, 1)` to a category: 10% lights, 20% ornaments, 70% foliage
    pub fn from_draw(draw: f64) -> Self {
        if draw > 0.9 {
            ParticleKind::Light
        } else if draw > 0.7 {
            ParticleKind::Ornament
        } else {
            ParticleKind::Foliage
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Foliage => "foliage",
            ParticleKind::Ornament => "ornament",
            ParticleKind::Light => "light",
        }
    }

    pub fn rules(self) -> KindRules {
        match self {
            ParticleKind::Foliage | ParticleKind::Ornament | ParticleKind::Light => KindRules {
                tumbles_when_dispersed: true,
                dispersed_scale: 0.5,
            },
        }
    }
}

/// One piece of tree content
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Generation index, unique across all categories
    pub id: usize,
    pub kind: ParticleKind,
    /// Position on the assembled tree
    pub assembled_position: Vec3,
    /// Position in the scattered cloud
    pub dispersed_position: Vec3,
    pub base_scale: f32,
    pub color: Rgb,
    /// Orientation held while assembled (identity for ornaments and lights)
    pub rest_rotation: Quat,
    /// Animation rules resolved from the category
    pub rules: KindRules,
}

/// Output of [`generate`]: three category collections and the topper outline
#[derive(Clone, Debug)]
pub struct TreeLayout {
    pub foliage: Vec<Particle>,
    pub ornaments: Vec<Particle>,
    pub lights: Vec<Particle>,
    pub topper: TopperGeometry,
}

impl TreeLayout {
    /// Total number of particles across all categories
    pub fn len(&self) -> usize {
        self.foliage.len() + self.ornaments.len() + self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collection holding the given category
    pub fn collection(&self, kind: ParticleKind) -> &[Particle] {
        match kind {
            ParticleKind::Foliage => &self.foliage,
            ParticleKind::Ornament => &self.ornaments,
            ParticleKind::Light => &self.lights,
        }
    }

    /// Iterates every particle, foliage first
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.foliage
            .iter()
            .chain(self.ornaments.iter())
            .chain(self.lights.iter())
    }
}

/// Generates `count` particles and the topper geometry.
///
/// Positions on the tree are fully determined by the index; category,
/// size, color, rest rotation and dispersed position are drawn from `rng`,
/// so a seeded generator reproduces the layout exactly.
pub fn generate<R: Rng>(
    count: i64,
    config: &SceneConfig,
    rng: &mut R,
) -> Result<TreeLayout> {
    let count = usize::try_from(count)
        .map_err(|_| Error::InvalidArgument(format!("particle count must be >= 0, got {count}")))?;
    let topper = TopperGeometry::star(&config.star)?;

    let mut foliage = Vec::new();
    let mut ornaments = Vec::new();
    let mut lights = Vec::new();

    let height = config.tree_height as f64;
    let max_radius = config.max_radius as f64;
    let extent = config.scatter_extent;

    for i in 0..count {
        // 0 at the top, approaching 1 at the bottom
        let t = i as f64 / count as f64;
        let angle = i as f64 * GOLDEN_ANGLE;

        let y = (1.0 - t) * height - height / 2.0;
        let normalized_height = (y + height / 2.0) / height;
        let base_radius = max_radius * (1.0 - normalized_height);
        let layer_wave = (t * LAYER_FREQUENCY).sin() * LAYER_AMPLITUDE * (1.0 - t);

        let kind = ParticleKind::from_draw(rng.random::<f64>());

        let mut rest_rotation = Quat::IDENTITY;
        let (radius_offset, base_scale, color) = match kind {
            ParticleKind::Foliage => {
                let offset = rng.random_range(0.0..0.2);
                let scale = rng.random_range(0.6..1.0);
                rest_rotation = Quat::from_euler(
                    EulerRot::XYZ,
                    rng.random_range(0.0..std::f32::consts::PI),
                    rng.random_range(0.0..std::f32::consts::PI),
                    rng.random_range(0.0..std::f32::consts::PI),
                );
                (offset, scale, FOLIAGE_COLOR)
            }
            ParticleKind::Ornament => {
                let offset = rng.random_range(0.4..0.6);
                let scale = rng.random_range(1.2..1.8);
                let color = if rng.random_bool(0.5) {
                    ORNAMENT_COLORS[0]
                } else {
                    ORNAMENT_COLORS[1]
                };
                (offset, scale, color)
            }
            ParticleKind::Light => {
                let offset = rng.random_range(0.25..0.45);
                let color = LIGHT_COLORS[rng.random_range(0..LIGHT_COLORS.len())];
                (offset, 0.7, color)
            }
        };

        let r = base_radius + layer_wave + radius_offset;
        let assembled_position = Vec3::new(
            (r * angle.cos()) as f32,
            y as f32,
            (r * angle.sin()) as f32,
        );
        let dispersed_position = Vec3::new(
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
        );

        let particle = Particle {
            id: i,
            kind,
            assembled_position,
            dispersed_position,
            base_scale,
            color,
            rest_rotation,
            rules: kind.rules(),
        };

        match kind {
            ParticleKind::Foliage => foliage.push(particle),
            ParticleKind::Ornament => ornaments.push(particle),
            ParticleKind::Light => lights.push(particle),
        }
    }

    log::info!(
        "Generated {} particles ({} foliage, {} ornaments, {} lights)",
        count,
        foliage.len(),
        ornaments.len(),
        lights.len()
    );

    Ok(TreeLayout {
        foliage,
        ornaments,
        lights,
        topper,
    })
}
