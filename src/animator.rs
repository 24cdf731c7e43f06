//! Particle group animation
//!
//! A [`ParticleGroup`] owns one category's particles and their current
//! transforms. Each frame it moves every transform a fraction of the way
//! towards the active target configuration, then writes the results into the
//! instance buffer handed to the renderer.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::SceneConfig;
use crate::error::{Error, Result};
use crate::layout::{Particle, ParticleKind};
use crate::math::{clamped_step, lerp, Rgb};
use crate::state::Mode;

/// Shape drawn for every instance of a group
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryKind {
    /// Four-sided cone
    Cone { radius: f32, height: f32, sides: u32 },
    Sphere { radius: f32, segments: u32, rings: u32 },
    Cube { size: f32 },
}

/// Surface description shared by a group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub base_color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    /// Zero for lit surfaces; lights glow regardless of shading
    pub emissive_intensity: f32,
}

/// Geometry and material shared by all instances of a group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupStyle {
    pub geometry: GeometryKind,
    pub material: Material,
}

impl GroupStyle {
    pub fn for_kind(kind: ParticleKind) -> Self {
        match kind {
            ParticleKind::Foliage => GroupStyle {
                geometry: GeometryKind::Cone {
                    radius: 0.5,
                    height: 1.0,
                    sides: 4,
                },
                material: Material {
                    base_color: Rgb::from_hex(0x003318),
                    roughness: 0.8,
                    metalness: 0.0,
                    emissive_intensity: 0.0,
                },
            },
            ParticleKind::Ornament => GroupStyle {
                geometry: GeometryKind::Sphere {
                    radius: 0.5,
                    segments: 16,
                    rings: 16,
                },
                material: Material {
                    base_color: Rgb::WHITE,
                    roughness: 0.1,
                    metalness: 1.0,
                    emissive_intensity: 0.0,
                },
            },
            ParticleKind::Light => GroupStyle {
                geometry: GeometryKind::Cube { size: 0.5 },
                material: Material {
                    base_color: Rgb::WHITE,
                    roughness: 1.0,
                    metalness: 0.0,
                    emissive_intensity: 3.0,
                },
            },
        }
    }
}

/// Where a particle currently is
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrentTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl CurrentTransform {
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

/// One slot of the renderer-facing instance buffer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceData {
    pub transform: Mat4,
    pub color: Rgb,
}

/// Animated batch of particles sharing one category
pub struct ParticleGroup {
    kind: ParticleKind,
    style: GroupStyle,
    particles: Vec<Particle>,
    /// Running interpolation state, one per particle; empty until initialized
    current: Vec<CurrentTransform>,
    instances: Vec<InstanceData>,
    initialized: bool,
    speed: f32,
    max_step: f32,
    tumble_rate: f32,
}

impl ParticleGroup {
    /// Creates a group for particles of a single category.
    ///
    /// Fails if any particle belongs to another category.
    pub fn new(kind: ParticleKind, particles: Vec<Particle>, config: &SceneConfig) -> Result<Self> {
        if let Some(stray) = particles.iter().find(|p| p.kind != kind) {
            return Err(Error::InvalidArgument(format!(
                "particle {} is {} but the group holds {}",
                stray.id,
                stray.kind.name(),
                kind.name()
            )));
        }
        Ok(ParticleGroup {
            kind,
            style: GroupStyle::for_kind(kind),
            particles,
            current: Vec::new(),
            instances: Vec::new(),
            initialized: false,
            speed: config.animation_speed,
            max_step: config.max_step,
            tumble_rate: config.tumble_rate,
        })
    }

    /// Places every particle at its assembled transform and writes colors once
    pub fn initialize(&mut self) {
        self.current = self
            .particles
            .iter()
            .map(|p| CurrentTransform {
                position: p.assembled_position,
                rotation: p.rest_rotation,
                scale: p.base_scale,
            })
            .collect();
        self.instances = self
            .particles
            .iter()
            .zip(&self.current)
            .map(|(p, state)| InstanceData {
                transform: state.to_matrix(),
                color: p.color,
            })
            .collect();
        self.initialized = true;
        log::debug!(
            "Initialized {} group with {} instances",
            self.kind.name(),
            self.particles.len()
        );
    }

    /// Interpolation fraction applied for a frame of length `dt`
    pub fn step(&self, dt: f32) -> f32 {
        clamped_step(dt, self.speed, self.max_step)
    }

    /// Moves every particle one frame towards the target of `mode`
    pub fn advance(&mut self, mode: Mode, dt: f32) -> Result<()> {
        self.ensure_initialized()?;
        let step = self.step(dt);

        for ((particle, state), instance) in self
            .particles
            .iter()
            .zip(self.current.iter_mut())
            .zip(self.instances.iter_mut())
        {
            let rules = particle.rules;

            let target = match mode {
                Mode::Assembled => particle.assembled_position,
                Mode::Dispersed => particle.dispersed_position,
            };
            state.position = state.position.lerp(target, step);

            state.rotation = match mode {
                Mode::Dispersed if rules.tumbles_when_dispersed => {
                    let (x, y, z) = state.rotation.to_euler(EulerRot::XYZ);
                    let spin = dt * self.tumble_rate;
                    Quat::from_euler(EulerRot::XYZ, x + spin, y, z + spin)
                }
                Mode::Dispersed => state.rotation,
                Mode::Assembled => state.rotation.slerp(particle.rest_rotation, step),
            };

            let target_scale = match mode {
                Mode::Assembled => particle.base_scale,
                Mode::Dispersed => particle.base_scale * rules.dispersed_scale,
            };
            state.scale = lerp(state.scale, target_scale, step);

            instance.transform = state.to_matrix();
        }
        Ok(())
    }

    /// Current transform of the particle in slot `index`
    pub fn current(&self, index: usize) -> Result<&CurrentTransform> {
        self.ensure_initialized()?;
        self.current.get(index).ok_or(Error::SlotOutOfRange {
            index,
            len: self.current.len(),
        })
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::Uninitialized {
                group: self.kind.name(),
                len: self.particles.len(),
            })
        }
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn style(&self) -> &GroupStyle {
        &self.style
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Per-instance transforms and colors, indexed like [`Self::particles`]
    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
