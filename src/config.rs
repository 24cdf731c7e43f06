//! Scene configuration
//!
//! Every tunable constant of the layout, the animators and the orientation
//! controller lives here so the front end can override them from the
//! command line.

use crate::error::{Error, Result};

/// Star-shaped topper parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarConfig {
    /// Number of star points
    pub points: usize,
    /// Radius of the outer (tip) vertices
    pub outer_radius: f32,
    /// Radius of the inner (valley) vertices
    pub inner_radius: f32,
    /// Extrusion depth
    pub depth: f32,
    /// Bevel thickness along the extrusion axis
    pub bevel_thickness: f32,
    /// How far the bevel grows the outline
    pub bevel_size: f32,
    /// Number of bevel layers on each side
    pub bevel_segments: usize,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            points: 5,
            outer_radius: 1.2,
            inner_radius: 0.5,
            depth: 0.4,
            bevel_thickness: 0.1,
            bevel_size: 0.1,
            bevel_segments: 2,
        }
    }
}

/// Tunables for the whole scene
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Total number of particles generated at startup
    pub particle_count: i64,
    /// Total tree height; the tree spans `[-height/2, height/2]`
    pub tree_height: f32,
    /// Radius of the cone at its base
    pub max_radius: f32,
    /// Half-extent of the cubic volume dispersed particles scatter into
    pub scatter_extent: f32,
    /// Interpolation speed of particle groups
    pub animation_speed: f32,
    /// Upper bound on the per-frame particle interpolation fraction
    pub max_step: f32,
    /// Tumbling rate of dispersed particles (rad/s around X and Z)
    pub tumble_rate: f32,
    /// Topper float height while assembled
    pub topper_assembled_y: f32,
    /// Topper float height while dispersed
    pub topper_dispersed_y: f32,
    /// Interpolation speed of the topper
    pub topper_speed: f32,
    /// Topper spin rate (rad/s around Y)
    pub topper_spin: f32,
    /// Ambient yaw rate while no hand is tracked (rad/s)
    pub idle_spin: f32,
    /// Rate the group rotation follows a tracked hand
    pub hand_follow_rate: f32,
    /// Maximum pitch reachable through the hand's vertical position (rad)
    pub max_pitch: f32,
    /// Rate at which pitch relaxes to zero without a hand
    pub pitch_relax_rate: f32,
    /// Orbit radians per cell of mouse drag
    pub drag_sensitivity: f32,
    /// Topper star
    pub star: StarConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 2500,
            tree_height: 18.0,
            max_radius: 7.0,
            scatter_extent: 30.0,
            animation_speed: 2.0,
            max_step: 0.1,
            tumble_rate: 0.5,
            topper_assembled_y: 9.5,
            topper_dispersed_y: 25.0,
            topper_speed: 2.0,
            topper_spin: 1.0,
            idle_spin: 0.1,
            hand_follow_rate: 3.0,
            max_pitch: 0.5,
            pitch_relax_rate: 1.0,
            drag_sensitivity: 0.05,
            star: StarConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Check the sizes and rates that must be strictly positive.
    ///
    /// The particle count is validated by the layout generator itself.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("tree_height", self.tree_height),
            ("max_radius", self.max_radius),
            ("scatter_extent", self.scatter_extent),
            ("animation_speed", self.animation_speed),
            ("max_step", self.max_step),
            ("topper_speed", self.topper_speed),
            ("hand_follow_rate", self.hand_follow_rate),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidArgument(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.max_step > 1.0 {
            return Err(Error::InvalidArgument(format!(
                "max_step must not exceed 1.0, got {}",
                self.max_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_speed() {
        let config = SceneConfig {
            animation_speed: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_step_above_one() {
        let config = SceneConfig {
            max_step: 1.5,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
