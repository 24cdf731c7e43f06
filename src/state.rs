use glam::Vec3;

/// Which target configuration the particles are heading towards
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Particles form the tree
    #[default]
    Assembled,
    /// Particles scatter into a cloud
    Dispersed,
}

impl Mode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Mode::Assembled => Mode::Dispersed,
            Mode::Dispersed => Mode::Assembled,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Assembled => "ASSEMBLED",
            Mode::Dispersed => "DISPERSED",
        }
    }
}

/// Front-end state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Enable debug mode
    pub debug: bool,
    /// Simulation paused
    pub paused: bool,
    /// Exit requested
    pub quit: bool,
    /// Light position in world space
    pub light_position: Vec3,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            debug: false,
            paused: false,
            quit: false,
            light_position: Vec3::new(10.0, 10.0, 10.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_toggle_round_trips() {
        assert_eq!(Mode::default(), Mode::Assembled);
        assert_eq!(Mode::Assembled.toggled(), Mode::Dispersed);
        assert_eq!(Mode::Dispersed.toggled(), Mode::Assembled);
    }
}
