//! Scene orchestration
//!
//! Owns the mode flag and every animated component, and advances them once
//! per frame with the mode and hand snapshot passed in explicitly.

use rand::Rng;

use crate::animator::ParticleGroup;
use crate::config::SceneConfig;
use crate::error::Result;
use crate::hand::HandSignal;
use crate::layout::{self, ParticleKind, TreeLayout};
use crate::orientation::OrientationController;
use crate::state::Mode;
use crate::topper::TopperAnimator;

pub struct Scene {
    mode: Mode,
    groups: Vec<ParticleGroup>,
    topper: TopperAnimator,
    orientation: OrientationController,
    /// Hand signal seen on the latest tick
    hand: Option<HandSignal>,
    frame: u64,
}

impl Scene {
    /// Generates the layout once and builds every animator from it
    pub fn new<R: Rng>(config: &SceneConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let layout = layout::generate(config.particle_count, config, rng)?;
        Self::from_layout(layout, config)
    }

    /// Builds and initializes the animators for an existing layout
    pub fn from_layout(layout: TreeLayout, config: &SceneConfig) -> Result<Self> {
        let TreeLayout {
            foliage,
            ornaments,
            lights,
            topper,
        } = layout;

        let mut groups = vec![
            ParticleGroup::new(ParticleKind::Foliage, foliage, config)?,
            ParticleGroup::new(ParticleKind::Ornament, ornaments, config)?,
            ParticleGroup::new(ParticleKind::Light, lights, config)?,
        ];
        for group in &mut groups {
            group.initialize();
        }

        Ok(Scene {
            mode: Mode::Assembled,
            groups,
            topper: TopperAnimator::new(topper, config),
            orientation: OrientationController::new(config),
            hand: None,
            frame: 0,
        })
    }

    /// Advances every component by one frame
    pub fn tick(&mut self, dt: f32, hand: Option<HandSignal>) -> Result<()> {
        self.observe_hand(hand);
        self.orientation.update(hand, dt);
        for group in &mut self.groups {
            group.advance(self.mode, dt)?;
        }
        self.topper.advance(self.mode, dt);
        self.frame += 1;
        Ok(())
    }

    /// Updates hand presence and orbit locking without moving anything.
    ///
    /// Called every frame, including while paused.
    pub fn observe_hand(&mut self, hand: Option<HandSignal>) {
        if hand.is_some() != self.hand.is_some() {
            log::info!(
                "{}",
                if hand.is_some() {
                    "Hand detected"
                } else {
                    "Hand lost, resuming idle rotation"
                }
            );
        }
        self.hand = hand;
        self.orientation.observe(hand);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            log::info!("Mode -> {}", mode.label());
        }
        self.mode = mode;
    }

    /// Flips between assembled and dispersed
    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    pub fn group(&self, kind: ParticleKind) -> &ParticleGroup {
        match kind {
            ParticleKind::Foliage => &self.groups[0],
            ParticleKind::Ornament => &self.groups[1],
            ParticleKind::Light => &self.groups[2],
        }
    }

    pub fn topper(&self) -> &TopperAnimator {
        &self.topper
    }

    pub fn orientation(&self) -> &OrientationController {
        &self.orientation
    }

    pub fn orientation_mut(&mut self) -> &mut OrientationController {
        &mut self.orientation
    }

    pub fn hand(&self) -> Option<HandSignal> {
        self.hand
    }

    /// Total particle count across groups
    pub fn particle_count(&self) -> usize {
        self.groups.iter().map(ParticleGroup::len).sum()
    }

    /// Number of ticks so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
