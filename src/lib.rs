//! Cybertree - a particle Christmas tree for the terminal
//!
//! Thousands of typed particles are laid out on a golden-angle spiral cone
//! and blended every frame between the assembled tree and a dispersed cloud.
//! The tree spins on its own, follows a tracked hand when one is available,
//! and can be orbited with the mouse.

pub mod animator;
pub mod cli;
pub mod config;
pub mod error;
pub mod graphics;
pub mod hand;
pub mod layout;
pub mod math;
pub mod orientation;
pub mod scene;
pub mod state;
pub mod topper;
pub mod vertex;
pub mod widget;

pub use config::SceneConfig;
pub use error::{Error, Result};
pub use hand::HandSignal;
pub use scene::Scene;
pub use state::Mode;
