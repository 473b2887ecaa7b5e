//! Per-variant character animation.
//!
//! The box rig is driven procedurally from oscillators; the skinned rig runs a
//! small state machine that cross-fades between clip actions.

pub mod action;
pub mod oscillator;
pub mod procedural;
pub mod skinned;
pub mod state;

use serde::{Deserialize, Serialize};

use super::constants::animation as consts;
use super::input::Strafe;
use super::rig::CharacterVariant;

pub use action::{ActionMixer, ClipAction, LoopMode};
pub use procedural::ProceduralAnimator;
pub use skinned::SkinnedAnimator;
pub use state::AnimationState;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub cross_fade_secs: f32,
    pub swing_amplitude: f32,
    pub walk_swing_speed: f32,
    pub sprint_swing_speed: f32,
    pub walk_bob: f32,
    pub sprint_bob: f32,
    pub bob_frequency: f32,
    pub strafe_lean: f32,
    pub ease: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            cross_fade_secs: consts::CROSS_FADE_SECS,
            swing_amplitude: consts::SWING_AMPLITUDE,
            walk_swing_speed: consts::WALK_SWING_SPEED,
            sprint_swing_speed: consts::SPRINT_SWING_SPEED,
            walk_bob: consts::WALK_BOB,
            sprint_bob: consts::SPRINT_BOB,
            bob_frequency: consts::BOB_FREQUENCY,
            strafe_lean: consts::STRAFE_LEAN,
            ease: consts::EASE,
        }
    }
}

/// Motion facts both strategies read for one frame.
#[derive(Debug, Clone, Copy)]
pub struct MotionInput {
    pub dt: f32,
    /// Seconds since the simulation started
    pub elapsed: f32,
    pub grounded: bool,
    pub moving: bool,
    pub sprinting: bool,
    pub strafe: Strafe,
}

/// Dispatches to the animation strategy of whichever variant is active.
#[derive(Debug, Clone)]
pub struct AnimationCoordinator {
    procedural: ProceduralAnimator,
    skinned: SkinnedAnimator,
}

impl AnimationCoordinator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            procedural: ProceduralAnimator::new(config),
            skinned: SkinnedAnimator::new(config.cross_fade_secs),
        }
    }

    pub fn update(&mut self, variant: &mut CharacterVariant, motion: &MotionInput) {
        match variant {
            CharacterVariant::Procedural { parts, .. } => self.procedural.update(parts, motion),
            CharacterVariant::Skinned { mixer, .. } => self.skinned.update(mixer, motion),
        }
    }

    /// Current skinned state; meaningful only while the skinned variant is active.
    pub fn skinned_state(&self) -> AnimationState {
        self.skinned.state()
    }

    pub fn skinned(&self) -> &SkinnedAnimator {
        &self.skinned
    }

    /// Call when a new clip set replaces the old one.
    pub fn reset_skinned(&mut self) {
        self.skinned.reset();
    }
}

impl Default for AnimationCoordinator {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}
