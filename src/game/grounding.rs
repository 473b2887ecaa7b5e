use rapier3d::prelude::RigidBodyHandle;

use super::constants::{jump as jump_consts, physics as consts};
use super::physics::PhysicsWorld;

/// Ray-based ground contact detection for the active character body.
///
/// The probe keeps the last computed value so every consumer within a frame
/// (jump, animation, snapshots) reads the same reading.
#[derive(Debug, Clone, Copy)]
pub struct GroundProbe {
    pub distance: f32,
    grounded: bool,
}

impl GroundProbe {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            grounded: false,
        }
    }

    /// Casts down from the body centre. A miss simply means airborne this frame.
    pub fn probe(&mut self, physics: &PhysicsWorld, body: RigidBodyHandle) -> bool {
        self.grounded = match physics.translation(body) {
            Some(origin) => physics
                .raycast_down(origin, self.distance + consts::EPSILON, Some(body))
                .is_some(),
            None => false,
        };
        self.grounded
    }

    /// Last value computed by [`GroundProbe::probe`].
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Forgets the last reading (e.g. after the active body changed).
    pub fn clear(&mut self) {
        self.grounded = false;
    }
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self::new(jump_consts::GROUND_PROBE_DISTANCE)
    }
}
