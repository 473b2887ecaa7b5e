use rapier3d::prelude::RigidBodyHandle;

use super::constants::jump as consts;
use super::physics::PhysicsWorld;
use super::stamina::StaminaPool;

/// Cooldown- and stamina-gated jump.
#[derive(Debug, Clone, Copy)]
pub struct JumpArbiter {
    pub cooldown: f32,
    last_jump: Option<f64>,
}

impl JumpArbiter {
    pub fn new(cooldown: f32) -> Self {
        Self {
            cooldown,
            last_jump: None,
        }
    }

    /// Whether enough time has passed since the last successful jump.
    pub fn cooldown_elapsed(&self, now: f64) -> bool {
        match self.last_jump {
            Some(t) => now - t > self.cooldown as f64,
            None => true,
        }
    }

    /// Sets the body's vertical velocity to `jump_velocity` when grounded, off
    /// cooldown, and the stamina gate grants the cost. A denied jump changes nothing.
    pub fn jump(
        &mut self,
        now: f64,
        grounded: bool,
        stamina: &mut StaminaPool,
        physics: &mut PhysicsWorld,
        body: RigidBodyHandle,
        jump_velocity: f32,
    ) -> bool {
        if !grounded || !self.cooldown_elapsed(now) {
            return false;
        }
        let Some(v) = physics.linvel(body) else {
            return false;
        };
        if !stamina.can_jump() {
            tracing::debug!("jump refused: not enough stamina");
            return false;
        }
        physics.set_linvel(body, [v[0], jump_velocity, v[2]]);
        self.last_jump = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_jump = None;
    }
}

impl Default for JumpArbiter {
    fn default() -> Self {
        Self::new(consts::COOLDOWN_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::{BodySpec, BodyState};

    fn setup() -> (PhysicsWorld, RigidBodyHandle) {
        let mut world = PhysicsWorld::default();
        world.add_ground_plane();
        let body = world.insert_character_body(
            &BodySpec {
                half_extents: [0.24, 0.3, 0.24],
                mass: 70.0,
                linear_damping: 0.5,
            },
            BodyState::at([0.0, 0.3, 0.0]),
        );
        (world, body)
    }

    #[test]
    fn test_jump_sets_vertical_velocity() {
        let (mut world, body) = setup();
        let mut stamina = StaminaPool::default();
        let mut arbiter = JumpArbiter::default();
        world.set_linvel(body, [2.0, 0.0, 1.0]);

        assert!(arbiter.jump(10.0, true, &mut stamina, &mut world, body, 6.0));
        assert_eq!(world.linvel(body).unwrap(), [2.0, 6.0, 1.0]);
        assert!((stamina.current() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_jump_twice_within_cooldown_succeeds_once() {
        let (mut world, body) = setup();
        let mut stamina = StaminaPool::default();
        let mut arbiter = JumpArbiter::default();

        assert!(arbiter.jump(1.0, true, &mut stamina, &mut world, body, 6.0));
        assert!(!arbiter.jump(1.2, true, &mut stamina, &mut world, body, 6.0));
        assert!((stamina.current() - 90.0).abs() < 1e-4);
        assert!(arbiter.jump(1.31, true, &mut stamina, &mut world, body, 6.0));
    }

    #[test]
    fn test_airborne_jump_fails() {
        let (mut world, body) = setup();
        let mut stamina = StaminaPool::default();
        let mut arbiter = JumpArbiter::default();

        assert!(!arbiter.jump(1.0, false, &mut stamina, &mut world, body, 6.0));
        assert_eq!(stamina.current(), 100.0);
        assert_eq!(world.linvel(body).unwrap()[1], 0.0);
    }

    #[test]
    fn test_jump_without_stamina_fails_and_keeps_stamina() {
        let (mut world, body) = setup();
        let mut stamina = StaminaPool::default();
        stamina.consume(95.0);
        let mut arbiter = JumpArbiter::default();

        assert!(!arbiter.jump(1.0, true, &mut stamina, &mut world, body, 6.0));
        assert!((stamina.current() - 5.0).abs() < 1e-4);
        assert!(arbiter.cooldown_elapsed(1.0), "Denied jump must not start the cooldown");
    }
}
