use crate::game::input::Strafe;
use crate::game::rig::ProceduralParts;

use super::oscillator::Oscillator;
use super::{AnimationConfig, MotionInput};

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Limb swing, body bob and strafe lean for the box rig.
#[derive(Debug, Clone)]
pub struct ProceduralAnimator {
    arms: Oscillator,
    legs: Oscillator,
    lean: f32,
    config: AnimationConfig,
}

impl ProceduralAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            arms: Oscillator::new(config.swing_amplitude, config.walk_swing_speed),
            legs: Oscillator::new(config.swing_amplitude, config.walk_swing_speed),
            lean: 0.0,
            config,
        }
    }

    pub fn lean(&self) -> f32 {
        self.lean
    }

    pub fn update(&mut self, parts: &mut ProceduralParts, motion: &MotionInput) {
        let cfg = &self.config;
        let mut lean_target = 0.0;

        if motion.moving && motion.grounded {
            let (speed, bob) = if motion.sprinting {
                (cfg.sprint_swing_speed, cfg.sprint_bob)
            } else {
                (cfg.walk_swing_speed, cfg.walk_bob)
            };
            self.arms.speed = speed;
            self.legs.speed = speed;

            let arm = self.arms.advance(motion.dt);
            parts.left_arm.rotation[0] = arm;
            parts.right_arm.rotation[0] = -arm;

            let leg = self.legs.advance(motion.dt);
            parts.left_thigh.rotation[0] = -leg;
            parts.right_thigh.rotation[0] = leg;

            parts.body_container.translation[1] = (motion.elapsed * cfg.bob_frequency).sin() * bob;

            lean_target = match motion.strafe {
                Strafe::Left => cfg.strafe_lean,
                Strafe::Right => -cfg.strafe_lean,
                Strafe::None => 0.0,
            };
        } else {
            let e = cfg.ease;
            for pivot in [
                &mut parts.left_arm,
                &mut parts.right_arm,
                &mut parts.left_thigh,
                &mut parts.right_thigh,
            ] {
                pivot.rotation[0] = lerp(pivot.rotation[0], 0.0, e);
            }
            let y = &mut parts.body_container.translation[1];
            *y = lerp(*y, 0.0, e);
        }

        self.lean = lerp(self.lean, lean_target, cfg.ease);
        parts.body_container.rotation[1] = self.lean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(moving: bool, grounded: bool, strafe: Strafe) -> MotionInput {
        MotionInput {
            dt: 1.0 / 60.0,
            elapsed: 0.5,
            grounded,
            moving,
            sprinting: false,
            strafe,
        }
    }

    #[test]
    fn test_walking_swings_limbs_in_opposition() {
        let mut anim = ProceduralAnimator::new(AnimationConfig::default());
        let mut parts = ProceduralParts::default();
        for _ in 0..10 {
            anim.update(&mut parts, &motion(true, true, Strafe::None));
        }
        assert!(parts.left_arm.rotation[0] > 0.0);
        assert_eq!(parts.right_arm.rotation[0], -parts.left_arm.rotation[0]);
        assert_eq!(parts.left_thigh.rotation[0], -parts.right_thigh.rotation[0]);
        assert!(parts.left_arm.rotation[0].abs() <= 0.8);
    }

    #[test]
    fn test_sprint_swings_faster() {
        let mut walk = ProceduralAnimator::new(AnimationConfig::default());
        let mut run = ProceduralAnimator::new(AnimationConfig::default());
        let mut walk_parts = ProceduralParts::default();
        let mut run_parts = ProceduralParts::default();
        let mut sprint = motion(true, true, Strafe::None);
        sprint.sprinting = true;
        walk.update(&mut walk_parts, &motion(true, true, Strafe::None));
        run.update(&mut run_parts, &sprint);
        assert!(run_parts.left_arm.rotation[0] > walk_parts.left_arm.rotation[0]);
    }

    #[test]
    fn test_airborne_eases_back_to_rest() {
        let mut anim = ProceduralAnimator::new(AnimationConfig::default());
        let mut parts = ProceduralParts::default();
        for _ in 0..20 {
            anim.update(&mut parts, &motion(true, true, Strafe::None));
        }
        let swung = parts.left_arm.rotation[0].abs();
        anim.update(&mut parts, &motion(true, false, Strafe::None));
        assert!((parts.left_arm.rotation[0].abs() - swung * 0.9).abs() < 1e-5);
        for _ in 0..200 {
            anim.update(&mut parts, &motion(false, true, Strafe::None));
        }
        assert!(parts.left_arm.rotation[0].abs() < 1e-4);
        assert!(parts.body_container.translation[1].abs() < 1e-4);
    }

    #[test]
    fn test_strafe_leans_toward_target() {
        let mut anim = ProceduralAnimator::new(AnimationConfig::default());
        let mut parts = ProceduralParts::default();
        anim.update(&mut parts, &motion(true, true, Strafe::Left));
        let target = std::f32::consts::PI / 16.0;
        assert!((anim.lean() - target * 0.1).abs() < 1e-6);
        for _ in 0..200 {
            anim.update(&mut parts, &motion(true, true, Strafe::Right));
        }
        assert!((parts.body_container.rotation[1] + target).abs() < 1e-3);
    }
}
