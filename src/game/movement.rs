use nalgebra::Vector3;
use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use super::constants::movement as consts;
use super::input::{InputState, Key};
use super::physics::PhysicsWorld;

/// Velocity response tuning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MovementConfig {
    pub base_speed: f32,
    pub sprint_multiplier: f32,
    pub walk_multiplier: f32,
    /// Weight of the target velocity per grounded frame
    pub ground_blend: f32,
    pub air_acceleration: f32,
    pub ground_deceleration: f32,
    pub air_deceleration: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: consts::BASE_SPEED,
            sprint_multiplier: consts::SPRINT_MULTIPLIER,
            walk_multiplier: consts::WALK_MULTIPLIER,
            ground_blend: consts::GROUND_BLEND,
            air_acceleration: consts::AIR_ACCELERATION,
            ground_deceleration: consts::GROUND_DECELERATION,
            air_deceleration: consts::AIR_DECELERATION,
        }
    }
}

/// Horizontal basis derived from the camera's view direction.
#[derive(Debug, Clone, Copy)]
pub struct HorizontalBasis {
    pub forward: Vector3<f32>,
    /// world_up × forward; points to the viewer's left
    pub side: Vector3<f32>,
}

impl HorizontalBasis {
    /// Flattens the camera direction onto XZ. Looking straight up or down
    /// yields a zero basis rather than NaN.
    pub fn from_camera_forward(camera_forward: [f32; 3]) -> Self {
        let flat = Vector3::new(camera_forward[0], 0.0, camera_forward[2]);
        let forward = flat.try_normalize(1.0e-6).unwrap_or_else(Vector3::zeros);
        let side = Vector3::y().cross(&forward);
        Self { forward, side }
    }
}

/// Unit input direction from the pressed movement keys, or zero.
pub fn input_direction(input: &InputState, basis: &HorizontalBasis) -> Vector3<f32> {
    let mut dir = Vector3::zeros();
    if input.is_pressed(Key::Forward) {
        dir += basis.forward;
    }
    if input.is_pressed(Key::Back) {
        dir -= basis.forward;
    }
    if input.is_pressed(Key::Left) {
        dir += basis.side;
    }
    if input.is_pressed(Key::Right) {
        dir -= basis.side;
    }
    if dir.norm_squared() > 0.0 {
        dir.normalize_mut();
    }
    dir
}

/// Computes the next horizontal (x, z) velocity. Vertical velocity is not touched here.
pub fn integrate_horizontal(
    current: [f32; 2],
    direction: Vector3<f32>,
    speed: f32,
    dt: f32,
    grounded: bool,
    config: &MovementConfig,
) -> [f32; 2] {
    let [mut vx, mut vz] = current;

    if direction.norm_squared() > 0.0 {
        let tx = direction.x * speed;
        let tz = direction.z * speed;
        if grounded {
            let keep = 1.0 - config.ground_blend;
            vx = tx * config.ground_blend + vx * keep;
            vz = tz * config.ground_blend + vz * keep;
        } else {
            let k = (config.air_acceleration * dt).min(1.0);
            vx += (tx - vx) * k;
            vz += (tz - vz) * k;
        }
    } else {
        let decel = if grounded {
            config.ground_deceleration
        } else {
            config.air_deceleration
        };
        let factor = (1.0 - decel * dt).max(0.0);
        vx *= factor;
        vz *= factor;
    }

    let horizontal = (vx * vx + vz * vz).sqrt();
    if horizontal > speed && horizontal > 0.0 {
        let scale = speed / horizontal;
        vx *= scale;
        vz *= scale;
    }
    [vx, vz]
}

/// Applies input-driven horizontal velocity to the character body.
pub fn move_character(
    physics: &mut PhysicsWorld,
    body: RigidBodyHandle,
    input: &InputState,
    camera_forward: [f32; 3],
    speed: f32,
    dt: f32,
    grounded: bool,
    config: &MovementConfig,
) -> bool {
    let Some(v) = physics.linvel(body) else {
        return false;
    };
    let basis = HorizontalBasis::from_camera_forward(camera_forward);
    let direction = input_direction(input, &basis);
    let [vx, vz] = integrate_horizontal([v[0], v[2]], direction, speed, dt, grounded, config);
    physics.set_linvel(body, [vx, v[1], vz])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[Key]) -> InputState {
        let mut input = InputState::default();
        for &k in keys {
            input.press(k);
        }
        input
    }

    fn speed_of(v: [f32; 2]) -> f32 {
        (v[0] * v[0] + v[1] * v[1]).sqrt()
    }

    #[test]
    fn test_forward_moves_along_camera() {
        let basis = HorizontalBasis::from_camera_forward([0.0, 0.0, -1.0]);
        let dir = input_direction(&held(&[Key::Forward]), &basis);
        assert!((dir - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_left_strafe_points_left_of_view() {
        let basis = HorizontalBasis::from_camera_forward([0.0, 0.0, -1.0]);
        let dir = input_direction(&held(&[Key::Left]), &basis);
        assert!((dir - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_diagonal_speed_matches_single_key() {
        let cfg = MovementConfig::default();
        let basis = HorizontalBasis::from_camera_forward([0.3, -0.2, -0.9]);
        let mut single = [0.0, 0.0];
        let mut diagonal = [0.0, 0.0];
        for _ in 0..30 {
            let d1 = input_direction(&held(&[Key::Forward]), &basis);
            let d2 = input_direction(&held(&[Key::Forward, Key::Right]), &basis);
            single = integrate_horizontal(single, d1, 6.0, 1.0 / 60.0, true, &cfg);
            diagonal = integrate_horizontal(diagonal, d2, 6.0, 1.0 / 60.0, true, &cfg);
        }
        assert!((speed_of(single) - 6.0).abs() < 1e-3);
        assert!((speed_of(diagonal) - speed_of(single)).abs() < 1e-3);
    }

    #[test]
    fn test_grounded_response_is_near_immediate() {
        let cfg = MovementConfig::default();
        let dir = Vector3::new(1.0, 0.0, 0.0);
        let v = integrate_horizontal([0.0, 0.0], dir, 6.0, 1.0 / 60.0, true, &cfg);
        assert!((v[0] - 5.4).abs() < 1e-4);
    }

    #[test]
    fn test_airborne_response_preserves_momentum() {
        let cfg = MovementConfig::default();
        let dir = Vector3::new(-1.0, 0.0, 0.0);
        let v = integrate_horizontal([6.0, 0.0], dir, 6.0, 1.0 / 60.0, false, &cfg);
        assert!(v[0] > 5.0, "Air control should only nudge velocity, got {}", v[0]);
    }

    #[test]
    fn test_no_input_decays_faster_on_ground() {
        let cfg = MovementConfig::default();
        let zero = Vector3::zeros();
        let ground = integrate_horizontal([4.0, 0.0], zero, 6.0, 0.1, true, &cfg);
        let air = integrate_horizontal([4.0, 0.0], zero, 6.0, 0.1, false, &cfg);
        assert!((ground[0] - 2.0).abs() < 1e-4);
        assert!((air[0] - 3.6).abs() < 1e-4);
    }

    #[test]
    fn test_speed_is_clamped() {
        let cfg = MovementConfig::default();
        let v = integrate_horizontal([20.0, 0.0], Vector3::zeros(), 6.0, 0.0, true, &cfg);
        assert!((speed_of(v) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_camera_gives_zero_basis() {
        let basis = HorizontalBasis::from_camera_forward([0.0, 1.0, 0.0]);
        let dir = input_direction(&held(&[Key::Forward, Key::Left]), &basis);
        assert_eq!(dir, Vector3::zeros());
        assert!(!dir.x.is_nan());
    }
}
