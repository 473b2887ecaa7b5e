//! Keyboard state and the sprint/walk/camera-toggle semantics layered on it.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::camera::CameraRig;
use super::movement::MovementConfig;
use super::stamina::StaminaPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Sprint,
    WalkToggle,
    CameraToggle,
}

impl Key {
    /// Parses DOM-style key codes ("KeyW", "ShiftLeft", ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(Key::Forward),
            "KeyS" => Some(Key::Back),
            "KeyA" => Some(Key::Left),
            "KeyD" => Some(Key::Right),
            "Space" => Some(Key::Jump),
            "ShiftLeft" => Some(Key::Sprint),
            "CapsLock" => Some(Key::WalkToggle),
            "ControlLeft" => Some(Key::CameraToggle),
            _ => None,
        }
    }

    pub fn is_movement(self) -> bool {
        matches!(self, Key::Forward | Key::Back | Key::Left | Key::Right)
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::from_code(s).ok_or_else(|| format!("unknown key code '{}'", s))
    }
}

/// Strafe key currently held, used for the body lean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strafe {
    None,
    Left,
    Right,
}

/// Per-frame input snapshot read by the core.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
    pub sprinting: bool,
    pub walking: bool,
    /// Vehicle-style override that suppresses normal movement
    pub tank_control: bool,
}

impl InputState {
    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_moving(&self) -> bool {
        self.pressed.iter().any(|k| k.is_movement())
    }

    /// Left wins when both strafe keys are held.
    pub fn strafe(&self) -> Strafe {
        if self.is_pressed(Key::Left) {
            Strafe::Left
        } else if self.is_pressed(Key::Right) {
            Strafe::Right
        } else {
            Strafe::None
        }
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
        self.sprinting = false;
    }
}

/// Owns the input state and applies key-down/up semantics.
#[derive(Debug, Clone)]
pub struct Controls {
    input: InputState,
    movement: MovementConfig,
    current_speed: f32,
}

impl Controls {
    pub fn new(movement: MovementConfig) -> Self {
        Self {
            input: InputState::default(),
            current_speed: movement.base_speed,
            movement,
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn movement_config(&self) -> &MovementConfig {
        &self.movement
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn key_down(&mut self, key: Key, stamina: &StaminaPool, camera: &mut CameraRig) {
        self.input.press(key);
        match key {
            Key::Sprint => {
                if !self.input.sprinting && !self.input.walking && stamina.can_sprint() {
                    self.input.sprinting = true;
                    camera.set_sprint_fov(true);
                }
            }
            Key::WalkToggle => {
                self.input.walking = !self.input.walking;
                if self.input.walking {
                    self.input.sprinting = false;
                    camera.set_sprint_fov(false);
                }
                tracing::debug!(walking = self.input.walking, "walk mode toggled");
            }
            Key::CameraToggle => camera.toggle_mode(),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key, camera: &mut CameraRig) {
        self.input.release(key);
        if key == Key::Sprint {
            self.input.sprinting = false;
            if !self.input.walking {
                camera.set_sprint_fov(false);
            }
        }
    }

    pub fn set_tank_control(&mut self, enabled: bool, camera: &mut CameraRig) {
        if self.input.tank_control != enabled {
            self.input.tank_control = enabled;
            camera.set_sprint_fov(false);
            tracing::info!(enabled, "tank control changed");
        }
    }

    /// Per-frame update: drops sprint the stamina gate no longer allows and recomputes speed.
    ///
    /// A forced drop exhausts the pool, so sprint cannot restart before recovery.
    pub fn update(&mut self, stamina: &mut StaminaPool, camera: &mut CameraRig) {
        if self.input.sprinting && !stamina.can_sprint() {
            stamina.exhaust();
            self.input.sprinting = false;
            camera.set_sprint_fov(false);
        }

        let mut speed = self.movement.base_speed;
        if self.input.sprinting {
            speed *= self.movement.sprint_multiplier;
        }
        if self.input.walking {
            speed *= self.movement.walk_multiplier;
        }
        self.current_speed = speed;
    }

    /// Releases every key (e.g. on focus loss or when the loop is paused).
    pub fn release_all(&mut self, camera: &mut CameraRig) {
        self.input.clear();
        camera.set_sprint_fov(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::camera::{CameraConfig, CameraMode};

    fn setup() -> (Controls, StaminaPool, CameraRig) {
        (
            Controls::new(MovementConfig::default()),
            StaminaPool::default(),
            CameraRig::new(CameraConfig::default()),
        )
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("KeyW"), Some(Key::Forward));
        assert_eq!(Key::from_code("ControlLeft"), Some(Key::CameraToggle));
        assert_eq!(Key::from_code("KeyQ"), None);
        assert!("Space".parse::<Key>().is_ok());
    }

    #[test]
    fn test_sprint_raises_speed_and_fov_target() {
        let (mut controls, mut stamina, mut camera) = setup();
        controls.key_down(Key::Sprint, &stamina, &mut camera);
        controls.update(&mut stamina, &mut camera);
        assert!(controls.input().sprinting);
        assert!((controls.current_speed() - 10.8).abs() < 1e-4);
        assert_eq!(camera.target_fov(), 80.0);

        controls.key_up(Key::Sprint, &mut camera);
        controls.update(&mut stamina, &mut camera);
        assert!((controls.current_speed() - 6.0).abs() < 1e-4);
        assert_eq!(camera.target_fov(), 70.0);
    }

    #[test]
    fn test_walk_toggle_cancels_sprint() {
        let (mut controls, mut stamina, mut camera) = setup();
        controls.key_down(Key::Sprint, &stamina, &mut camera);
        controls.key_down(Key::WalkToggle, &stamina, &mut camera);
        controls.update(&mut stamina, &mut camera);
        assert!(!controls.input().sprinting);
        assert!((controls.current_speed() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_exhausted_stamina_drops_sprint() {
        let (mut controls, mut stamina, mut camera) = setup();
        controls.key_down(Key::Sprint, &stamina, &mut camera);
        stamina.tick(4.0, true);
        controls.update(&mut stamina, &mut camera);
        assert!(!controls.input().sprinting);
        assert_eq!(camera.target_fov(), 70.0);

        controls.key_up(Key::Sprint, &mut camera);
        controls.key_down(Key::Sprint, &stamina, &mut camera);
        assert!(!controls.input().sprinting, "Cannot restart sprint while exhausted");
    }

    #[test]
    fn test_low_water_drop_locks_sprint_until_recovery() {
        let (mut controls, mut stamina, mut camera) = setup();
        controls.key_down(Key::Sprint, &stamina, &mut camera);
        stamina.consume(91.0);
        controls.update(&mut stamina, &mut camera);
        assert!(!controls.input().sprinting);
        assert!(stamina.is_exhausted());

        // Above the threshold but below 30% of max: still locked.
        stamina.regenerate(5.0);
        controls.key_up(Key::Sprint, &mut camera);
        controls.key_down(Key::Sprint, &stamina, &mut camera);
        assert!(!controls.input().sprinting);

        stamina.regenerate(20.0);
        controls.key_up(Key::Sprint, &mut camera);
        controls.key_down(Key::Sprint, &stamina, &mut camera);
        assert!(controls.input().sprinting);
    }

    #[test]
    fn test_camera_toggle_key() {
        let (mut controls, stamina, mut camera) = setup();
        assert_eq!(camera.mode(), CameraMode::First);
        controls.key_down(Key::CameraToggle, &stamina, &mut camera);
        assert_eq!(camera.mode(), CameraMode::Third);
    }

    #[test]
    fn test_strafe_and_moving() {
        let mut input = InputState::default();
        assert!(!input.is_moving());
        input.press(Key::Right);
        assert!(input.is_moving());
        assert_eq!(input.strafe(), Strafe::Right);
        input.press(Key::Jump);
        input.release(Key::Right);
        assert!(!input.is_moving());
    }
}
