//! First/third person camera rig.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use super::constants::camera as consts;
use super::rig::{SceneNode, VariantKind};

/// Perspective camera. Yaw 0 looks down -Z; positive pitch looks up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new(fov: f32, aspect: f32) -> Self {
        Self {
            position: [0.0; 3],
            yaw: 0.0,
            pitch: 0.0,
            fov,
            aspect,
        }
    }

    /// Unit view direction in world space.
    pub fn forward(&self) -> [f32; 3] {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        [-sy * cp, sp, -cy * cp]
    }

    /// Orients the camera toward `target`. A zero-length direction leaves it unchanged.
    pub fn look_at(&mut self, target: [f32; 3]) {
        let d = [
            target[0] - self.position[0],
            target[1] - self.position[1],
            target[2] - self.position[2],
        ];
        let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        if len < 1.0e-6 {
            return;
        }
        self.yaw = (-d[0]).atan2(-d[2]);
        self.pitch = (d[1] / len).clamp(-1.0, 1.0).asin();
    }

    /// Resize hook.
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    First,
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    pub base_fov: f32,
    pub sprint_fov: f32,
    /// Degrees per second
    pub fov_change_speed: f32,
    pub pivot_height: f32,
    pub orbit_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_speed: f32,
    pub rotation_speed: f32,
    pub yaw_follow: f32,
    pub blocky_head_height: f32,
    pub skinned_head_height: f32,
    pub skinned_forward_offset: f32,
    pub tank_head_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_fov: consts::BASE_FOV,
            sprint_fov: consts::SPRINT_FOV,
            fov_change_speed: consts::FOV_CHANGE_SPEED,
            pivot_height: consts::PIVOT_HEIGHT,
            orbit_distance: consts::ORBIT_DISTANCE,
            min_distance: consts::ORBIT_MIN_DISTANCE,
            max_distance: consts::ORBIT_MAX_DISTANCE,
            zoom_speed: consts::ZOOM_SPEED,
            rotation_speed: consts::ROTATION_SPEED,
            yaw_follow: consts::YAW_FOLLOW,
            blocky_head_height: consts::BLOCKY_HEAD_HEIGHT,
            skinned_head_height: consts::SKINNED_HEAD_HEIGHT,
            skinned_forward_offset: consts::SKINNED_FORWARD_OFFSET,
            tank_head_height: consts::TANK_HEAD_HEIGHT,
        }
    }
}

/// Orbit coordinates around the third-person pivot (three.js convention:
/// `phi` is the polar angle from +Y, `theta` the azimuth around Y from +Z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn to_offset(&self) -> [f32; 3] {
        let s = self.phi.sin() * self.radius;
        [s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos()]
    }
}

/// What the rig follows this frame.
pub struct CameraTarget<'a> {
    pub body_position: [f32; 3],
    pub visual: &'a mut SceneNode,
    pub kind: VariantKind,
    pub tank_control: bool,
}

pub struct CameraRig {
    config: CameraConfig,
    mode: CameraMode,
    spherical: Spherical,
    target_fov: f32,
}

const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            spherical: Spherical {
                radius: config.orbit_distance,
                phi: PI / 2.5,
                theta: PI / 8.0,
            },
            target_fov: config.base_fov,
            mode: CameraMode::First,
            config,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::First => CameraMode::Third,
            CameraMode::Third => CameraMode::First,
        };
        tracing::info!(mode = ?self.mode, "camera mode switched");
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    pub fn target_fov(&self) -> f32 {
        self.target_fov
    }

    pub fn set_sprint_fov(&mut self, sprinting: bool) {
        self.target_fov = if sprinting {
            self.config.sprint_fov
        } else {
            self.config.base_fov
        };
    }

    /// Mouse motion in pixels. Looks around in first person, orbits in third.
    pub fn on_mouse_move(&mut self, dx: f32, dy: f32, camera: &mut Camera) {
        let rs = self.config.rotation_speed;
        match self.mode {
            CameraMode::First => {
                camera.yaw = wrap_angle(camera.yaw - dx * rs);
                camera.pitch = (camera.pitch - dy * rs).clamp(-MAX_PITCH, MAX_PITCH);
            }
            CameraMode::Third => {
                self.spherical.theta -= dx * rs;
                self.spherical.phi = (self.spherical.phi - dy * rs)
                    .clamp(consts::POLAR_MARGIN, PI - consts::POLAR_MARGIN);
            }
        }
    }

    /// Scroll wheel zoom, third person only.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if self.mode == CameraMode::Third {
            self.spherical.radius = (self.spherical.radius + delta_y * 0.01 * self.config.zoom_speed)
                .clamp(self.config.min_distance, self.config.max_distance);
        }
    }

    /// Moves the FOV toward its target at a fixed rate without overshooting.
    pub fn update_fov(&self, camera: &mut Camera, dt: f32) {
        let diff = self.target_fov - camera.fov;
        let step = self.config.fov_change_speed * dt.max(0.0);
        if diff.abs() <= step {
            camera.fov = self.target_fov;
        } else {
            camera.fov += step.copysign(diff);
        }
    }

    pub fn update(&mut self, camera: &mut Camera, target: CameraTarget<'_>, dt: f32) {
        self.update_fov(camera, dt);

        match self.mode {
            CameraMode::First => {
                let forward = camera.forward();
                if !target.tank_control {
                    let desired = forward[0].atan2(forward[2]);
                    self.ease_yaw(target.visual, desired);
                }
                let (head, ahead) = self.head_offsets(target.kind, target.tank_control);
                let p = target.body_position;
                camera.position = [
                    p[0] + forward[0] * ahead,
                    p[1] + head + forward[1] * ahead,
                    p[2] + forward[2] * ahead,
                ];
            }
            CameraMode::Third => {
                self.spherical.radius = self
                    .spherical
                    .radius
                    .clamp(self.config.min_distance, self.config.max_distance);
                let base = target.visual.position;
                let pivot = [base[0], base[1] + self.config.pivot_height, base[2]];
                let offset = self.spherical.to_offset();
                camera.position = [pivot[0] + offset[0], pivot[1] + offset[1], pivot[2] + offset[2]];
                camera.look_at(pivot);
                if !target.tank_control {
                    let desired = self.spherical.theta + PI;
                    self.ease_yaw(target.visual, desired);
                }
            }
        }
    }

    /// (head height, forward offset) for the followed character.
    pub fn head_offsets(&self, kind: VariantKind, tank_control: bool) -> (f32, f32) {
        if tank_control {
            return (self.config.tank_head_height, 0.0);
        }
        match kind {
            VariantKind::Procedural => (self.config.blocky_head_height, 0.0),
            VariantKind::Skinned => (
                self.config.skinned_head_height,
                self.config.skinned_forward_offset,
            ),
        }
    }

    fn ease_yaw(&self, visual: &mut SceneNode, desired: f32) {
        let delta = wrap_angle(desired - visual.yaw);
        visual.yaw = wrap_angle(visual.yaw + delta * self.config.yaw_follow);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

/// Wraps an angle into [-PI, PI).
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
