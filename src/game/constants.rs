//! Simulation and tuning constants.
//! Centralizing these keeps config defaults and tests in agreement.

/// Physics constants
pub mod physics {
    /// Default gravity in m/s² (downward)
    pub const DEFAULT_GRAVITY: f32 = 9.82;

    /// Fixed timestep for physics simulation (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// Max physics sub-steps per rendered frame
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Wall-clock delta is clamped to this before use (tab stalls etc.)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Surface friction for character bodies
    pub const CHARACTER_FRICTION: f32 = 0.01;

    /// Surface restitution for character bodies
    pub const CHARACTER_RESTITUTION: f32 = 0.1;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;
}

/// Character body layouts
pub mod character {
    /// Blocky body half extents
    pub const BLOCKY_HALF_EXTENTS: [f32; 3] = [0.24, 0.3, 0.24];
    pub const BLOCKY_MASS: f32 = 70.0;
    pub const BLOCKY_LINEAR_DAMPING: f32 = 0.5;
    pub const BLOCKY_SPAWN: [f32; 3] = [0.0, 3.0, 16.0];

    /// Skinned body full size (width, height, depth)
    pub const SKINNED_SIZE: [f32; 3] = [0.6, 0.5, 0.6];
    pub const SKINNED_MASS: f32 = 70.0;
    pub const SKINNED_LINEAR_DAMPING: f32 = 0.2;
    /// Bottom-centre spawn point; the body centre sits half a height above it.
    pub const SKINNED_SPAWN: [f32; 3] = [2.0, 3.0, 15.0];
}

/// Stamina defaults
pub mod stamina {
    pub const MAX: f32 = 100.0;
    pub const DEPLETION_RATE: f32 = 25.0;
    pub const REGEN_RATE: f32 = 15.0;
    pub const JUMP_COST: f32 = 10.0;
    /// Low-water mark below which sprinting is refused
    pub const SPRINT_THRESHOLD: f32 = 10.0;
    /// After exhaustion, sprint unlocks only above this fraction of max
    pub const RECOVERY_FRACTION: f32 = 0.3;
    /// Minimum seconds between applied stamina ticks
    pub const MIN_UPDATE_INTERVAL: f32 = 0.1;
}

/// Movement tuning
pub mod movement {
    pub const BASE_SPEED: f32 = 6.0;
    pub const SPRINT_MULTIPLIER: f32 = 1.8;
    pub const WALK_MULTIPLIER: f32 = 0.5;
    /// Weight of the target velocity per grounded frame
    pub const GROUND_BLEND: f32 = 0.9;
    pub const AIR_ACCELERATION: f32 = 2.0;
    pub const GROUND_DECELERATION: f32 = 5.0;
    pub const AIR_DECELERATION: f32 = 1.0;
}

/// Jump and grounding
pub mod jump {
    pub const VELOCITY: f32 = 6.0;
    pub const COOLDOWN_SECS: f32 = 0.3;
    /// Downward probe length measured from the body centre
    pub const GROUND_PROBE_DISTANCE: f32 = 0.35;
}

/// Camera rig
pub mod camera {
    pub const BASE_FOV: f32 = 70.0;
    pub const SPRINT_FOV: f32 = 80.0;
    /// Degrees per second
    pub const FOV_CHANGE_SPEED: f32 = 20.0;
    pub const PIVOT_HEIGHT: f32 = 1.44;
    pub const ORBIT_DISTANCE: f32 = 4.0;
    pub const ORBIT_MIN_DISTANCE: f32 = 1.5;
    pub const ORBIT_MAX_DISTANCE: f32 = 100.0;
    pub const ZOOM_SPEED: f32 = 2.0;
    /// Radians per pixel of mouse motion
    pub const ROTATION_SPEED: f32 = 0.002;
    pub const POLAR_MARGIN: f32 = 0.1;
    pub const YAW_FOLLOW: f32 = 0.2;
    pub const BLOCKY_HEAD_HEIGHT: f32 = 1.44;
    pub const SKINNED_HEAD_HEIGHT: f32 = 1.8;
    pub const SKINNED_FORWARD_OFFSET: f32 = 0.5;
    pub const TANK_HEAD_HEIGHT: f32 = 2.5;
}

/// Animation tuning
pub mod animation {
    pub const CROSS_FADE_SECS: f32 = 0.3;
    pub const SWING_AMPLITUDE: f32 = 0.8;
    /// Radians per second (0.06 rad per 60 Hz frame)
    pub const WALK_SWING_SPEED: f32 = 3.6;
    pub const SPRINT_SWING_SPEED: f32 = 6.0;
    pub const WALK_BOB: f32 = 0.01;
    pub const SPRINT_BOB: f32 = 0.02;
    pub const BOB_FREQUENCY: f32 = 10.0;
    pub const STRAFE_LEAN: f32 = std::f32::consts::PI / 16.0;
    /// Per-frame interpolation factor toward rest/lean targets
    pub const EASE: f32 = 0.1;
}
