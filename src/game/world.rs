//! Frame driver tying the character core together.

use crossbeam_channel::{Receiver, Sender};
use rapier3d::prelude::RigidBodyHandle;
use serde::Serialize;

use crate::config::SimConfig;

use super::animation::{AnimationCoordinator, AnimationState, MotionInput};
use super::camera::{Camera, CameraMode, CameraRig, CameraTarget};
use super::commands::{SimCommand, SkinnedAsset};
use super::grounding::GroundProbe;
use super::input::{Controls, Key};
use super::jump::JumpArbiter;
use super::movement::move_character;
use super::physics::PhysicsWorld;
use super::rig::{procedural_body_spec, RigError, RigRegistry, VariantKind};
use super::stamina::{StaminaPool, StaminaReading};

/// What environment updaters may look at each frame.
pub struct EnvironmentContext<'a> {
    pub dt: f32,
    pub elapsed: f64,
    /// Active character position, if any
    pub player_position: Option<[f32; 3]>,
    pub camera: &'a Camera,
}

/// Independent per-frame subsystem (sky, terrain streaming, lighting...).
/// Updaters run in registration order but must not depend on it.
pub trait EnvironmentUpdater {
    fn update(&mut self, ctx: &EnvironmentContext<'_>);
}

/// Render stage: receives the finished frame.
pub trait FrameSink {
    fn render(&mut self, snapshot: &FrameSnapshot);
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub elapsed: f64,
    pub physics_steps: u32,
    pub active: Option<VariantKind>,
    pub position: Option<[f32; 3]>,
    pub velocity: Option<[f32; 3]>,
    pub grounded: bool,
    pub sprinting: bool,
    pub walking: bool,
    pub stamina: StaminaReading,
    pub camera_mode: CameraMode,
    pub camera_position: [f32; 3],
    pub fov: f32,
    /// Skinned state machine, only while the skinned variant is active
    pub animation: Option<AnimationState>,
}

pub struct WalkSim {
    config: SimConfig,
    physics: PhysicsWorld,
    rigs: RigRegistry,
    probe: GroundProbe,
    stamina: StaminaPool,
    jump: JumpArbiter,
    controls: Controls,
    camera: Camera,
    camera_rig: CameraRig,
    animation: AnimationCoordinator,
    environment: Vec<Box<dyn EnvironmentUpdater>>,
    sink: Option<Box<dyn FrameSink>>,
    command_sender: Sender<SimCommand>,
    command_receiver: Receiver<SimCommand>,
    /// Variant to activate as soon as it is loaded
    pending_activation: Option<VariantKind>,
    running: bool,
    accumulator: f32,
    frame: u64,
    elapsed: f64,
}

impl WalkSim {
    /// Builds the world with a ground plane and the box rig active.
    pub fn new(config: SimConfig) -> Self {
        let mut physics = PhysicsWorld::new(config.physics.gravity);
        physics.add_ground_plane();

        let mut rigs = RigRegistry::new();
        rigs.register_procedural(procedural_body_spec(), config.characters.blocky_spawn);
        if let Err(e) = rigs.activate(VariantKind::Procedural, &mut physics) {
            tracing::error!("Failed to activate the box rig: {}", e);
        }

        let pending_activation = match config.characters.initial.parse::<VariantKind>() {
            Ok(VariantKind::Procedural) => None,
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::error!("Ignoring initial character: {}", e);
                None
            }
        };

        let (command_sender, command_receiver) = crossbeam_channel::unbounded();
        let camera_rig = CameraRig::new(config.camera);

        Self {
            physics,
            rigs,
            probe: GroundProbe::new(config.jump.probe_distance),
            stamina: StaminaPool::new(config.stamina),
            jump: JumpArbiter::new(config.jump.cooldown),
            controls: Controls::new(config.movement),
            camera: Camera::new(config.camera.base_fov, 16.0 / 9.0),
            camera_rig,
            animation: AnimationCoordinator::new(config.animation),
            environment: Vec::new(),
            sink: None,
            command_sender,
            command_receiver,
            pending_activation,
            running: false,
            accumulator: 0.0,
            frame: 0,
            elapsed: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn rigs(&self) -> &RigRegistry {
        &self.rigs
    }

    pub fn stamina(&self) -> &StaminaPool {
        &self.stamina
    }

    pub fn stamina_mut(&mut self) -> &mut StaminaPool {
        &mut self.stamina
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_rig(&self) -> &CameraRig {
        &self.camera_rig
    }

    pub fn animation(&self) -> &AnimationCoordinator {
        &self.animation
    }

    pub fn is_grounded(&self) -> bool {
        self.probe.is_grounded()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Sender half of the command queue, for UI and asset loaders.
    pub fn command_sender(&self) -> Sender<SimCommand> {
        self.command_sender.clone()
    }

    pub fn queue_command(&self, command: SimCommand) {
        let _ = self.command_sender.send(command);
    }

    pub fn add_environment_updater(&mut self, updater: Box<dyn EnvironmentUpdater>) {
        self.environment.push(updater);
    }

    pub fn set_frame_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sink = Some(sink);
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            tracing::info!(frame = self.frame, "simulation started");
        }
    }

    /// Pauses the loop. Physics and animation state are kept as they are.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.accumulator = 0.0;
            tracing::info!(frame = self.frame, "simulation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn key_down(&mut self, key: Key) {
        self.controls.key_down(key, &self.stamina, &mut self.camera_rig);
    }

    pub fn key_up(&mut self, key: Key) {
        self.controls.key_up(key, &mut self.camera_rig);
    }

    /// Focus loss: every key is considered released.
    pub fn release_all_keys(&mut self) {
        self.controls.release_all(&mut self.camera_rig);
    }

    pub fn mouse_move(&mut self, dx: f32, dy: f32) {
        self.camera_rig.on_mouse_move(dx, dy, &mut self.camera);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.camera_rig.on_wheel(delta_y);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.set_aspect(width, height);
    }

    /// Runs one display frame. Returns `None` while stopped.
    pub fn frame(&mut self, wall_dt: f32) -> Option<FrameSnapshot> {
        if !self.running {
            return None;
        }
        let dt = if wall_dt.is_finite() {
            wall_dt.clamp(0.0, self.config.physics.max_frame_delta)
        } else {
            0.0
        };

        let physics_steps = self.step_physics(dt);
        self.elapsed += dt as f64;

        self.drain_commands();
        self.controls.update(&mut self.stamina, &mut self.camera_rig);
        self.update_camera(dt);

        let active = self.resolve_active();
        if let Some(active) = active {
            self.apply_motion(active.0, dt);
            self.animate(dt);
        }

        let player_position = active.map(|a| a.1);
        let ctx = EnvironmentContext {
            dt,
            elapsed: self.elapsed,
            player_position,
            camera: &self.camera,
        };
        for updater in &mut self.environment {
            updater.update(&ctx);
        }

        self.frame += 1;
        let snapshot = self.snapshot(physics_steps);
        if let Some(sink) = self.sink.as_mut() {
            sink.render(&snapshot);
        }
        Some(snapshot)
    }

    /// Fixed sub-steps from the accumulator. Whatever is left once the cap is hit is dropped.
    fn step_physics(&mut self, dt: f32) -> u32 {
        let timestep = self.config.physics.timestep;
        if timestep <= 0.0 {
            return 0;
        }
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= timestep && steps < self.config.physics.max_substeps {
            self.physics.step(timestep);
            self.accumulator -= timestep;
            steps += 1;
        }
        if steps == self.config.physics.max_substeps && self.accumulator > 0.0 {
            tracing::debug!(dropped = self.accumulator, "physics sub-step cap reached");
            self.accumulator = 0.0;
        }
        steps
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_receiver.try_recv() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::SwitchCharacter { variant } => {
                // An explicit switch supersedes the configured initial character.
                self.pending_activation = None;
                match self.rigs.activate_named(&variant, &mut self.physics) {
                    Ok(true) => self.probe.clear(),
                    Ok(false) => {}
                    Err(e @ RigError::NotLoaded(_)) => {
                        tracing::warn!("Character switch ignored: {}", e);
                    }
                    Err(e) => tracing::error!("Character switch failed: {}", e),
                }
            }
            SimCommand::SetTankControl { enabled } => {
                self.controls.set_tank_control(enabled, &mut self.camera_rig);
            }
            SimCommand::ResetStamina => self.stamina.reset(),
            SimCommand::SkinnedAssetLoaded(asset) => self.load_skinned(asset),
        }
    }

    fn load_skinned(&mut self, asset: SkinnedAsset) {
        self.rigs.register_skinned(asset, &mut self.physics);
        self.animation.reset_skinned();
        if self.pending_activation == Some(VariantKind::Skinned) {
            self.pending_activation = None;
            match self.rigs.activate(VariantKind::Skinned, &mut self.physics) {
                Ok(_) => self.probe.clear(),
                Err(e) => tracing::error!("Failed to activate initial character: {}", e),
            }
        }
    }

    fn update_camera(&mut self, dt: f32) {
        let tank_control = self.controls.input().tank_control;
        let Some(kind) = self.rigs.active_kind() else {
            self.camera_rig.update_fov(&mut self.camera, dt);
            return;
        };
        let body_position = self
            .rigs
            .body(kind)
            .and_then(|h| self.physics.translation(h));
        let Some(variant) = self.rigs.variant_mut(kind) else {
            return;
        };
        let body_position = body_position.unwrap_or(variant.visual().position);
        self.camera_rig.update(
            &mut self.camera,
            CameraTarget {
                body_position,
                visual: variant.visual_mut(),
                kind,
                tank_control,
            },
            dt,
        );
    }

    /// Syncs the active visual and probes the ground. Returns the body handle and position.
    fn resolve_active(&mut self) -> Option<(RigidBodyHandle, [f32; 3])> {
        let Some(active) = self.rigs.active() else {
            self.probe.clear();
            return None;
        };
        if let Err(e) = self.rigs.sync_visual(&self.physics) {
            tracing::error!("Skipping character update: {}", e);
            self.probe.clear();
            return None;
        }
        self.probe.probe(&self.physics, active.body);
        let position = self.physics.translation(active.body)?;
        Some((active.body, position))
    }

    fn apply_motion(&mut self, body: RigidBodyHandle, dt: f32) {
        let input = self.controls.input();
        self.stamina.tick(dt, input.sprinting);
        if input.tank_control {
            return;
        }
        let grounded = self.probe.is_grounded();
        move_character(
            &mut self.physics,
            body,
            input,
            self.camera.forward(),
            self.controls.current_speed(),
            dt,
            grounded,
            self.controls.movement_config(),
        );
        if input.is_pressed(Key::Jump) {
            self.jump.jump(
                self.elapsed,
                grounded,
                &mut self.stamina,
                &mut self.physics,
                body,
                self.config.jump.velocity,
            );
        }
    }

    fn animate(&mut self, dt: f32) {
        let input = self.controls.input();
        let motion = MotionInput {
            dt,
            elapsed: self.elapsed as f32,
            grounded: self.probe.is_grounded(),
            moving: input.is_moving(),
            sprinting: input.sprinting,
            strafe: input.strafe(),
        };
        if let Some(variant) = self.rigs.active_variant_mut() {
            self.animation.update(variant, &motion);
        }
    }

    fn snapshot(&self, physics_steps: u32) -> FrameSnapshot {
        let active = self.rigs.active();
        let body = active.map(|a| a.body);
        let input = self.controls.input();
        FrameSnapshot {
            frame: self.frame,
            elapsed: self.elapsed,
            physics_steps,
            active: active.map(|a| a.kind),
            position: body.and_then(|h| self.physics.translation(h)),
            velocity: body.and_then(|h| self.physics.linvel(h)),
            grounded: self.probe.is_grounded(),
            sprinting: input.sprinting,
            walking: input.walking,
            stamina: self.stamina.reading(),
            camera_mode: self.camera_rig.mode(),
            camera_position: self.camera.position,
            fov: self.camera.fov,
            animation: match active.map(|a| a.kind) {
                Some(VariantKind::Skinned) => Some(self.animation.skinned_state()),
                _ => None,
            },
        }
    }
}

impl Default for WalkSim {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
