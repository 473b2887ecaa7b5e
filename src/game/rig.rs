//! Character variants and the registry that keeps exactly one of them simulated.

use std::fmt;
use std::str::FromStr;

use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use super::animation::action::ActionMixer;
use super::commands::SkinnedAsset;
use super::constants::character as consts;
use super::physics::{BodySpec, BodyState, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    /// Box rig animated procedurally ("Blocky")
    #[serde(rename = "Blocky")]
    Procedural,
    /// Skinned mesh driven by clips ("MilkAnimated")
    #[serde(rename = "MilkAnimated")]
    Skinned,
}

impl VariantKind {
    pub const ALL: [VariantKind; 2] = [VariantKind::Procedural, VariantKind::Skinned];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Procedural => "Blocky",
            VariantKind::Skinned => "MilkAnimated",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blocky" | "procedural" => Ok(VariantKind::Procedural),
            "milkanimated" | "milk" | "skinned" => Ok(VariantKind::Skinned),
            _ => Err(RigError::UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("unknown character variant '{0}'")]
    UnknownVariant(String),
    #[error("character variant {0} is not loaded yet")]
    NotLoaded(VariantKind),
    #[error("character variant {0} has no physics body")]
    MissingBody(VariantKind),
}

/// Local transform of a rig part relative to its parent. Rotation is XYZ euler radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LocalTransform {
    pub translation: [f32; 3],
    pub rotation: [f32; 3],
}

impl LocalTransform {
    pub fn at(translation: [f32; 3]) -> Self {
        Self {
            translation,
            rotation: [0.0; 3],
        }
    }
}

/// Root of a character's visual, mirrored from its physics body once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneNode {
    pub position: [f32; 3],
    /// Heading around +Y. Driven by the camera rig, not by physics.
    pub yaw: f32,
    pub visible: bool,
}

impl SceneNode {
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            yaw: 0.0,
            visible: false,
        }
    }
}

/// Pivots of the box rig. Rest offsets are relative to the body container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProceduralParts {
    pub head: LocalTransform,
    pub body_container: LocalTransform,
    pub left_arm: LocalTransform,
    pub right_arm: LocalTransform,
    pub left_thigh: LocalTransform,
    pub right_thigh: LocalTransform,
}

impl Default for ProceduralParts {
    fn default() -> Self {
        Self {
            head: LocalTransform::at([0.0, 1.44, 0.0]),
            body_container: LocalTransform::default(),
            left_arm: LocalTransform::at([-0.3, 1.18, 0.0]),
            right_arm: LocalTransform::at([0.3, 1.18, 0.0]),
            left_thigh: LocalTransform::at([-0.12, 0.48, 0.0]),
            right_thigh: LocalTransform::at([0.12, 0.48, 0.0]),
        }
    }
}

/// A character body that may or may not currently be part of the simulation.
#[derive(Debug, Clone, Copy)]
pub struct CharacterBody {
    pub spec: BodySpec,
    handle: Option<RigidBodyHandle>,
    /// Last known state while detached
    parked: BodyState,
}

impl CharacterBody {
    pub fn detached(spec: BodySpec, state: BodyState) -> Self {
        Self {
            spec,
            handle: None,
            parked: state,
        }
    }

    pub fn handle(&self) -> Option<RigidBodyHandle> {
        self.handle
    }

    pub fn parked_state(&self) -> BodyState {
        self.parked
    }

    /// Current state, read from the simulation when the body is in it.
    pub fn state(&self, physics: &PhysicsWorld) -> BodyState {
        self.handle
            .and_then(|h| physics.body_state(h))
            .unwrap_or(self.parked)
    }

    fn attach(&mut self, physics: &mut PhysicsWorld, state: BodyState) -> RigidBodyHandle {
        if let Some(old) = self.handle.take() {
            physics.remove_character_body(old);
        }
        let handle = physics.insert_character_body(&self.spec, state);
        self.handle = Some(handle);
        handle
    }

    fn detach(&mut self, physics: &mut PhysicsWorld) {
        if let Some(h) = self.handle.take() {
            if let Some(state) = physics.remove_character_body(h) {
                self.parked = state;
            }
        }
    }
}

/// Per-variant data. Each arm carries only what its animation strategy needs.
pub enum CharacterVariant {
    Procedural {
        visual: SceneNode,
        body: CharacterBody,
        parts: ProceduralParts,
    },
    Skinned {
        visual: SceneNode,
        body: CharacterBody,
        mixer: ActionMixer,
    },
}

impl CharacterVariant {
    pub fn kind(&self) -> VariantKind {
        match self {
            CharacterVariant::Procedural { .. } => VariantKind::Procedural,
            CharacterVariant::Skinned { .. } => VariantKind::Skinned,
        }
    }

    pub fn visual(&self) -> &SceneNode {
        match self {
            CharacterVariant::Procedural { visual, .. } | CharacterVariant::Skinned { visual, .. } => visual,
        }
    }

    pub fn visual_mut(&mut self) -> &mut SceneNode {
        match self {
            CharacterVariant::Procedural { visual, .. } | CharacterVariant::Skinned { visual, .. } => visual,
        }
    }

    pub fn body(&self) -> &CharacterBody {
        match self {
            CharacterVariant::Procedural { body, .. } | CharacterVariant::Skinned { body, .. } => body,
        }
    }

    fn body_mut(&mut self) -> &mut CharacterBody {
        match self {
            CharacterVariant::Procedural { body, .. } | CharacterVariant::Skinned { body, .. } => body,
        }
    }
}

/// Read-only view of the active variant. Obtain a fresh one every frame.
#[derive(Debug, Clone, Copy)]
pub struct ActiveRig {
    pub kind: VariantKind,
    pub body: RigidBodyHandle,
    pub visual: SceneNode,
}

/// Owns every character variant and the "active" pointer.
#[derive(Default)]
pub struct RigRegistry {
    procedural: Option<CharacterVariant>,
    skinned: Option<CharacterVariant>,
    active: Option<VariantKind>,
}

impl RigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the box rig, detached, at `spawn` (body centre).
    pub fn register_procedural(&mut self, spec: BodySpec, spawn: [f32; 3]) {
        self.procedural = Some(CharacterVariant::Procedural {
            visual: SceneNode::new(spawn),
            body: CharacterBody::detached(spec, BodyState::at(spawn)),
            parts: ProceduralParts::default(),
        });
        tracing::debug!(?spawn, "registered procedural character");
    }

    /// Registers a freshly loaded skinned character. Its body stays out of the
    /// simulation until activated. Reloading while it is active keeps its pose.
    pub fn register_skinned(&mut self, asset: SkinnedAsset, physics: &mut PhysicsWorld) {
        let half_height = asset.body.half_extents[1];
        let spawn = [asset.spawn[0], asset.spawn[1] + half_height, asset.spawn[2]];
        let mut body = CharacterBody::detached(asset.body, BodyState::at(spawn));
        let mut visual = SceneNode::new(spawn);

        if let Some(mut previous) = self.skinned.take() {
            if self.active == Some(VariantKind::Skinned) {
                let state = previous.body().state(physics);
                previous.body_mut().detach(physics);
                body.attach(physics, state.at_rest());
                visual.position = state.translation;
                visual.yaw = previous.visual().yaw;
                visual.visible = true;
            }
        }

        let mixer = ActionMixer::from_clips(&asset.clips);
        tracing::info!(
            clips = mixer.len(),
            visual_root = %asset.visual_root,
            "skinned character loaded"
        );
        self.skinned = Some(CharacterVariant::Skinned { visual, body, mixer });
    }

    pub fn is_loaded(&self, kind: VariantKind) -> bool {
        self.variant(kind).is_some()
    }

    pub fn variant(&self, kind: VariantKind) -> Option<&CharacterVariant> {
        match kind {
            VariantKind::Procedural => self.procedural.as_ref(),
            VariantKind::Skinned => self.skinned.as_ref(),
        }
    }

    pub fn variant_mut(&mut self, kind: VariantKind) -> Option<&mut CharacterVariant> {
        match kind {
            VariantKind::Procedural => self.procedural.as_mut(),
            VariantKind::Skinned => self.skinned.as_mut(),
        }
    }

    pub fn active_kind(&self) -> Option<VariantKind> {
        self.active
    }

    pub fn active(&self) -> Option<ActiveRig> {
        let kind = self.active?;
        let variant = self.variant(kind)?;
        Some(ActiveRig {
            kind,
            body: variant.body().handle()?,
            visual: *variant.visual(),
        })
    }

    pub fn active_variant_mut(&mut self) -> Option<&mut CharacterVariant> {
        let kind = self.active?;
        self.variant_mut(kind)
    }

    /// Handle of the variant's body while it is in the simulation.
    pub fn body(&self, kind: VariantKind) -> Option<RigidBodyHandle> {
        self.variant(kind).and_then(|v| v.body().handle())
    }

    /// Makes `kind` the active variant, transferring pose from the outgoing body.
    ///
    /// Returns `Ok(false)` when `kind` is already active. An unloaded variant is
    /// an error and leaves every body where it was.
    pub fn activate(&mut self, kind: VariantKind, physics: &mut PhysicsWorld) -> Result<bool, RigError> {
        if !self.is_loaded(kind) {
            return Err(RigError::NotLoaded(kind));
        }
        if self.active == Some(kind) {
            return Ok(false);
        }

        let outgoing = self
            .active
            .and_then(|k| self.variant(k).map(|v| (k, v.body().state(physics), v.visual().yaw)));

        let incoming = self
            .variant_mut(kind)
            .ok_or(RigError::NotLoaded(kind))?;
        let (state, yaw) = match outgoing {
            Some((_, from, yaw)) => (from.at_rest(), yaw),
            None => (incoming.body().parked_state().at_rest(), incoming.visual().yaw),
        };

        // Add the incoming body first, then remove the outgoing one.
        incoming.body_mut().attach(physics, state);
        let visual = incoming.visual_mut();
        visual.position = state.translation;
        visual.yaw = yaw;
        visual.visible = true;

        if let Some((from, _, _)) = outgoing {
            if let Some(previous) = self.variant_mut(from) {
                previous.body_mut().detach(physics);
                previous.visual_mut().visible = false;
            }
        }

        self.active = Some(kind);
        tracing::info!(
            from = ?outgoing.map(|(k, _, _)| k.as_str()),
            to = kind.as_str(),
            position = ?state.translation,
            "active character switched"
        );
        Ok(true)
    }

    /// Parses a variant name and activates it.
    pub fn activate_named(&mut self, name: &str, physics: &mut PhysicsWorld) -> Result<bool, RigError> {
        let kind: VariantKind = name.parse()?;
        self.activate(kind, physics)
    }

    /// Copies the active body's position into its visual root.
    pub fn sync_visual(&mut self, physics: &PhysicsWorld) -> Result<(), RigError> {
        let Some(kind) = self.active else {
            return Ok(());
        };
        let variant = self.variant_mut(kind).ok_or(RigError::NotLoaded(kind))?;
        let handle = variant.body().handle().ok_or(RigError::MissingBody(kind))?;
        let translation = physics
            .translation(handle)
            .ok_or(RigError::MissingBody(kind))?;
        variant.visual_mut().position = translation;
        Ok(())
    }

    /// Number of registered character bodies currently in the simulation.
    pub fn simulated_bodies(&self, physics: &PhysicsWorld) -> usize {
        VariantKind::ALL
            .iter()
            .filter_map(|&k| self.body(k))
            .filter(|&h| physics.contains(h))
            .count()
    }
}

/// Default box rig body.
pub fn procedural_body_spec() -> BodySpec {
    BodySpec {
        half_extents: consts::BLOCKY_HALF_EXTENTS,
        mass: consts::BLOCKY_MASS,
        linear_damping: consts::BLOCKY_LINEAR_DAMPING,
    }
}

/// Default skinned character body.
pub fn skinned_body_spec() -> BodySpec {
    BodySpec::from_size(
        consts::SKINNED_SIZE,
        consts::SKINNED_MASS,
        consts::SKINNED_LINEAR_DAMPING,
    )
}
