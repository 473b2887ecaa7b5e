pub mod animation;
pub mod camera;
pub mod commands;
pub mod constants;
pub mod grounding;
pub mod input;
pub mod jump;
pub mod movement;
pub mod physics;
pub mod rig;
pub mod stamina;
pub mod world;

pub use commands::{ClipInfo, SimCommand, SkinnedAsset};
pub use rig::{RigError, VariantKind};
pub use world::{EnvironmentContext, EnvironmentUpdater, FrameSink, FrameSnapshot, WalkSim};
