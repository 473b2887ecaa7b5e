use serde::{Deserialize, Serialize};

use super::constants::character as consts;
use super::physics::BodySpec;
use super::rig::skinned_body_spec;

/// Requests from UI or loaders, drained at the start of every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SimCommand {
    /// Variant names are parsed when the command is applied, so a bad name
    /// is reported there instead of at the sender.
    SwitchCharacter { variant: String },
    SetTankControl { enabled: bool },
    ResetStamina,
    SkinnedAssetLoaded(SkinnedAsset),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name: String,
    /// Seconds
    pub duration: f32,
}

impl ClipInfo {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Everything the registry needs once a skinned character finished loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinnedAsset {
    /// Name of the loaded scene root
    pub visual_root: String,
    pub clips: Vec<ClipInfo>,
    pub body: BodySpec,
    /// Bottom centre of the body
    pub spawn: [f32; 3],
}

impl SkinnedAsset {
    /// Asset with the default body and spawn point.
    pub fn with_clips(visual_root: impl Into<String>, clips: Vec<ClipInfo>) -> Self {
        Self {
            visual_root: visual_root.into(),
            clips,
            body: skinned_body_spec(),
            spawn: consts::SKINNED_SPAWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_shape() {
        let cmd: SimCommand =
            serde_json::from_str(r#"{"command":"switch_character","variant":"MilkAnimated"}"#).unwrap();
        assert!(matches!(cmd, SimCommand::SwitchCharacter { ref variant } if variant == "MilkAnimated"));

        let json = serde_json::to_string(&SimCommand::ResetStamina).unwrap();
        assert_eq!(json, r#"{"command":"reset_stamina"}"#);
    }

    #[test]
    fn test_asset_command_carries_clips() {
        let asset = SkinnedAsset::with_clips("Milk", vec![ClipInfo::new("Idle", 1.5)]);
        let json = serde_json::to_string(&SimCommand::SkinnedAssetLoaded(asset.clone())).unwrap();
        match serde_json::from_str::<SimCommand>(&json).unwrap() {
            SimCommand::SkinnedAssetLoaded(parsed) => assert_eq!(parsed, asset),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
