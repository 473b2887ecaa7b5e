use serde::Serialize;

/// Locomotion state of the skinned character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    #[default]
    Idle,
    Walk,
    Run,
    Jump,
}

impl AnimationState {
    /// State the character should be in, regardless of the current one.
    pub fn target(grounded: bool, moving: bool, sprinting: bool) -> Self {
        if !grounded {
            AnimationState::Jump
        } else if moving && sprinting {
            AnimationState::Run
        } else if moving {
            AnimationState::Walk
        } else {
            AnimationState::Idle
        }
    }

    /// Next state, or `None` when no transition is needed.
    pub fn transition(self, grounded: bool, moving: bool, sprinting: bool) -> Option<Self> {
        let next = Self::target(grounded, moving, sprinting);
        (next != self).then_some(next)
    }

    pub fn clip_name(self) -> &'static str {
        match self {
            AnimationState::Idle => "idle",
            AnimationState::Walk => "walk",
            AnimationState::Run => "run",
            AnimationState::Jump => "jump",
        }
    }
}

/// Picks the clip to play for `target`.
///
/// Exact name, then case-insensitive, then anything containing "idle", then
/// the first clip. `None` only when there are no clips at all.
pub fn resolve_clip<'a>(names: impl IntoIterator<Item = &'a str>, target: &str) -> Option<usize> {
    let names: Vec<&str> = names.into_iter().collect();
    names
        .iter()
        .position(|n| *n == target)
        .or_else(|| names.iter().position(|n| n.eq_ignore_ascii_case(target)))
        .or_else(|| names.iter().position(|n| n.to_ascii_lowercase().contains("idle")))
        .or_else(|| (!names.is_empty()).then_some(0))
}
