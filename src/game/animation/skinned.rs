use super::action::ActionMixer;
use super::state::{resolve_clip, AnimationState};
use super::MotionInput;

/// Clip cross-fade state machine for the skinned character.
#[derive(Debug, Clone)]
pub struct SkinnedAnimator {
    state: AnimationState,
    /// Index into the mixer of the action currently faded in
    current: Option<usize>,
    cross_fade: f32,
    reported_empty: bool,
}

impl SkinnedAnimator {
    pub fn new(cross_fade: f32) -> Self {
        Self {
            state: AnimationState::Idle,
            current: None,
            cross_fade,
            reported_empty: false,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Forgets the current action, e.g. after a new clip set was loaded.
    pub fn reset(&mut self) {
        self.state = AnimationState::Idle;
        self.current = None;
        self.reported_empty = false;
    }

    pub fn update(&mut self, mixer: &mut ActionMixer, motion: &MotionInput) {
        if mixer.is_empty() {
            if !self.reported_empty {
                tracing::error!("skinned character has no animation clips");
                self.reported_empty = true;
            }
            return;
        }

        if self.current.map_or(true, |i| i >= mixer.len()) {
            self.current = resolve_clip(mixer.names(), AnimationState::Idle.clip_name());
        }

        if let Some(next) = self.state.transition(motion.grounded, motion.moving, motion.sprinting) {
            let target = resolve_clip(mixer.names(), next.clip_name());
            if target.is_some() && target != self.current {
                if let Some(prev) = self.current.and_then(|i| mixer.get_mut(i)) {
                    prev.fade_out(self.cross_fade);
                }
                if let Some(action) = target.and_then(|i| mixer.get_mut(i)) {
                    action
                        .reset()
                        .set_effective_time_scale(1.0)
                        .set_effective_weight(1.0)
                        .fade_in(self.cross_fade)
                        .play();
                    tracing::debug!(from = ?self.state, to = ?next, clip = %action.name, "animation transition");
                }
                self.current = target;
            }
            self.state = next;
        }

        // Never leave the character frozen after a swap or a finished once-clip.
        if let Some(action) = self.current.and_then(|i| mixer.get_mut(i)) {
            if !action.is_running() {
                action.reset().fade_in(self.cross_fade).play();
            }
        }

        mixer.tick(motion.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::commands::ClipInfo;
    use crate::game::input::Strafe;

    fn motion(grounded: bool, moving: bool, sprinting: bool) -> MotionInput {
        MotionInput {
            dt: 1.0 / 60.0,
            elapsed: 0.0,
            grounded,
            moving,
            sprinting,
            strafe: Strafe::None,
        }
    }

    fn mixer(names: &[&str]) -> ActionMixer {
        let clips: Vec<ClipInfo> = names.iter().map(|n| ClipInfo::new(*n, 1.0)).collect();
        ActionMixer::from_clips(&clips)
    }

    #[test]
    fn test_first_update_plays_idle() {
        let mut m = mixer(&["Walk", "Idle", "Run"]);
        let mut anim = SkinnedAnimator::new(0.3);
        anim.update(&mut m, &motion(true, false, false));
        assert_eq!(anim.current(), Some(1));
        assert!(m.get(1).unwrap().is_running());
        assert!(!m.get(0).unwrap().is_running());
    }

    #[test]
    fn test_walk_cross_fades() {
        let mut m = mixer(&["idle", "walk", "run", "jump"]);
        let mut anim = SkinnedAnimator::new(0.3);
        anim.update(&mut m, &motion(true, false, false));
        anim.update(&mut m, &motion(true, true, false));
        assert_eq!(anim.state(), AnimationState::Walk);
        assert_eq!(anim.current(), Some(1));
        assert!(m.get(0).unwrap().is_fading());
        assert!(m.get(1).unwrap().is_fading());

        for _ in 0..30 {
            anim.update(&mut m, &motion(true, true, false));
        }
        assert!(!m.get(0).unwrap().is_running());
        assert_eq!(m.get(1).unwrap().weight(), 1.0);
    }

    #[test]
    fn test_missing_clip_falls_back_to_idle() {
        let mut m = mixer(&["Armature|IdleLoop", "Walk"]);
        let mut anim = SkinnedAnimator::new(0.3);
        anim.update(&mut m, &motion(true, true, true));
        assert_eq!(anim.state(), AnimationState::Run);
        assert_eq!(anim.current(), Some(0));
        assert!(m.get(0).unwrap().is_running());
    }

    #[test]
    fn test_finished_jump_restarts() {
        let mut m = mixer(&["idle", "jump"]);
        let mut anim = SkinnedAnimator::new(0.3);
        anim.update(&mut m, &motion(false, false, false));
        assert_eq!(anim.current(), Some(1));
        for _ in 0..70 {
            anim.update(&mut m, &motion(false, false, false));
        }
        assert!(m.get(1).unwrap().is_running());
    }

    #[test]
    fn test_no_clips_is_noop() {
        let mut m = ActionMixer::default();
        let mut anim = SkinnedAnimator::new(0.3);
        anim.update(&mut m, &motion(true, true, false));
        assert_eq!(anim.current(), None);
        assert_eq!(anim.state(), AnimationState::Idle);
    }
}
