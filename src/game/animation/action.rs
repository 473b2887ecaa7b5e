use serde::Serialize;

use crate::game::commands::ClipInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    Repeat,
    /// Play once, then hold the last frame
    Once,
}

impl LoopMode {
    /// Locomotion clips loop; everything else plays once.
    pub fn for_clip(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if ["idle", "walk", "run"].iter().any(|k| lower.contains(k)) {
            LoopMode::Repeat
        } else {
            LoopMode::Once
        }
    }
}

/// One playable clip with its own weight fade and time scale.
#[derive(Debug, Clone)]
pub struct ClipAction {
    pub name: String,
    pub duration: f32,
    pub loop_mode: LoopMode,
    time: f32,
    time_scale: f32,
    weight: f32,
    fade_from: f32,
    fade_to: f32,
    fade_duration: f32,
    fade_elapsed: f32,
    playing: bool,
    /// Set when a once-clip reaches its end and holds it
    clamped: bool,
}

impl ClipAction {
    pub fn new(name: impl Into<String>, duration: f32, loop_mode: LoopMode) -> Self {
        Self {
            name: name.into(),
            duration: duration.max(0.0),
            loop_mode,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            fade_from: 0.0,
            fade_to: 0.0,
            fade_duration: 0.0,
            fade_elapsed: 0.0,
            playing: false,
            clamped: false,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn is_fading(&self) -> bool {
        self.fade_duration > 0.0
    }

    /// Playing, not held on its last frame, and actually advancing.
    pub fn is_running(&self) -> bool {
        self.playing && !self.clamped && self.time_scale != 0.0
    }

    pub fn play(&mut self) -> &mut Self {
        self.playing = true;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.playing = false;
        self.clamped = false;
        self.time = 0.0;
        self.weight = 0.0;
        self.clear_fade();
        self
    }

    /// Rewinds to the start and cancels any fade.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.clamped = false;
        self.clear_fade();
        self
    }

    pub fn set_effective_weight(&mut self, weight: f32) -> &mut Self {
        self.weight = weight.max(0.0);
        self.clear_fade();
        self
    }

    pub fn set_effective_time_scale(&mut self, scale: f32) -> &mut Self {
        self.time_scale = scale;
        self
    }

    pub fn fade_in(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(0.0, 1.0, duration);
        self
    }

    /// Fades to zero weight; the action stops once the fade completes.
    pub fn fade_out(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(self.weight, 0.0, duration);
        self
    }

    pub fn tick(&mut self, delta_time: f32) {
        let dt = delta_time.max(0.0);
        if !self.playing {
            return;
        }

        if self.fade_duration > 0.0 {
            self.fade_elapsed = (self.fade_elapsed + dt).min(self.fade_duration);
            let alpha = (self.fade_elapsed / self.fade_duration).clamp(0.0, 1.0);
            self.weight = self.fade_from + (self.fade_to - self.fade_from) * alpha;
            if (self.fade_duration - self.fade_elapsed).abs() <= f32::EPSILON {
                let to = self.fade_to;
                self.clear_fade();
                self.weight = to;
                if to <= 0.0001 {
                    self.playing = false;
                    return;
                }
            }
        }

        if self.clamped {
            return;
        }
        self.time += dt * self.time_scale;

        if self.duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        match self.loop_mode {
            LoopMode::Repeat => self.time = self.time.rem_euclid(self.duration),
            LoopMode::Once => {
                if self.time >= self.duration {
                    self.time = self.duration;
                    self.clamped = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.clamped = true;
                }
            }
        }
    }

    fn schedule_fade(&mut self, from: f32, to: f32, duration: f32) {
        let duration = duration.max(0.0);
        if duration > 0.0 {
            self.fade_from = from.max(0.0);
            self.fade_to = to.max(0.0);
            self.fade_duration = duration;
            self.fade_elapsed = 0.0;
            self.weight = self.fade_from;
        } else {
            self.clear_fade();
            self.weight = to.max(0.0);
            if self.weight <= 0.0 {
                self.playing = false;
            }
        }
    }

    fn clear_fade(&mut self) {
        self.fade_from = 0.0;
        self.fade_to = 0.0;
        self.fade_duration = 0.0;
        self.fade_elapsed = 0.0;
    }
}

/// Clip actions of one skinned character, kept in clip load order.
#[derive(Debug, Clone, Default)]
pub struct ActionMixer {
    actions: Vec<ClipAction>,
}

impl ActionMixer {
    pub fn from_clips(clips: &[ClipInfo]) -> Self {
        Self {
            actions: clips
                .iter()
                .map(|c| ClipAction::new(c.name.clone(), c.duration, LoopMode::for_clip(&c.name)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.name.as_str())
    }

    pub fn get(&self, index: usize) -> Option<&ClipAction> {
        self.actions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ClipAction> {
        self.actions.get_mut(index)
    }

    pub fn actions(&self) -> &[ClipAction] {
        &self.actions
    }

    pub fn tick(&mut self, dt: f32) {
        for action in &mut self.actions {
            action.tick(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_mode_by_name() {
        assert_eq!(LoopMode::for_clip("Idle_01"), LoopMode::Repeat);
        assert_eq!(LoopMode::for_clip("RUN"), LoopMode::Repeat);
        assert_eq!(LoopMode::for_clip("Jump"), LoopMode::Once);
    }

    #[test]
    fn test_fade_in_reaches_full_weight() {
        let mut action = ClipAction::new("walk", 1.0, LoopMode::Repeat);
        action.fade_in(0.3).play();
        assert_eq!(action.weight(), 0.0);
        action.tick(0.15);
        assert!((action.weight() - 0.5).abs() < 1e-4);
        action.tick(0.2);
        assert_eq!(action.weight(), 1.0);
        assert!(!action.is_fading());
        assert!(action.is_running());
    }

    #[test]
    fn test_fade_out_stops_action() {
        let mut action = ClipAction::new("idle", 1.0, LoopMode::Repeat);
        action.play();
        action.fade_out(0.3);
        action.tick(0.1);
        assert!(action.is_running());
        action.tick(0.3);
        assert!(!action.is_running());
        assert_eq!(action.weight(), 0.0);
    }

    #[test]
    fn test_repeat_wraps_time() {
        let mut action = ClipAction::new("run", 1.0, LoopMode::Repeat);
        action.play();
        action.tick(2.5);
        assert!((action.time() - 0.5).abs() < 1e-4);
        assert!(action.is_running());
    }

    #[test]
    fn test_once_clamps_on_last_frame() {
        let mut action = ClipAction::new("jump", 0.8, LoopMode::Once);
        action.play();
        action.tick(1.0);
        assert_eq!(action.time(), 0.8);
        assert!(!action.is_running());

        action.reset().play();
        assert!(action.is_running());
        assert_eq!(action.time(), 0.0);
    }

    #[test]
    fn test_mixer_keeps_load_order() {
        let mixer = ActionMixer::from_clips(&[
            ClipInfo::new("Walk", 1.0),
            ClipInfo::new("Idle", 1.0),
        ]);
        assert_eq!(mixer.names().collect::<Vec<_>>(), vec!["Walk", "Idle"]);
        assert_eq!(mixer.get(0).unwrap().loop_mode, LoopMode::Repeat);
    }
}
