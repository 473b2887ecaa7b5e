//! Stamina pool gating sprint and jump.

use serde::Serialize;

use super::constants::stamina as consts;

/// Tunables for the stamina pool.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, Serialize)]
#[serde(default)]
pub struct StaminaConfig {
    pub enabled: bool,
    pub max: f32,
    pub depletion_rate: f32,
    pub regen_rate: f32,
    pub jump_cost: f32,
    pub sprint_threshold: f32,
    pub recovery_fraction: f32,
    pub min_update_interval: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max: consts::MAX,
            depletion_rate: consts::DEPLETION_RATE,
            regen_rate: consts::REGEN_RATE,
            jump_cost: consts::JUMP_COST,
            sprint_threshold: consts::SPRINT_THRESHOLD,
            recovery_fraction: consts::RECOVERY_FRACTION,
            min_update_interval: consts::MIN_UPDATE_INTERVAL,
        }
    }
}

/// Value pushed to the stamina bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StaminaReading {
    pub current: f32,
    pub max: f32,
    /// At or below the sprint threshold
    pub low: bool,
}

impl StaminaReading {
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// One-way sink for the stamina bar. The pool never reads it back.
pub trait StaminaDisplay {
    fn show(&mut self, reading: StaminaReading);
}

pub struct StaminaPool {
    config: StaminaConfig,
    current: f32,
    exhausted: bool,
    pending_dt: f32,
    display: Option<Box<dyn StaminaDisplay>>,
}

impl StaminaPool {
    pub fn new(config: StaminaConfig) -> Self {
        let max = config.max.max(0.0);
        Self {
            config: StaminaConfig { max, ..config },
            current: max,
            exhausted: false,
            pending_dt: 0.0,
            display: None,
        }
    }

    /// Attaches the stamina bar. Without one, updates are simply not shown.
    pub fn set_display(&mut self, display: Box<dyn StaminaDisplay>) {
        self.display = Some(display);
        self.publish();
    }

    pub fn config(&self) -> &StaminaConfig {
        &self.config
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.config.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn reading(&self) -> StaminaReading {
        StaminaReading {
            current: self.current,
            max: self.config.max,
            low: self.current <= self.config.sprint_threshold,
        }
    }

    /// Spends `amount` if strictly more is available; otherwise leaves the pool untouched.
    pub fn consume(&mut self, amount: f32) -> bool {
        if !self.config.enabled {
            return true;
        }
        if self.current <= amount {
            return false;
        }
        self.set_current(self.current - amount);
        true
    }

    pub fn regenerate(&mut self, amount: f32) {
        if !self.config.enabled {
            return;
        }
        self.set_current(self.current + amount);
    }

    /// Sprint is allowed above the low-water mark, and never while recovering from exhaustion.
    pub fn can_sprint(&self) -> bool {
        if !self.config.enabled {
            return true;
        }
        !self.exhausted && self.current > self.config.sprint_threshold
    }

    /// Charges the jump cost atomically; a refused jump costs nothing.
    pub fn can_jump(&mut self) -> bool {
        self.consume(self.config.jump_cost)
    }

    /// Applies depletion (sprinting) or regeneration (otherwise).
    ///
    /// Ticks closer together than `min_update_interval` are deferred; their time
    /// is carried into the next applied tick. Returns whether the pool changed.
    pub fn tick(&mut self, dt: f32, sprinting: bool) -> bool {
        if !self.config.enabled {
            return false;
        }
        self.pending_dt += dt.max(0.0);
        if self.pending_dt < self.config.min_update_interval {
            return false;
        }
        let elapsed = std::mem::take(&mut self.pending_dt);

        if sprinting {
            self.set_current(self.current - self.config.depletion_rate * elapsed);
            if self.current <= 0.0 && !self.exhausted {
                self.exhausted = true;
                tracing::debug!("stamina exhausted");
            }
        } else {
            self.set_current(self.current + self.config.regen_rate * elapsed);
        }
        true
    }

    /// Enters exhaustion without draining the pool; sprint stays locked until recovery.
    pub fn exhaust(&mut self) {
        if !self.config.enabled || self.exhausted {
            return;
        }
        self.exhausted = true;
        tracing::debug!(current = self.current, "stamina exhausted at low-water mark");
    }

    pub fn reset(&mut self) {
        self.exhausted = false;
        self.pending_dt = 0.0;
        self.set_current(self.config.max);
    }

    pub fn set_max(&mut self, max: f32) {
        self.config.max = max.max(0.0);
        self.set_current(self.current);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    fn set_current(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.config.max);
        if self.exhausted && self.current > self.config.max * self.config.recovery_fraction {
            self.exhausted = false;
        }
        self.publish();
    }

    fn publish(&mut self) {
        let reading = self.reading();
        if let Some(display) = self.display.as_mut() {
            display.show(reading);
        }
    }
}

impl Default for StaminaPool {
    fn default() -> Self {
        Self::new(StaminaConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<StaminaReading>>>);

    impl StaminaDisplay for Recorder {
        fn show(&mut self, reading: StaminaReading) {
            self.0.lock().unwrap().push(reading);
        }
    }

    #[test]
    fn test_sprint_tick_depletes_by_rate() {
        let mut pool = StaminaPool::default();
        assert!(pool.tick(1.0, true));
        assert!((pool.current() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_throttled_ticks_carry_time_forward() {
        let mut pool = StaminaPool::default();
        pool.consume(50.0);
        assert!(!pool.tick(0.05, false));
        assert!((pool.current() - 50.0).abs() < 1e-4);
        assert!(pool.tick(0.05, false));
        assert!((pool.current() - 51.5).abs() < 1e-3);
    }

    #[test]
    fn test_consume_refuses_without_mutation() {
        let mut pool = StaminaPool::default();
        assert!(pool.consume(95.0));
        assert!(!pool.consume(5.0), "current == amount must be refused");
        assert!((pool.current() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_failed_jump_leaves_stamina_unchanged() {
        let mut pool = StaminaPool::default();
        pool.consume(92.0);
        assert!(!pool.can_jump());
        assert!((pool.current() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_clamped_for_mixed_sequences() {
        let mut pool = StaminaPool::default();
        let ops: [(bool, f32); 8] = [
            (true, 30.0),
            (false, 500.0),
            (true, 99.0),
            (true, 0.5),
            (false, -20.0),
            (true, 1000.0),
            (false, 3.0),
            (true, 2.0),
        ];
        for (consume, amount) in ops {
            if consume {
                pool.consume(amount);
            } else {
                pool.regenerate(amount);
            }
            assert!(pool.current() >= 0.0 && pool.current() <= pool.max());
        }
        for _ in 0..50 {
            pool.tick(0.5, true);
            assert!(pool.current() >= 0.0);
        }
    }

    #[test]
    fn test_exhaustion_hysteresis() {
        let mut pool = StaminaPool::default();
        pool.tick(4.0, true);
        assert_eq!(pool.current(), 0.0);
        assert!(pool.is_exhausted());
        assert!(!pool.can_sprint());

        // 20 > threshold (10) but below 30% recovery.
        pool.regenerate(20.0);
        assert!(!pool.can_sprint());

        pool.regenerate(10.5);
        assert!(pool.can_sprint());
    }

    #[test]
    fn test_disabled_pool_always_allows() {
        let mut pool = StaminaPool::new(StaminaConfig {
            enabled: false,
            ..StaminaConfig::default()
        });
        assert!(pool.consume(1000.0));
        assert!(pool.can_jump());
        assert!(!pool.tick(10.0, true));
        assert_eq!(pool.current(), 100.0);
        assert!(pool.can_sprint());
    }

    #[test]
    fn test_display_receives_updates() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pool = StaminaPool::default();
        pool.set_display(Box::new(Recorder(log.clone())));
        pool.consume(95.0);

        let readings = log.lock().unwrap();
        let last = readings.last().unwrap();
        assert!((last.current - 5.0).abs() < 1e-4);
        assert!(last.low);
        assert!((last.fraction() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_set_max_clamps_current() {
        let mut pool = StaminaPool::default();
        pool.set_max(40.0);
        assert_eq!(pool.current(), 40.0);
    }
}
