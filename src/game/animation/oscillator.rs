/// Triangle-wave ping-pong between `-amplitude` and `amplitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub phase: f32,
    /// +1.0 or -1.0
    pub direction: f32,
    pub amplitude: f32,
    /// Radians per second
    pub speed: f32,
}

impl Oscillator {
    pub fn new(amplitude: f32, speed: f32) -> Self {
        Self {
            phase: 0.0,
            direction: 1.0,
            amplitude,
            speed,
        }
    }

    /// Steps the phase and returns the new angle. The direction flips at either bound.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.phase += self.direction * self.speed * dt.max(0.0);
        if self.phase >= self.amplitude {
            self.phase = self.amplitude;
            self.direction = -1.0;
        } else if self.phase <= -self.amplitude {
            self.phase = -self.amplitude;
            self.direction = 1.0;
        }
        self.phase
    }
}
