//! Eased lane speed
//!
//! The lane never snaps between full speed and a stop; it eases from its
//! current speed toward the target with a cubic in/out curve.

use crate::ease_in_out_cubic;

#[derive(Debug, Clone)]
pub struct SpeedRamp {
    current: f32,
    from: f32,
    target: f32,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl SpeedRamp {
    /// Start from a standstill, easing up to `target` over `duration_ms`
    pub fn new(target: f32, duration_ms: f64) -> Self {
        Self {
            current: 0.0,
            from: 0.0,
            target,
            elapsed_ms: 0.0,
            duration_ms,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Begin a new ease toward `target`. No-op if already heading there.
    pub fn retarget(&mut self, target: f32, duration_ms: f64) {
        if target == self.target {
            return;
        }
        self.from = self.current;
        self.target = target;
        self.elapsed_ms = 0.0;
        self.duration_ms = duration_ms;
    }

    /// Advance the ease by `dt_ms` and return the new speed
    pub fn advance(&mut self, dt_ms: f64) -> f32 {
        self.elapsed_ms += dt_ms;
        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).min(1.0) as f32
        };
        let eased = ease_in_out_cubic(progress);
        self.current = self.from + (self.target - self.from) * eased;
        self.current
    }
}
