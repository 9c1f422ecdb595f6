//! Pointer disturbance tracking.
//!
//! Move events set a fresh intensity, the simulation tick decays it, and a
//! host timer marks the pointer idle when move events stop arriving.

use rand::Rng;

use crate::config::PointerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (x - self.x).hypot(y - self.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerTracker {
    position: Option<PointerPosition>,
    intensity: f64,
    idle: bool,
    last_move_ms: f64,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub const fn new() -> Self {
        Self {
            position: None,
            intensity: 0.0,
            idle: true,
            last_move_ms: f64::NEG_INFINITY,
        }
    }

    pub fn position(&self) -> Option<PointerPosition> {
        self.position
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Position of an active, non-idle pointer.
    pub fn engaged_position(&self) -> Option<PointerPosition> {
        if self.idle {
            None
        } else {
            self.position
        }
    }

    /// Disturbance source for the wave field: known position and nonzero intensity.
    pub fn disturbance(&self) -> Option<(PointerPosition, f64)> {
        match self.position {
            Some(pos) if self.intensity > 0.0 => Some((pos, self.intensity)),
            _ => None,
        }
    }

    /// Normalised pointer activity in `[0, 1]`; zero while idle.
    pub fn attention(&self, config: &PointerConfig) -> f64 {
        if self.idle || self.position.is_none() || config.max_intensity <= 0.0 {
            return 0.0;
        }
        (self.intensity / config.max_intensity).clamp(0.0, 1.0)
    }

    pub fn on_move<R: Rng + ?Sized>(
        &mut self,
        x: f64,
        y: f64,
        now_ms: f64,
        config: &PointerConfig,
        rng: &mut R,
    ) {
        self.position = Some(PointerPosition { x, y });
        let elapsed = now_ms - self.last_move_ms;
        self.last_move_ms = now_ms;

        if elapsed < config.continuous_ms {
            let drawn = config.base_intensity + rng.random::<f64>() * config.intensity_jitter;
            self.intensity = drawn.min(config.max_intensity);
            self.idle = false;
        }
    }

    pub fn on_leave(&mut self) {
        self.position = None;
        self.idle = true;
    }

    /// Fallback idle detection for when move events stop firing.
    pub fn check_idle(&mut self, now_ms: f64, config: &PointerConfig) {
        if now_ms - self.last_move_ms > config.idle_timeout_ms {
            self.idle = true;
        }
    }

    /// One tick of geometric decay, snapping to zero below `epsilon`.
    pub fn decay(&mut self, config: &PointerConfig) {
        self.intensity *= config.decay;
        if self.intensity < config.epsilon {
            self.intensity = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn isolated_move_only_records_position() {
        let config = PointerConfig::default();
        let mut pointer = PointerTracker::new();
        pointer.on_move(10.0, 20.0, 5_000.0, &config, &mut rng());

        assert_eq!(pointer.position(), Some(PointerPosition { x: 10.0, y: 20.0 }));
        assert_eq!(pointer.intensity(), 0.0);
        assert!(pointer.is_idle());
    }

    #[test]
    fn continuous_motion_sets_bounded_intensity() {
        let config = PointerConfig::default();
        let mut rng = rng();
        let mut pointer = PointerTracker::new();
        pointer.on_move(0.0, 0.0, 1_000.0, &config, &mut rng);
        pointer.on_move(4.0, 0.0, 1_030.0, &config, &mut rng);

        assert!(!pointer.is_idle());
        assert!(pointer.intensity() >= config.base_intensity);
        assert!(pointer.intensity() <= config.max_intensity);
        assert!(pointer.attention(&config) > 0.0);
    }

    #[test]
    fn idle_check_respects_timeout() {
        let config = PointerConfig::default();
        let mut rng = rng();
        let mut pointer = PointerTracker::new();
        pointer.on_move(0.0, 0.0, 1_000.0, &config, &mut rng);
        pointer.on_move(1.0, 0.0, 1_010.0, &config, &mut rng);

        pointer.check_idle(1_400.0, &config);
        assert!(!pointer.is_idle());
        pointer.check_idle(1_600.0, &config);
        assert!(pointer.is_idle());
        assert_eq!(pointer.attention(&config), 0.0);
    }

    #[test]
    fn decay_reaches_exact_zero() {
        let config = PointerConfig::default();
        let mut rng = rng();
        let mut pointer = PointerTracker::new();
        pointer.on_move(0.0, 0.0, 0.0, &config, &mut rng);
        pointer.on_move(0.0, 0.0, 1.0, &config, &mut rng);

        let mut previous = pointer.intensity();
        let mut ticks = 0;
        while pointer.intensity() > 0.0 {
            pointer.decay(&config);
            assert!(pointer.intensity() <= previous);
            previous = pointer.intensity();
            ticks += 1;
            assert!(ticks < 1_000, "intensity never reached zero");
        }
        assert_eq!(pointer.intensity(), 0.0);
        assert!(pointer.disturbance().is_none());
    }

    #[test]
    fn leave_clears_position() {
        let config = PointerConfig::default();
        let mut pointer = PointerTracker::new();
        pointer.on_move(3.0, 3.0, 0.0, &config, &mut rng());
        pointer.on_leave();
        assert_eq!(pointer.position(), None);
        assert!(pointer.engaged_position().is_none());
    }
}
