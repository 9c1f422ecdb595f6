//! Bioluminescent creatures and their surface/dive cycle.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SeaConfig;
use crate::pointer::PointerTracker;
use crate::wave::WaveField;

/// Frame length the per-tick probabilities and rates are calibrated against.
pub const BASELINE_FRAME_MS: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Behaviour state derived from [`Creature::at_surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiveState {
    Cruising,
    Surfaced,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Read-only view of the world a creature reacts to during one tick.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub field: &'a WaveField,
    pub pointer: &'a PointerTracker,
    pub bounds: Bounds,
}

/// Plain data so the population can be persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Pixels per millisecond.
    pub speed: f64,
    /// Heading in radians.
    pub direction: f64,
    /// 0 is the surface, 1 the deepest layer.
    pub depth: f64,
    pub target_depth: f64,
    pub at_surface: bool,
    pub surface_time: f64,
    pub surface_duration: f64,
    pub color: Hsl,
    pub brightness_factor: f64,
}

impl Creature {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, config: &SeaConfig, bounds: Bounds) -> Self {
        let at_surface = rng.random::<f64>() < config.initial_surface_chance;
        let depth = if at_surface {
            0.0
        } else {
            config.creature_depth.sample(rng)
        };
        let surface_duration = if at_surface {
            config.initial_surface_ms.sample(rng)
        } else {
            0.0
        };

        Self {
            x: rng.random::<f64>() * bounds.width.max(0.0),
            y: rng.random::<f64>() * bounds.height.max(0.0),
            size: config.creature_size.sample(rng),
            speed: config.creature_speed.sample(rng),
            direction: rng.random_range(0.0..TAU),
            depth,
            target_depth: depth,
            at_surface,
            surface_time: 0.0,
            surface_duration,
            color: Hsl {
                hue: config.hue.sample(rng),
                saturation: config.saturation.sample(rng),
                lightness: config.lightness.sample(rng),
            },
            brightness_factor: config.brightness.sample(rng),
        }
    }

    pub fn state(&self) -> DiveState {
        if self.at_surface {
            DiveState::Surfaced
        } else {
            DiveState::Cruising
        }
    }

    /// Repair values a stale or hand-edited snapshot may carry.
    pub fn sanitize(&mut self) {
        for value in [
            &mut self.x,
            &mut self.y,
            &mut self.direction,
            &mut self.surface_time,
            &mut self.surface_duration,
        ] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            self.speed = 0.0;
        }
        self.depth = clamp_unit(self.depth);
        self.target_depth = clamp_unit(self.target_depth);
    }

    /// Advance one tick of `delta_ms` milliseconds.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        delta_ms: f64,
        world: &Surroundings<'_>,
        config: &SeaConfig,
        rng: &mut R,
    ) {
        let delta_ms = if delta_ms.is_finite() {
            delta_ms.max(0.0)
        } else {
            0.0
        };
        let frames = delta_ms / BASELINE_FRAME_MS;
        let wave_height = world.field.height_at(self.x, self.y);

        self.x += self.direction.cos() * self.speed * delta_ms;
        self.y += self.direction.sin() * self.speed * delta_ms;

        if self.depth < config.wave_push_depth {
            let influence = (config.wave_push_depth - self.depth) / config.wave_push_depth;
            self.x += wave_height * config.wave_push_x * influence;
            self.y += wave_height * config.wave_push_y * influence;
        }

        self.react_to_pointer(world.pointer, frames, config, rng);

        if rng.random::<f64>() < config.turn_chance {
            self.direction += (rng.random::<f64>() - 0.5) * config.turn_span;
        }

        self.step_dive_cycle(delta_ms, frames, config, rng);
        self.ease_depth(delta_ms, frames, config);
        self.wrap(world.bounds, config.wrap_margin);
    }

    fn react_to_pointer<R: Rng + ?Sized>(
        &mut self,
        pointer: &PointerTracker,
        frames: f64,
        config: &SeaConfig,
        rng: &mut R,
    ) {
        let Some(position) = pointer.engaged_position() else {
            return;
        };
        let reach = config.pointer.interaction_radius();
        let dx = self.x - position.x;
        let dy = self.y - position.y;
        let distance = dx.hypot(dy);
        if distance.is_nan() || distance >= reach {
            return;
        }

        let closeness = 1.0 - distance / reach;
        let eased = closeness * closeness * (3.0 - 2.0 * closeness);
        let shallowness = 1.0 - (self.depth * 2.0).min(1.0);

        if distance > 0.0 {
            let push = config.pointer.push_strength
                * pointer.attention(&config.pointer)
                * eased
                * shallowness
                * frames;
            self.x += dx / distance * push;
            self.y += dy / distance * push;
        }

        // activity near the pointer lures deep cruisers toward the surface
        if !self.at_surface
            && self.depth > config.lure_depth
            && rng.random::<f64>() < config.lure_chance * closeness
        {
            self.target_depth = (self.target_depth - config.lure_step).max(config.lure_floor);
        }
    }

    fn step_dive_cycle<R: Rng + ?Sized>(
        &mut self,
        delta_ms: f64,
        frames: f64,
        config: &SeaConfig,
        rng: &mut R,
    ) {
        match self.state() {
            DiveState::Surfaced => {
                self.surface_time += delta_ms;
                if self.surface_time >= self.surface_duration {
                    self.at_surface = false;
                    self.target_depth = clamp_unit(config.creature_depth.sample(rng));
                }
            }
            DiveState::Cruising => {
                if rng.random::<f64>() < config.surface_frequency * frames {
                    self.at_surface = true;
                    self.surface_time = 0.0;
                    self.surface_duration = config.surface_ms.sample(rng);
                    self.target_depth = 0.0;
                }
            }
        }
    }

    fn ease_depth(&mut self, delta_ms: f64, frames: f64, config: &SeaConfig) {
        let step = (config.depth_ease_rate * delta_ms).min(1.0);
        self.depth += (self.target_depth - self.depth) * step;
        if self.at_surface {
            self.depth -= config.ascent_rate * frames;
        }
        self.depth = clamp_unit(self.depth);
    }

    fn wrap(&mut self, bounds: Bounds, margin: f64) {
        if self.x < -margin {
            self.x = bounds.width + margin;
        }
        if self.x > bounds.width + margin {
            self.x = -margin;
        }
        if self.y < -margin {
            self.y = bounds.height + margin;
        }
        if self.y > bounds.height + margin {
            self.y = -margin;
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveConfig;
    use pretty_assertions::assert_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const BOUNDS: Bounds = Bounds {
        width: 300.0,
        height: 200.0,
    };

    fn cruiser(depth: f64, target_depth: f64) -> Creature {
        Creature {
            x: 150.0,
            y: 100.0,
            size: 2.0,
            speed: 0.0,
            direction: 0.0,
            depth,
            target_depth,
            at_surface: false,
            surface_time: 0.0,
            surface_duration: 0.0,
            color: Hsl {
                hue: 180.0,
                saturation: 100.0,
                lightness: 60.0,
            },
            brightness_factor: 1.0,
        }
    }

    fn quiet_config() -> SeaConfig {
        SeaConfig {
            surface_frequency: 0.0,
            turn_chance: 0.0,
            ..SeaConfig::default()
        }
    }

    #[test]
    fn spawn_respects_configured_ranges() {
        let config = SeaConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            let c = Creature::spawn(&mut rng, &config, BOUNDS);
            assert!((0.0..=BOUNDS.width).contains(&c.x));
            assert!(config.creature_size.contains(c.size));
            assert!(config.hue.contains(c.color.hue));
            if c.at_surface {
                assert_eq!(c.depth, 0.0);
                assert!(config.initial_surface_ms.contains(c.surface_duration));
            } else {
                assert!(config.creature_depth.contains(c.depth));
                assert_eq!(c.target_depth, c.depth);
            }
        }
    }

    #[test]
    fn expired_surfacing_dives_next_tick() {
        let config = quiet_config();
        let field = WaveField::new(BOUNDS.width, BOUNDS.height, 0.0, &WaveConfig::default());
        let pointer = PointerTracker::new();
        let world = Surroundings {
            field: &field,
            pointer: &pointer,
            bounds: BOUNDS,
        };
        let mut rng = SmallRng::seed_from_u64(3);

        let mut creature = cruiser(0.0, 0.0);
        creature.at_surface = true;
        creature.surface_duration = 2_000.0;
        creature.surface_time = 2_000.0;

        creature.update(16.0, &world, &config, &mut rng);
        assert_eq!(creature.state(), DiveState::Cruising);
        assert!(config.creature_depth.contains(creature.target_depth));
    }

    #[test]
    fn certain_surfacing_resets_timer() {
        let config = SeaConfig {
            surface_frequency: 1.0,
            turn_chance: 0.0,
            ..SeaConfig::default()
        };
        let field = WaveField::new(BOUNDS.width, BOUNDS.height, 0.0, &WaveConfig::default());
        let pointer = PointerTracker::new();
        let world = Surroundings {
            field: &field,
            pointer: &pointer,
            bounds: BOUNDS,
        };
        let mut rng = SmallRng::seed_from_u64(3);

        let mut creature = cruiser(0.6, 0.6);
        creature.surface_time = 999.0;
        creature.update(16.0, &world, &config, &mut rng);

        assert_eq!(creature.state(), DiveState::Surfaced);
        assert_eq!(creature.surface_time, 0.0);
        assert_eq!(creature.target_depth, 0.0);
        assert!(config.surface_ms.contains(creature.surface_duration));
        assert!(creature.depth < 0.6);
    }

    #[test]
    fn surfaced_creature_rises_to_zero() {
        let config = quiet_config();
        let field = WaveField::new(BOUNDS.width, BOUNDS.height, 0.0, &WaveConfig::default());
        let pointer = PointerTracker::new();
        let world = Surroundings {
            field: &field,
            pointer: &pointer,
            bounds: BOUNDS,
        };
        let mut rng = SmallRng::seed_from_u64(5);

        let mut creature = cruiser(0.5, 0.0);
        creature.at_surface = true;
        creature.surface_duration = f64::MAX;
        for _ in 0..2_000 {
            creature.update(16.0, &world, &config, &mut rng);
        }
        assert_eq!(creature.depth, 0.0);
    }

    #[test]
    fn wraps_past_margin() {
        let mut creature = cruiser(0.5, 0.5);
        creature.x = -51.0;
        creature.y = 251.0;
        creature.wrap(BOUNDS, 50.0);
        assert_eq!((creature.x, creature.y), (350.0, -50.0));
    }

    #[test]
    fn sanitize_clamps_depths() {
        let mut creature = cruiser(1.7, -0.2);
        creature.x = f64::NAN;
        creature.sanitize();
        assert_eq!((creature.depth, creature.target_depth, creature.x), (1.0, 0.0, 0.0));
    }

    #[test]
    fn nearby_pointer_pushes_shallow_creatures_away() {
        let config = quiet_config();
        let field = WaveField::new(BOUNDS.width, BOUNDS.height, 0.0, &WaveConfig::default());
        let mut rng = SmallRng::seed_from_u64(9);
        let mut pointer = PointerTracker::new();
        pointer.on_move(140.0, 100.0, 0.0, &config.pointer, &mut rng);
        pointer.on_move(140.0, 100.0, 10.0, &config.pointer, &mut rng);
        let world = Surroundings {
            field: &field,
            pointer: &pointer,
            bounds: BOUNDS,
        };

        let mut shallow = cruiser(0.1, 0.1);
        let mut deep = cruiser(0.9, 0.9);

        shallow.update(16.0, &world, &config, &mut rng);
        deep.update(16.0, &world, &config, &mut rng);
        let shallow_shift = shallow.x - 150.0;
        let deep_shift = deep.x - 150.0;
        assert!(shallow_shift > 0.0);
        assert!(deep_shift.abs() < shallow_shift);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    proptest! {
        #[test]
        fn depth_stays_in_unit_interval(
            seed in any::<u64>(),
            deltas in proptest::collection::vec(0.0f64..5_000.0, 1..60),
        ) {
            let config = SeaConfig {
                surface_frequency: 0.05,
                ..SeaConfig::preset(crate::config::Preset::Lively)
            };
            let bounds = Bounds { width: 400.0, height: 300.0 };
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut field = WaveField::new(bounds.width, bounds.height, 0.0, &config.wave);
            let pointer = PointerTracker::new();
            let mut creatures: Vec<Creature> =
                (0..8).map(|_| Creature::spawn(&mut rng, &config, bounds)).collect();

            for delta in deltas {
                field.advance(delta, None, &config.wave, config.pointer.radius);
                let world = Surroundings { field: &field, pointer: &pointer, bounds };
                for creature in &mut creatures {
                    creature.update(delta, &world, &config, &mut rng);
                    prop_assert!((0.0..=1.0).contains(&creature.depth));
                    prop_assert!((0.0..=1.0).contains(&creature.target_depth));
                }
            }
        }
    }
}
