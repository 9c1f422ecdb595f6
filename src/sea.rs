//! The simulation context: swell, pointer and creature population.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SeaConfig;
use crate::creature::{Bounds, Creature, Surroundings};
use crate::persist::Snapshot;
use crate::pointer::PointerTracker;
use crate::wave::WaveField;

pub struct Sea {
    config: SeaConfig,
    bounds: Bounds,
    field: WaveField,
    pointer: PointerTracker,
    creatures: Vec<Creature>,
    rng: SmallRng,
}

impl Sea {
    /// Fresh population on a `width` x `height` surface; `seed` drives every
    /// random draw.
    pub fn new(config: SeaConfig, width: f64, height: f64, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let bounds = Bounds { width, height };
        let wave_seed = rng.random::<f64>() * 1000.0;
        let field = WaveField::new(width, height, wave_seed, &config.wave);
        let creatures = (0..config.creature_count)
            .map(|_| Creature::spawn(&mut rng, &config, bounds))
            .collect();

        Self {
            config,
            bounds,
            field,
            pointer: PointerTracker::new(),
            creatures,
            rng,
        }
    }

    /// Adopt a persisted population and wave seed.
    ///
    /// The population is trimmed or topped up to the configured size.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let restored = snapshot.creatures.len();
        self.creatures = snapshot.creatures;
        self.creatures.truncate(self.config.creature_count);
        for creature in &mut self.creatures {
            creature.sanitize();
        }
        while self.creatures.len() < self.config.creature_count {
            let fresh = Creature::spawn(&mut self.rng, &self.config, self.bounds);
            self.creatures.push(fresh);
        }
        self.field.set_seed(snapshot.wave_seed);
        log::info!(
            "restored {restored} creatures (population {})",
            self.creatures.len()
        );
    }

    pub fn snapshot(&self, now_ms: f64) -> Snapshot {
        Snapshot {
            creatures: self.creatures.clone(),
            wave_seed: self.field.seed(),
            timestamp: now_ms,
        }
    }

    /// One simulation tick: swell, pointer decay, then creatures.
    pub fn step(&mut self, delta_ms: f64) {
        self.field.advance(
            delta_ms,
            self.pointer.disturbance(),
            &self.config.wave,
            self.config.pointer.radius,
        );
        self.pointer.decay(&self.config.pointer);

        let world = Surroundings {
            field: &self.field,
            pointer: &self.pointer,
            bounds: self.bounds,
        };
        for creature in &mut self.creatures {
            creature.update(delta_ms, &world, &self.config, &mut self.rng);
        }
    }

    /// Rebuild the wave grid for new surface dimensions.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.bounds = Bounds { width, height };
        self.field.rebuild(width, height, &self.config.wave);
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64, now_ms: f64) {
        self.pointer
            .on_move(x, y, now_ms, &self.config.pointer, &mut self.rng);
    }

    pub fn pointer_left(&mut self) {
        self.pointer.on_leave();
    }

    pub fn check_pointer_idle(&mut self, now_ms: f64) {
        self.pointer.check_idle(now_ms, &self.config.pointer);
    }

    pub fn config(&self) -> &SeaConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creatures_mut(&mut self) -> &mut Vec<Creature> {
        &mut self.creatures
    }
}
