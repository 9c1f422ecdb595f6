//! Tuning table for the sea simulation.
//!
//! Every constant the simulation reads lives here. The two historical tunings
//! of the background are kept as [`Preset`]s rather than separate code paths.

use std::f64::consts::PI;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Smallest accepted wave grid spacing in pixels.
pub const MIN_CELL_SIZE: f64 = 1.0;

/// Closed numeric interval sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Uniform draw from `[min, max]`. A degenerate span returns `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::NotFinite { field });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Ambient swell and pointer ripple parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaveConfig {
    /// Pixel spacing between grid points.
    pub cell_size: f64,
    /// Number of summed sinusoidal components.
    pub wave_count: u32,
    /// Seed advance per millisecond.
    pub wave_speed: f64,
    /// Amplitude of the last (min) and first (max) component.
    pub amplitude: Span,
    pub base_frequency: f64,
    /// Spatial wavenumber of the pointer ripple.
    pub ripple_wavenumber: f64,
    /// How fast the ripple phase runs relative to the ambient seed.
    pub ripple_phase_rate: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            wave_count: 5,
            wave_speed: 0.0001,
            amplitude: Span::new(2.0, 5.0),
            base_frequency: 0.005,
            ripple_wavenumber: 0.05,
            ripple_phase_rate: 2.0,
        }
    }
}

impl WaveConfig {
    /// Amplitude of harmonic `index` (0-based); falls linearly from `max`.
    pub fn amplitude_of(&self, index: u32) -> f64 {
        let count = f64::from(self.wave_count.max(1));
        let span = self.amplitude.max - self.amplitude.min;
        self.amplitude.min + span * (1.0 - f64::from(index) / count)
    }

    /// Upper bound on the magnitude of the ambient swell.
    pub fn amplitude_sum(&self) -> f64 {
        (0..self.wave_count).map(|i| self.amplitude_of(i)).sum()
    }
}

/// Pointer tracking and response parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointerConfig {
    /// Radius of the ripple disturbance in pixels.
    pub radius: f64,
    /// Per-tick multiplicative intensity decay.
    pub decay: f64,
    pub max_intensity: f64,
    /// Intensity drawn on a continuous move is `base + jitter * U[0,1)`, capped.
    pub base_intensity: f64,
    pub intensity_jitter: f64,
    /// Moves closer together than this count as continuous motion.
    pub continuous_ms: f64,
    pub idle_timeout_ms: f64,
    /// Period of the host idle-check timer.
    pub idle_check_ms: f64,
    /// Intensities below this snap to zero.
    pub epsilon: f64,
    /// Creatures react within `radius * interaction_scale`.
    pub interaction_scale: f64,
    /// Planar repulsion in pixels per 16ms at full intensity; negative attracts.
    pub push_strength: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            radius: 200.0,
            decay: 0.98,
            max_intensity: 15.0,
            base_intensity: 5.0,
            intensity_jitter: 10.0,
            continuous_ms: 100.0,
            idle_timeout_ms: 500.0,
            idle_check_ms: 500.0,
            epsilon: 0.01,
            interaction_scale: 1.5,
            push_strength: 0.3,
        }
    }
}

impl PointerConfig {
    pub fn interaction_radius(&self) -> f64 {
        self.radius * self.interaction_scale
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistConfig {
    pub storage_key: String,
    /// Minimum frame-clock time between periodic saves.
    pub save_interval_ms: f64,
    /// Snapshots older than this are discarded on load.
    pub staleness_ms: f64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            storage_key: "bioluminescent_sea_state".to_owned(),
            save_interval_ms: 1000.0,
            staleness_ms: 10.0 * 60.0 * 1000.0,
        }
    }
}

/// Frame clock, resize debounce and render watchdog timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameConfig {
    pub default_step_ms: f64,
    /// Larger gaps between frames are replaced by `default_step_ms`.
    pub max_gap_ms: f64,
    pub resize_debounce_ms: f64,
    pub watchdog_delay_ms: f64,
    /// Side length of the square pixel sample the watchdog inspects.
    pub watchdog_sample_px: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            default_step_ms: 16.0,
            max_gap_ms: 100.0,
            resize_debounce_ms: 200.0,
            watchdog_delay_ms: 1000.0,
            watchdog_sample_px: 10,
        }
    }
}

/// Presentation constants consumed by [`crate::glow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlowConfig {
    pub deep_radius: f64,
    pub deep_opacity: f64,
    pub surface_radius: f64,
    pub surface_opacity: f64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            deep_radius: 15.0,
            deep_opacity: 0.1,
            surface_radius: 30.0,
            surface_opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeaConfig {
    pub creature_count: usize,
    pub creature_size: Span,
    pub creature_speed: Span,
    /// Cruising depth band; 0 is the surface.
    pub creature_depth: Span,
    pub hue: Span,
    pub saturation: Span,
    pub lightness: Span,
    pub brightness: Span,
    /// Probability that a freshly spawned creature starts surfaced.
    pub initial_surface_chance: f64,
    pub initial_surface_ms: Span,
    /// Surfacing duration drawn on each cruise-to-surface transition.
    pub surface_ms: Span,
    /// Per-16ms probability of a cruising creature surfacing.
    pub surface_frequency: f64,
    /// Fraction of the remaining depth gap closed per millisecond.
    pub depth_ease_rate: f64,
    /// Depth lost per 16ms while surfaced.
    pub ascent_rate: f64,
    pub turn_chance: f64,
    /// Full width of the random heading change, in radians.
    pub turn_span: f64,
    /// Creatures shallower than this are pushed by the swell.
    pub wave_push_depth: f64,
    pub wave_push_x: f64,
    pub wave_push_y: f64,
    pub wrap_margin: f64,
    /// Creatures deeper than this may be lured upward by pointer activity.
    pub lure_depth: f64,
    pub lure_chance: f64,
    pub lure_step: f64,
    pub lure_floor: f64,
    pub wave: WaveConfig,
    pub pointer: PointerConfig,
    pub persist: PersistConfig,
    pub frame: FrameConfig,
    pub glow: GlowConfig,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            creature_count: 80,
            creature_size: Span::new(1.0, 4.0),
            creature_speed: Span::new(0.001, 0.004),
            creature_depth: Span::new(0.1, 0.9),
            hue: Span::new(160.0, 200.0),
            saturation: Span::new(100.0, 100.0),
            lightness: Span::new(50.0, 80.0),
            brightness: Span::new(0.7, 1.0),
            initial_surface_chance: 0.1,
            initial_surface_ms: Span::new(100_000.0, 400_000.0),
            surface_ms: Span::new(1000.0, 4000.0),
            surface_frequency: 0.00002,
            depth_ease_rate: 0.0001,
            ascent_rate: 0.001,
            turn_chance: 0.0001,
            turn_span: PI * 0.5,
            wave_push_depth: 0.3,
            wave_push_x: 0.02,
            wave_push_y: 0.01,
            wrap_margin: 50.0,
            lure_depth: 0.4,
            lure_chance: 0.01,
            lure_step: 0.1,
            lure_floor: 0.1,
            wave: WaveConfig::default(),
            pointer: PointerConfig::default(),
            persist: PersistConfig::default(),
            frame: FrameConfig::default(),
            glow: GlowConfig::default(),
        }
    }
}

/// Named tunings of the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Slow drift, rare surfacing.
    #[default]
    Calm,
    /// Faster motion, waves and surfacing.
    Lively,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calm" => Ok(Self::Calm),
            "lively" => Ok(Self::Lively),
            other => Err(ConfigError::UnknownPreset(other.to_owned())),
        }
    }
}

impl SeaConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Calm => Self::default(),
            Preset::Lively => {
                let mut config = Self {
                    creature_speed: Span::new(0.1, 0.4),
                    initial_surface_ms: Span::new(1000.0, 4000.0),
                    surface_frequency: 0.002,
                    depth_ease_rate: 0.01,
                    ascent_rate: 0.1,
                    turn_chance: 0.01,
                    ..Self::default()
                };
                config.wave.wave_speed = 0.01;
                config
            }
        }
    }

    /// Overlay a partial JSON object on `preset` and validate the result.
    ///
    /// Objects merge key by key; any other JSON value replaces the preset value.
    pub fn from_preset_and_json(preset: Preset, overlay: &str) -> Result<Self, ConfigError> {
        let mut base = serde_json::to_value(Self::preset(preset))?;
        let patch: Value = serde_json::from_str(overlay)?;
        merge_json(&mut base, patch);
        let config: Self = serde_json::from_value(base)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, span) in [
            ("creatureSize", &self.creature_size),
            ("creatureSpeed", &self.creature_speed),
            ("creatureDepth", &self.creature_depth),
            ("hue", &self.hue),
            ("saturation", &self.saturation),
            ("lightness", &self.lightness),
            ("brightness", &self.brightness),
            ("initialSurfaceMs", &self.initial_surface_ms),
            ("surfaceMs", &self.surface_ms),
            ("wave.amplitude", &self.wave.amplitude),
        ] {
            span.check(field)?;
        }

        if self.creature_depth.min < 0.0 || self.creature_depth.max > 1.0 {
            return Err(ConfigError::OutsideUnit {
                field: "creatureDepth",
                value: if self.creature_depth.min < 0.0 {
                    self.creature_depth.min
                } else {
                    self.creature_depth.max
                },
            });
        }

        for (field, value) in [
            ("initialSurfaceChance", self.initial_surface_chance),
            ("surfaceFrequency", self.surface_frequency),
            ("turnChance", self.turn_chance),
            ("lureChance", self.lure_chance),
            ("wavePushDepth", self.wave_push_depth),
            ("lureDepth", self.lure_depth),
            ("lureFloor", self.lure_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutsideUnit { field, value });
            }
        }

        let cell_size = self.wave.cell_size;
        if !cell_size.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "wave.cellSize",
            });
        }
        if cell_size < MIN_CELL_SIZE {
            return Err(ConfigError::TooSmall {
                field: "wave.cellSize",
                min: MIN_CELL_SIZE,
                value: cell_size,
            });
        }

        for (field, value) in [
            ("pointer.radius", self.pointer.radius),
            ("pointer.interactionScale", self.pointer.interaction_scale),
            ("pointer.epsilon", self.pointer.epsilon),
            ("frame.defaultStepMs", self.frame.default_step_ms),
            ("frame.maxGapMs", self.frame.max_gap_ms),
            ("pointer.idleCheckMs", self.pointer.idle_check_ms),
            ("frame.watchdogDelayMs", self.frame.watchdog_delay_ms),
            ("persist.stalenessMs", self.persist.staleness_ms),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        for (field, value) in [
            ("creatureSpeed", self.creature_speed.min),
            ("depthEaseRate", self.depth_ease_rate),
            ("ascentRate", self.ascent_rate),
            ("wave.waveSpeed", self.wave.wave_speed),
            ("pointer.maxIntensity", self.pointer.max_intensity),
            ("pointer.baseIntensity", self.pointer.base_intensity),
            ("pointer.intensityJitter", self.pointer.intensity_jitter),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
            if value < 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let decay = self.pointer.decay;
        if !(decay > 0.0 && decay < 1.0) {
            return Err(ConfigError::Decay {
                field: "pointer.decay",
                value: decay,
            });
        }
        Ok(())
    }
}

fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, patch) => *slot = patch,
    }
}
