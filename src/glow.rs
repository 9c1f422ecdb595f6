//! Presentation values derived from simulation state.
//!
//! Nothing here mutates the simulation; the canvas painter turns these into
//! gradients and arcs.

use crate::config::SeaConfig;
use crate::creature::Creature;
use crate::pointer::PointerTracker;
use crate::wave::WaveField;

/// How one creature should be painted this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatureGlow {
    pub draw_x: f64,
    pub draw_y: f64,
    pub glow_radius: f64,
    /// Core dot radius.
    pub core_radius: f64,
    pub opacity: f64,
    pub hue: f64,
    pub saturation: f64,
    /// Lightness of the glow body, clamped to 20..=90.
    pub lightness: f64,
    /// Wave height amplified by nearby pointer activity.
    pub wave_response: f64,
    pub wave_height: f64,
    pub brightness: f64,
}

impl CreatureGlow {
    pub fn new(creature: &Creature, field: &WaveField, pointer: &PointerTracker, config: &SeaConfig) -> Self {
        let wave_height = field.height_at(creature.x, creature.y);
        let mut wave_response = wave_height;

        if let Some(position) = pointer.engaged_position() {
            let reach = config.pointer.interaction_radius();
            let distance = position.distance_to(creature.x, creature.y);
            if distance < reach {
                let shallowness = 1.0 - (creature.depth * 2.0).min(1.0);
                let closeness = 1.0 - distance / reach;
                wave_response = wave_height * (1.0 + shallowness * closeness * 3.0);
            }
        }

        let rise = 1.0 - creature.depth;
        let glow = &config.glow;
        let (opacity, glow_radius, lightness) = if creature.at_surface {
            (
                glow.surface_opacity,
                glow.surface_radius,
                creature.color.lightness + 20.0,
            )
        } else {
            (
                glow.deep_opacity + rise * 0.15,
                glow.deep_radius + rise * 15.0,
                creature.color.lightness - 10.0 + rise * 30.0,
            )
        };

        let (draw_x, draw_y) = if creature.at_surface {
            (creature.x + wave_height * 0.5, creature.y + wave_height * 0.5)
        } else {
            (creature.x, creature.y)
        };

        Self {
            draw_x,
            draw_y,
            glow_radius,
            core_radius: creature.size * (1.0 - creature.depth * 0.5),
            opacity,
            hue: creature.color.hue,
            saturation: creature.color.saturation,
            lightness: lightness.clamp(20.0, 90.0),
            wave_response,
            wave_height,
            brightness: creature.brightness_factor,
        }
    }

    pub fn center_color(&self) -> String {
        hsla(
            self.hue,
            self.saturation,
            (self.lightness + 20.0).min(95.0),
            self.opacity * self.brightness,
        )
    }

    pub fn mid_color(&self) -> String {
        hsla(
            self.hue,
            self.saturation,
            self.lightness,
            self.opacity * 0.5 * self.brightness,
        )
    }

    pub fn outer_color(&self) -> String {
        hsla(self.hue, self.saturation - 20.0, self.lightness - 20.0, 0.0)
    }

    pub fn core_color(&self) -> String {
        hsla(
            self.hue,
            self.saturation,
            (self.lightness + 30.0).min(98.0),
            (self.opacity + 0.3) * self.brightness,
        )
    }
}

/// Highlight dot revealing a wave crest near a surfaced creature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub opacity: f64,
}

/// Halo a surfaced creature casts on the surrounding water.
#[derive(Debug, Clone, PartialEq)]
pub struct Illumination {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub intensity: f64,
    pub hue: f64,
    pub highlights: Vec<Highlight>,
}

impl Illumination {
    /// `None` unless the creature is surfaced.
    pub fn new(
        creature: &Creature,
        wave_height: f64,
        field: &WaveField,
        pointer: &PointerTracker,
        config: &SeaConfig,
        width: f64,
        height: f64,
    ) -> Option<Self> {
        if !creature.at_surface {
            return None;
        }
        let radius = config.glow.surface_radius * 2.0;
        let mouse_radius = config.pointer.radius;
        let engaged = pointer.engaged_position();

        let mut intensity = 0.15 + wave_height.abs() * 0.02;
        if let Some(position) = engaged {
            let distance = position.distance_to(creature.x, creature.y);
            if distance < mouse_radius * 2.0 {
                intensity += (1.0 - (distance / (mouse_radius * 2.0)).min(1.0)) * 0.2;
            }
        }

        let near_pointer = engaged.filter(|p| {
            (creature.x - p.x).abs() < mouse_radius * 2.0 && (creature.y - p.y).abs() < mouse_radius * 2.0
        });

        let lattice = config.wave.cell_size / 2.0;
        let start_x = ((creature.x - radius) / lattice).floor().max(0.0) as i64;
        let start_y = ((creature.y - radius) / lattice).floor().max(0.0) as i64;
        let end_x = ((width / lattice).ceil()).min(((creature.x + radius) / lattice).ceil()) as i64;
        let end_y = ((height / lattice).ceil()).min(((creature.y + radius) / lattice).ceil()) as i64;

        let mut highlights = Vec::new();
        for gy in start_y..end_y {
            for gx in start_x..end_x {
                let px = gx as f64 * lattice;
                let py = gy as f64 * lattice;
                let distance = (px - creature.x).hypot(py - creature.y);
                if distance >= radius {
                    continue;
                }

                let mut crest = field.height_at(px, py);
                if let Some(p) = near_pointer {
                    let to_pointer = p.distance_to(px, py);
                    if to_pointer < mouse_radius {
                        crest *= 1.0 + (1.0 - to_pointer / mouse_radius);
                    }
                }
                if crest <= 1.0 {
                    continue;
                }

                let scale = if near_pointer.is_some() { 0.6 } else { 0.3 };
                highlights.push(Highlight {
                    x: px,
                    y: py,
                    radius: 1.0 + crest.abs() * scale,
                    opacity: (1.0 - distance / radius) * 0.2 * (crest * 0.3).min(1.0),
                });
            }
        }

        Some(Self {
            x: creature.x,
            y: creature.y,
            radius,
            intensity,
            hue: creature.color.hue,
            highlights,
        })
    }

    pub fn inner_color(&self) -> String {
        rgba(hsl_to_rgb(self.hue, 70.0, 60.0), self.intensity * 1.5)
    }

    pub fn outer_color(&self) -> String {
        rgba(hsl_to_rgb(self.hue, 100.0, 30.0), 0.0)
    }

    pub fn highlight_color(&self, highlight: &Highlight) -> String {
        rgba(hsl_to_rgb(self.hue, 80.0, 80.0), highlight.opacity)
    }
}

/// Faint marker of the pointer's disturbance: the ripple reach and a disc
/// sized by the current intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerHalo {
    pub x: f64,
    pub y: f64,
    pub reach: f64,
    pub core_radius: f64,
}

impl PointerHalo {
    pub const RING_COLOR: &'static str = "rgba(100, 255, 220, 0.1)";
    pub const CORE_COLOR: &'static str = "rgba(100, 255, 220, 0.05)";

    /// `None` while the pointer is idle or off the page.
    pub fn new(pointer: &PointerTracker, config: &SeaConfig) -> Option<Self> {
        let position = pointer.engaged_position()?;
        Some(Self {
            x: position.x,
            y: position.y,
            reach: config.pointer.radius,
            core_radius: pointer.intensity() * 2.0,
        })
    }
}

/// Convert HSL (degrees, percent, percent) to 8-bit RGB channels.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 360.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    if s == 0.0 {
        let v = to_channel(l);
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        to_channel(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_channel(hue_to_channel(p, q, h)),
        to_channel(hue_to_channel(p, q, h - 1.0 / 3.0)),
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn hsla(h: f64, s: f64, l: f64, a: f64) -> String {
    format!("hsla({h:.0}, {s:.0}%, {l:.0}%, {:.3})", a.clamp(0.0, 1.0))
}

fn rgba([r, g, b]: [u8; 3], a: f64) -> String {
    format!("rgba({r}, {g}, {b}, {:.3})", a.clamp(0.0, 1.0))
}

/// Indices of `creatures` ordered deepest first.
pub fn paint_order(creatures: &[Creature]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..creatures.len()).collect();
    order.sort_by(|&a, &b| creatures[b].depth.total_cmp(&creatures[a].depth));
    order
}
