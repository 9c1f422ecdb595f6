//! Height-field swell sampled by bilinear interpolation.

use crate::config::WaveConfig;
use crate::pointer::PointerPosition;

/// One grid point: fixed pixel position, mutable height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveCell {
    pub height: f64,
    pub x: f64,
    pub y: f64,
}

/// Upper bound on grid points.
pub const MAX_CELLS: usize = 1 << 22;

/// Row-major grid covering the viewport plus one extra row and column.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveGrid {
    cols: usize,
    rows: usize,
    cell_size: f64,
    cells: Vec<WaveCell>,
}

impl WaveGrid {
    /// Build a flat grid for a `width` x `height` pixel surface.
    ///
    /// A surface that would need more than [`MAX_CELLS`] points collapses to a
    /// single flat cell.
    pub fn new(width: f64, height: f64, cell_size: f64) -> Self {
        let mut cols = grid_extent(width, cell_size);
        let mut rows = grid_extent(height, cell_size);
        match cols.checked_mul(rows) {
            Some(count) if count <= MAX_CELLS => {}
            _ => {
                log::warn!("wave grid of {cols}x{rows} cells is too large; using a flat surface");
                (cols, rows) = (1, 1);
            }
        }
        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(WaveCell {
                    height: 0.0,
                    x: col as f64 * cell_size,
                    y: row as f64 * cell_size,
                });
            }
        }
        Self {
            cols,
            rows,
            cell_size,
            cells,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cells(&self) -> &[WaveCell] {
        &self.cells
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&WaveCell> {
        if col < self.cols && row < self.rows {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Interpolated height at pixel `(x, y)`; `0.0` outside the grid interior.
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() || self.cols < 2 || self.rows < 2 {
            return 0.0;
        }
        let gx = (x / self.cell_size).floor();
        let gy = (y / self.cell_size).floor();
        if gx < 0.0 || gy < 0.0 || gx >= (self.cols - 1) as f64 || gy >= (self.rows - 1) as f64 {
            return 0.0;
        }
        let (col, row) = (gx as usize, gy as usize);
        let fx = x / self.cell_size - gx;
        let fy = y / self.cell_size - gy;

        let at = |c: usize, r: usize| self.cells[r * self.cols + c].height;
        let h00 = at(col, row);
        let h10 = at(col + 1, row);
        let h01 = at(col, row + 1);
        let h11 = at(col + 1, row + 1);

        let top = h00 * (1.0 - fx) + h10 * fx;
        let bottom = h01 * (1.0 - fx) + h11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

fn grid_extent(pixels: f64, cell_size: f64) -> usize {
    if !pixels.is_finite() || pixels <= 0.0 || !cell_size.is_finite() || cell_size <= 0.0 {
        return 1;
    }
    // float-to-int casts saturate
    ((pixels / cell_size).ceil() as usize).saturating_add(1)
}

/// The swell: a [`WaveGrid`] plus the monotonically increasing phase seed.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveField {
    grid: WaveGrid,
    seed: f64,
}

impl WaveField {
    pub fn new(width: f64, height: f64, seed: f64, config: &WaveConfig) -> Self {
        Self {
            grid: WaveGrid::new(width, height, config.cell_size),
            seed,
        }
    }

    pub fn grid(&self) -> &WaveGrid {
        &self.grid
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: f64) {
        if seed.is_finite() {
            self.seed = seed;
        }
    }

    /// Replace the grid for new surface dimensions. Heights restart flat and
    /// are repopulated by the next [`advance`](Self::advance).
    pub fn rebuild(&mut self, width: f64, height: f64, config: &WaveConfig) {
        self.grid = WaveGrid::new(width, height, config.cell_size);
        log::debug!(
            "wave grid rebuilt: {}x{} cells",
            self.grid.cols,
            self.grid.rows
        );
    }

    /// Advance the seed by `delta_ms` and recompute every cell.
    ///
    /// `disturbance` is the pointer position and intensity, when active.
    pub fn advance(
        &mut self,
        delta_ms: f64,
        disturbance: Option<(PointerPosition, f64)>,
        config: &WaveConfig,
        pointer_radius: f64,
    ) {
        if delta_ms.is_finite() {
            self.seed += config.wave_speed * delta_ms;
        }
        let seed = self.seed;
        let cols = self.grid.cols;

        for (index, cell) in self.grid.cells.iter_mut().enumerate() {
            let col = (index % cols) as f64;
            let row = (index / cols) as f64;
            let mut height = ambient_height(col, row, seed, config);

            if let Some((pointer, intensity)) = disturbance {
                height += ripple(cell, pointer, intensity, seed, config, pointer_radius);
            }
            cell.height = height;
        }
    }

    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        self.grid.height_at(x, y)
    }
}

/// Sum of `wave_count` harmonics evaluated at grid index `(col, row)`.
fn ambient_height(col: f64, row: f64, seed: f64, config: &WaveConfig) -> f64 {
    (0..config.wave_count)
        .map(|i| {
            let harmonic = f64::from(i + 1);
            let frequency = config.base_frequency / harmonic;
            let amplitude = config.amplitude_of(i);
            (col * frequency * harmonic + seed).sin()
                * (row * frequency * harmonic + seed * 1.5).cos()
                * amplitude
        })
        .sum()
}

fn ripple(
    cell: &WaveCell,
    pointer: PointerPosition,
    intensity: f64,
    seed: f64,
    config: &WaveConfig,
    radius: f64,
) -> f64 {
    let distance = pointer.distance_to(cell.x, cell.y);
    if distance.is_nan() || distance >= radius {
        return 0.0;
    }
    let falloff = 1.0 - distance / radius;
    intensity * falloff * (distance * config.ripple_wavenumber - seed * config.ripple_phase_rate).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(width: f64, height: f64) -> WaveField {
        WaveField::new(width, height, 3.0, &WaveConfig::default())
    }

    #[test]
    fn grid_covers_viewport_edges() {
        let grid = WaveGrid::new(100.0, 61.0, 30.0);
        assert_eq!((grid.cols(), grid.rows()), (5, 4));
        let last = grid.cell(4, 3).unwrap();
        assert_eq!((last.x, last.y), (120.0, 90.0));
        assert!(grid.cell(5, 0).is_none());
    }

    #[test]
    fn oversized_grid_collapses_to_flat_cell() {
        let config = WaveConfig {
            cell_size: 1e-9,
            ..WaveConfig::default()
        };
        let mut field = WaveField::new(1920.0, 1080.0, 0.0, &config);
        assert_eq!((field.grid().cols(), field.grid().rows()), (1, 1));
        field.advance(16.0, None, &config, 200.0);
        assert_eq!(field.height_at(10.0, 10.0), 0.0);

        let grid = WaveGrid::new(f64::MAX, f64::MAX, 1.0);
        assert_eq!(grid.cells().len(), 1);
    }

    #[test]
    fn rebuild_replaces_grid() {
        let config = WaveConfig::default();
        let mut field = field(90.0, 90.0);
        field.advance(16.0, None, &config, 200.0);
        field.rebuild(300.0, 30.0, &config);
        assert_eq!((field.grid().cols(), field.grid().rows()), (11, 2));
        assert!(field.grid().cells().iter().all(|c| c.height == 0.0));
    }

    #[test]
    fn height_outside_interior_is_zero() {
        let config = WaveConfig::default();
        let mut field = field(90.0, 90.0);
        field.advance(16.0, None, &config, 200.0);
        for (x, y) in [(-0.1, 10.0), (10.0, -5.0), (90.0, 10.0), (10.0, 95.0), (f64::NAN, 1.0)] {
            assert_eq!(field.height_at(x, y), 0.0, "({x}, {y})");
        }
    }

    #[test]
    fn height_matches_corners() {
        let config = WaveConfig::default();
        let mut field = field(90.0, 90.0);
        field.advance(16.0, None, &config, 200.0);
        let corner = field.grid().cell(1, 1).unwrap();
        assert!((field.height_at(30.0, 30.0) - corner.height).abs() < 1e-12);
    }

    #[test]
    fn interpolation_is_linear_along_edges() {
        let mut grid = WaveGrid::new(30.0, 30.0, 30.0);
        grid.cells[0].height = 0.0;
        grid.cells[1].height = 10.0;
        grid.cells[2].height = 0.0;
        grid.cells[3].height = 10.0;
        assert!((grid.height_at(15.0, 0.0) - 5.0).abs() < 1e-12);
        assert!((grid.height_at(7.5, 29.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn ripple_only_touches_cells_in_radius() {
        let config = WaveConfig::default();
        let mut calm = field(600.0, 600.0);
        let mut disturbed = calm.clone();
        let pointer = PointerPosition { x: 0.0, y: 0.0 };

        calm.advance(16.0, None, &config, 100.0);
        disturbed.advance(16.0, Some((pointer, 10.0)), &config, 100.0);

        for (a, b) in calm.grid().cells().iter().zip(disturbed.grid().cells()) {
            if pointer.distance_to(a.x, a.y) >= 100.0 {
                assert_eq!(a.height, b.height);
            }
        }
        let changed = calm
            .grid()
            .cells()
            .iter()
            .zip(disturbed.grid().cells())
            .filter(|(a, b)| a.height != b.height)
            .count();
        assert!(changed > 0);

        let (before, after) = (calm.grid().cell(1, 1).unwrap(), disturbed.grid().cell(1, 1).unwrap());
        let d = 30.0f64.hypot(30.0);
        let seed = disturbed.seed();
        let expected = 10.0 * (1.0 - d / 100.0) * (d * 0.05 - seed * 2.0).sin();
        assert!(expected.abs() > 1e-3);
        assert!((after.height - before.height - expected).abs() < 1e-9);
    }

    #[test]
    fn seed_advances_with_time() {
        let config = WaveConfig::default();
        let mut field = field(60.0, 60.0);
        field.advance(40.0, None, &config, 200.0);
        assert!((field.seed() - (3.0 + 40.0 * config.wave_speed)).abs() < 1e-12);
    }
}
