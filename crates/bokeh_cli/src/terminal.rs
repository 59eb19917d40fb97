//! ASCII surface
//!
//! A character grid that composites filled circles by alpha and prints the
//! result with a density ramp.

use bokeh::BokehSurface;
use bokeh_core::{Color, Point};
use std::fmt;

/// Glyphs from empty to fully covered
const RAMP: &[u8] = b" .:-=+*#%@";

pub struct AsciiSurface {
    columns: usize,
    rows: usize,
    cell_width: f32,
    cell_height: f32,
    coverage: Vec<f32>,
}

impl AsciiSurface {
    pub fn new(columns: u16, rows: u16, cell_width: f32, cell_height: f32) -> Self {
        let columns = columns as usize;
        let rows = rows as usize;
        Self {
            columns,
            rows,
            cell_width,
            cell_height,
            coverage: vec![0.0; columns * rows],
        }
    }

    pub fn clear(&mut self) {
        self.coverage.fill(0.0);
    }

    /// Coverage of one cell in 0..=1
    pub fn coverage(&self, column: usize, row: usize) -> f32 {
        self.coverage
            .get(row * self.columns + column)
            .copied()
            .unwrap_or(0.0)
    }

    fn glyph(coverage: f32) -> char {
        let last = RAMP.len() - 1;
        let slot = (coverage.clamp(0.0, 1.0) * last as f32).round() as usize;
        RAMP[slot.min(last)] as char
    }
}

impl BokehSurface for AsciiSurface {
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if self.columns == 0 || self.rows == 0 {
            return;
        }
        let alpha = color.a.clamp(0.0, 1.0);

        // Only visit cells inside the circle's bounding box
        let first_col = ((center.x - radius) / self.cell_width).floor().max(0.0) as usize;
        let last_col = ((center.x + radius) / self.cell_width).ceil().max(0.0) as usize;
        let first_row = ((center.y - radius) / self.cell_height).floor().max(0.0) as usize;
        let last_row = ((center.y + radius) / self.cell_height).ceil().max(0.0) as usize;

        for row in first_row..last_row.min(self.rows) {
            let y = (row as f32 + 0.5) * self.cell_height;
            for column in first_col..last_col.min(self.columns) {
                let x = (column as f32 + 0.5) * self.cell_width;
                let (dx, dy) = (x - center.x, y - center.y);
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let cell = &mut self.coverage[row * self.columns + column];
                *cell += alpha * (1.0 - *cell);
            }
        }
    }
}

impl fmt::Display for AsciiSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.coverage.chunks(self.columns.max(1)) {
            let line: String = row.iter().map(|&c| Self::glyph(c)).collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
