// THEORY:
// The `GridSpec` decides how many cells the canvas holds and which buffer pixel
// each cell reads. It is the only place that knows about both coordinate spaces:
// canvas pixels (where cells are drawn) and capture pixels (where samples come
// from).
//
// There are two ways to get "one sample per cell":
// - Stride: the capture has the canvas dimensions, so a cell's top-left canvas
//   pixel is also its source pixel (`src = index * cell_size`).
// - Resample: the capture is smaller (or larger) than the canvas, so grid indices
//   are mapped through the resolution ratio (`src = floor(index / count * dim)`).
//
// Either way the grid is clamped when it is derived so no cell can ever address
// a pixel outside the capture. That clamp is the bounds guarantee for the whole
// sampling path; nothing downstream checks again.

use crate::error::MirrorError;

/// How grid indices are mapped onto capture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Capture and canvas share a coordinate scale.
    Stride,
    /// Capture resolution differs from the canvas; map through the ratio.
    Resample,
}

impl SamplingStrategy {
    pub fn for_dimensions(canvas: (u32, u32), capture: (u32, u32)) -> Self {
        if canvas == capture {
            SamplingStrategy::Stride
        } else {
            SamplingStrategy::Resample
        }
    }
}

/// Cell size plus the column and row counts it yields for one canvas and capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub cell_size: u32,
    pub cols: u32,
    pub rows: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub capture_width: u32,
    pub capture_height: u32,
    pub strategy: SamplingStrategy,
}

impl GridSpec {
    /// Derives the grid. Partial trailing cells are clipped, so
    /// `cols * cell_size <= canvas_width` always holds.
    pub fn new(
        canvas_width: u32,
        canvas_height: u32,
        capture_width: u32,
        capture_height: u32,
        cell_size: u32,
    ) -> Result<Self, MirrorError> {
        if cell_size == 0 {
            return Err(MirrorError::ZeroCellSize);
        }
        let strategy = SamplingStrategy::for_dimensions(
            (canvas_width, canvas_height),
            (capture_width, capture_height),
        );

        let mut cols = canvas_width / cell_size;
        let mut rows = canvas_height / cell_size;
        match strategy {
            SamplingStrategy::Stride => {
                cols = cols.min(capture_width / cell_size);
                rows = rows.min(capture_height / cell_size);
            }
            SamplingStrategy::Resample => {
                cols = cols.min(capture_width);
                rows = rows.min(capture_height);
            }
        }

        Ok(Self {
            cell_size,
            cols,
            rows,
            canvas_width,
            canvas_height,
            capture_width,
            capture_height,
            strategy,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Flat arena index of a cell, row-major.
    pub fn index(&self, col: u32, row: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// The capture pixel a cell samples.
    pub fn source_coords(&self, col: u32, row: u32) -> (u32, u32) {
        match self.strategy {
            SamplingStrategy::Stride => (col * self.cell_size, row * self.cell_size),
            SamplingStrategy::Resample => (
                // Integer form of floor((col / cols) * capture_width).
                (col as u64 * self.capture_width as u64 / self.cols as u64) as u32,
                (row as u64 * self.capture_height as u64 / self.rows as u64) as u32,
            ),
        }
    }

    /// Top-left canvas pixel of a cell.
    pub fn screen_position(&self, col: u32, row: u32) -> (f32, f32) {
        (
            (col * self.cell_size) as f32,
            (row * self.cell_size) as f32,
        )
    }

    /// Every `(col, row)` pair in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| (col, row)))
    }

    /// Width and height of the canvas area the cells tile.
    pub fn covered_area(&self) -> (u32, u32) {
        (self.cols * self.cell_size, self.rows * self.cell_size)
    }
}
