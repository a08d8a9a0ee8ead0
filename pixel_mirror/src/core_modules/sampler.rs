// THEORY:
// The `FrameSampler` walks a grid over a video frame and turns each cell into a
// `Sample`. It is the pull side of the pipeline: the grid says where to look, the
// frame says what is there, and the sampler pairs them up.
//
// It holds no per-frame state, so the same sampler can be used for every frame of
// a session as long as the grid does not change.

use crate::core_modules::frame::VideoFrame;
use crate::core_modules::grid::GridSpec;
use crate::core_modules::sample::Sample;

#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    grid: GridSpec,
}

impl FrameSampler {
    pub fn new(grid: GridSpec) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Byte offset into the frame buffer for one cell.
    pub fn offset(&self, frame: &VideoFrame<'_>, col: u32, row: u32) -> usize {
        let (src_x, src_y) = self.grid.source_coords(col, row);
        frame.offset(src_x, src_y)
    }

    pub fn sample(&self, frame: &VideoFrame<'_>, col: u32, row: u32) -> Sample {
        debug_assert_eq!(
            frame.dimensions(),
            (self.grid.capture_width, self.grid.capture_height),
            "frame does not match the grid's capture size"
        );
        let (src_x, src_y) = self.grid.source_coords(col, row);
        Sample::from_pixel(frame.pixel_at(src_x, src_y))
    }

    /// Samples every cell, row-major.
    pub fn sample_all(&self, frame: &VideoFrame<'_>) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(self.grid.cell_count());
        samples.extend(self.grid.cells().map(|(col, row)| self.sample(frame, col, row)));
        samples
    }
}
