// THEORY:
// The `pipeline` module is the top-level API of the mirror. A host creates one
// `MirrorPipeline` per session, feeds it a frame and a surface once per animation
// tick, and forwards pointer and key input between ticks.
//
// Each `render_frame` call runs the whole stack synchronously:
// Stage 1: check the frame against the session's capture size.
// Stage 2: rederive the grid if the cell size changed since the last frame.
// Stage 3: set up the frame on the surface (lights for the disk mode).
// Stage 4: sample, classify and draw every cell, either directly (immediate) or
//          through the retained `CellGrid` (update then display).
//
// Nothing is carried between frames except the config, the pointer, the grid
// spec, and in retained mode the cell arena.

use log::{debug, trace};

use crate::core_modules::cell::cell::CellGrid;
use crate::core_modules::frame::VideoFrame;
use crate::core_modules::grid::GridSpec;
use crate::core_modules::lighting::LightRig;
use crate::core_modules::renderer::{CellPlacement, Surface, render_cell};
use crate::core_modules::sampler::FrameSampler;
use crate::error::MirrorError;

// Re-export key data structures for the public API.
pub use crate::core_modules::config::{GridMode, KeyCommand, SessionConfig};
pub use crate::core_modules::renderer::{DrawCommand, DrawList, Fill, RenderMode};
pub use crate::core_modules::sample::Sample;

/// Summary of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub cols: u32,
    pub rows: u32,
    pub cells_drawn: usize,
    /// Average sample brightness over all cells; 0 for an empty grid.
    pub mean_brightness: f32,
}

/// The main, top-level struct for the mirror.
pub struct MirrorPipeline {
    config: SessionConfig,
    capture_width: u32,
    capture_height: u32,
    grid: GridSpec,
    cell_grid: Option<CellGrid>,
    pointer: (f32, f32),
    frame_index: u64,
}

impl MirrorPipeline {
    pub fn new(
        config: SessionConfig,
        capture_width: u32,
        capture_height: u32,
    ) -> Result<Self, MirrorError> {
        if capture_width == 0 || capture_height == 0 {
            return Err(MirrorError::EmptyFrame);
        }
        let grid = Self::derive_grid(&config, capture_width, capture_height)?;
        let pointer = (
            config.canvas_width() as f32 / 2.0,
            config.canvas_height() as f32 / 2.0,
        );
        Ok(Self {
            config,
            capture_width,
            capture_height,
            grid,
            cell_grid: None,
            pointer,
            frame_index: 0,
        })
    }

    fn derive_grid(
        config: &SessionConfig,
        capture_width: u32,
        capture_height: u32,
    ) -> Result<GridSpec, MirrorError> {
        let grid = GridSpec::new(
            config.canvas_width(),
            config.canvas_height(),
            capture_width,
            capture_height,
            config.cell_size(),
        )?;
        debug!(
            "grid derived: {}x{} cells of {}px ({:?})",
            grid.cols, grid.rows, grid.cell_size, grid.strategy
        );
        Ok(grid)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Changes apply from the next `render_frame`.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn apply_key(&mut self, key: KeyCommand) {
        self.config.apply(key);
    }

    /// Pointer position in canvas pixels; drives the disk mode's point light.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = (x, y);
    }

    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn capture_size(&self) -> (u32, u32) {
        (self.capture_width, self.capture_height)
    }

    /// The retained arena, once a frame has been rendered in retained mode.
    pub fn cell_grid(&self) -> Option<&CellGrid> {
        self.cell_grid.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_index
    }

    pub fn render_frame<S: Surface + ?Sized>(
        &mut self,
        frame: &VideoFrame<'_>,
        surface: &mut S,
    ) -> Result<FrameReport, MirrorError> {
        // Stage 1: the capture collaborator must keep its resolution.
        if frame.dimensions() != self.capture_size() {
            return Err(MirrorError::CaptureSizeChanged {
                expected: self.capture_size(),
                actual: frame.dimensions(),
            });
        }

        // Stage 2: pick up config changes made since the last frame.
        if self.grid.cell_size != self.config.cell_size() {
            self.grid = Self::derive_grid(&self.config, self.capture_width, self.capture_height)?;
        }

        // Stage 3: per-frame surface setup.
        let mode = self.config.mode();
        let lights = mode
            .is_3d()
            .then(|| LightRig::tracking_pointer(self.pointer, self.config.canvas()));
        surface.begin_frame(lights.as_ref());

        // Stage 4: one command per cell.
        let brightness_sum = match self.config.grid_mode() {
            GridMode::Immediate => {
                self.cell_grid = None;
                self.draw_immediate(frame, surface)
            }
            GridMode::Retained => self.draw_retained(frame, surface),
        };

        let cells_drawn = self.grid.cell_count();
        let mean_brightness = if cells_drawn == 0 {
            0.0
        } else {
            (brightness_sum / cells_drawn as f64) as f32
        };
        let report = FrameReport {
            frame_index: self.frame_index,
            cols: self.grid.cols,
            rows: self.grid.rows,
            cells_drawn,
            mean_brightness,
        };
        self.frame_index += 1;
        trace!("{report:?}");
        Ok(report)
    }

    fn draw_immediate<S: Surface + ?Sized>(&self, frame: &VideoFrame<'_>, surface: &mut S) -> f64 {
        let sampler = FrameSampler::new(self.grid);
        let mode = self.config.mode();
        let size = self.grid.cell_size as f32;
        let mut brightness_sum = 0.0f64;

        for (col, row) in self.grid.cells() {
            let sample = sampler.sample(frame, col, row);
            let (screen_x, screen_y) = self.grid.screen_position(col, row);
            let placement = CellPlacement {
                screen_x,
                screen_y,
                size,
            };
            surface.draw(&render_cell(mode, &sample, placement, &self.config));
            brightness_sum += sample.brightness as f64;
        }
        brightness_sum
    }

    fn draw_retained<S: Surface + ?Sized>(&mut self, frame: &VideoFrame<'_>, surface: &mut S) -> f64 {
        let stale = self
            .cell_grid
            .as_ref()
            .is_none_or(|cells| *cells.grid() != self.grid);
        if stale {
            debug!("building cell arena of {} cells", self.grid.cell_count());
            self.cell_grid = Some(CellGrid::new(self.grid));
        }
        let Some(cells) = self.cell_grid.as_mut() else {
            return 0.0;
        };

        cells.refresh(frame);
        cells.display(self.config.mode(), &self.config, surface);
        cells
            .cells()
            .iter()
            .map(|cell| cell.sample.brightness as f64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_frame(width: u32, height: u32, value: u8) -> Vec<u8> {
        let mut buffer = vec![value; (width * height * 4) as usize];
        for alpha in buffer.iter_mut().skip(3).step_by(4) {
            *alpha = 255;
        }
        buffer
    }

    #[test]
    fn rejects_a_resized_capture() {
        let mut pipeline = MirrorPipeline::new(SessionConfig::new(8, 8), 8, 8).unwrap();
        let buffer = grey_frame(4, 4, 0);
        let frame = VideoFrame::new(&buffer, 4, 4).unwrap();
        let err = pipeline.render_frame(&frame, &mut DrawList::new()).unwrap_err();
        assert!(matches!(err, MirrorError::CaptureSizeChanged { .. }));
    }

    #[test]
    fn every_cell_renders_every_frame() {
        let config = SessionConfig::new(64, 48).with_cell_size(8);
        let mut pipeline = MirrorPipeline::new(config, 64, 48).unwrap();
        let buffer = grey_frame(64, 48, 90);
        let frame = VideoFrame::new(&buffer, 64, 48).unwrap();
        let mut list = DrawList::new();

        let report = pipeline.render_frame(&frame, &mut list).unwrap();
        assert_eq!((report.cols, report.rows), (8, 6));
        assert_eq!(report.cells_drawn, 48);
        assert_eq!(list.commands.len(), 48);
        assert_eq!(report.mean_brightness, 90.0);
        assert_eq!(report.frame_index, 0);
    }

    #[test]
    fn cell_size_change_applies_next_frame() {
        let config = SessionConfig::new(64, 64).with_cell_size(16);
        let mut pipeline = MirrorPipeline::new(config, 64, 64).unwrap();
        let buffer = grey_frame(64, 64, 10);
        let frame = VideoFrame::new(&buffer, 64, 64).unwrap();
        let mut list = DrawList::new();

        pipeline.apply_key(KeyCommand::ShrinkCells);
        assert_eq!(pipeline.grid().cell_size, 16);

        let report = pipeline.render_frame(&frame, &mut list).unwrap();
        assert_eq!(pipeline.grid().cell_size, 14);
        assert_eq!((report.cols, report.rows), (4, 4));
        assert_eq!(report.frame_index, 0);
    }

    #[test]
    fn retained_mode_reuses_the_arena() {
        let config = SessionConfig::new(16, 16)
            .with_cell_size(4)
            .with_grid_mode(GridMode::Retained);
        let mut pipeline = MirrorPipeline::new(config, 16, 16).unwrap();
        let mut list = DrawList::new();

        let dark = grey_frame(16, 16, 0);
        pipeline
            .render_frame(&VideoFrame::new(&dark, 16, 16).unwrap(), &mut list)
            .unwrap();
        let bright = grey_frame(16, 16, 200);
        let report = pipeline
            .render_frame(&VideoFrame::new(&bright, 16, 16).unwrap(), &mut list)
            .unwrap();

        let cells = pipeline.cell_grid().unwrap();
        assert_eq!(cells.len(), 16);
        assert!(cells.cells().iter().all(|c| c.sample.brightness == 200.0));
        assert_eq!(report.frame_index, 1);
        assert_eq!(list.commands.len(), 16);
    }

    #[test]
    fn immediate_and_retained_draw_the_same_commands() {
        let mut buffer = Vec::new();
        for i in 0..(12 * 12) {
            buffer.extend_from_slice(&[(i * 7 % 256) as u8, (i * 3 % 256) as u8, 40, 255]);
        }
        let frame = VideoFrame::new(&buffer, 12, 12).unwrap();

        let mut immediate = MirrorPipeline::new(SessionConfig::new(12, 12).with_cell_size(4), 12, 12).unwrap();
        let mut retained = MirrorPipeline::new(
            SessionConfig::new(12, 12)
                .with_cell_size(4)
                .with_grid_mode(GridMode::Retained),
            12,
            12,
        )
        .unwrap();

        let mut a = DrawList::new();
        let mut b = DrawList::new();
        immediate.render_frame(&frame, &mut a).unwrap();
        retained.render_frame(&frame, &mut b).unwrap();
        assert_eq!(a.commands, b.commands);
    }

    #[test]
    fn disk_mode_lights_follow_the_pointer() {
        let config = SessionConfig::new(40, 40)
            .with_cell_size(10)
            .with_mode(RenderMode::Disk3D);
        let mut pipeline = MirrorPipeline::new(config, 8, 8).unwrap();
        let buffer = grey_frame(8, 8, 255);
        let frame = VideoFrame::new(&buffer, 8, 8).unwrap();
        let mut list = DrawList::new();

        pipeline.set_pointer(40.0, 0.0);
        pipeline.render_frame(&frame, &mut list).unwrap();
        let lights = list.lights.expect("disk mode sets lights");
        assert_eq!(lights.point.position.x, 20.0);
        assert_eq!(lights.point.position.y, -20.0);

        pipeline.config_mut().set_mode(RenderMode::RawColor);
        pipeline.render_frame(&frame, &mut list).unwrap();
        assert!(list.lights.is_none());
    }
}
