// THEORY:
// The `Cell` module is the retained form of the grid. Where the immediate path
// samples and draws in one pass, a `CellGrid` keeps one long-lived `Cell` per
// grid position and splits each frame into two steps:
// 1.  **Update**: every cell re-reads its pixel and overwrites its `Sample`.
// 2.  **Display**: every cell turns its current sample into one draw command.
//
// Cells are plain records in a flat arena indexed `row * cols + col`. The grid
// owns them exclusively; nothing else holds a reference across frames. A cell's
// screen position is computed once, when the grid is built, and never moves.
// The arena is only rebuilt when the grid spec itself changes (a new cell size).

pub mod cell {
    use crate::core_modules::config::SessionConfig;
    use crate::core_modules::frame::VideoFrame;
    use crate::core_modules::grid::GridSpec;
    use crate::core_modules::renderer::{CellPlacement, DrawCommand, RenderMode, Surface, render_cell};
    use crate::core_modules::sample::Sample;
    use crate::core_modules::sampler::FrameSampler;

    /// One grid position's sampling-and-rendering unit.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Cell {
        /// The column index of this cell in the grid.
        pub col: u32,
        /// The row index of this cell in the grid.
        pub row: u32,
        /// Top-left canvas pixel, fixed at construction.
        pub screen_x: f32,
        pub screen_y: f32,
        /// Edge length in canvas pixels.
        pub size: f32,
        /// The most recent sample; zeroed until the first update.
        pub sample: Sample,
    }

    impl Cell {
        pub fn new(col: u32, row: u32, grid: &GridSpec) -> Self {
            let (screen_x, screen_y) = grid.screen_position(col, row);
            Self {
                col,
                row,
                screen_x,
                screen_y,
                size: grid.cell_size as f32,
                sample: Sample::default(),
            }
        }

        pub fn placement(&self) -> CellPlacement {
            CellPlacement {
                screen_x: self.screen_x,
                screen_y: self.screen_y,
                size: self.size,
            }
        }

        /// Overwrites the sample with this frame's pixel.
        pub fn update(&mut self, frame: &VideoFrame<'_>, sampler: &FrameSampler) {
            self.sample = sampler.sample(frame, self.col, self.row);
        }

        pub fn display(&self, mode: RenderMode, config: &SessionConfig) -> DrawCommand {
            render_cell(mode, &self.sample, self.placement(), config)
        }
    }

    /// Arena of cells for one grid spec.
    pub struct CellGrid {
        grid: GridSpec,
        sampler: FrameSampler,
        cells: Vec<Cell>,
    }

    impl CellGrid {
        pub fn new(grid: GridSpec) -> Self {
            let mut cells = Vec::with_capacity(grid.cell_count());
            cells.extend(grid.cells().map(|(col, row)| Cell::new(col, row, &grid)));
            Self {
                grid,
                sampler: FrameSampler::new(grid),
                cells,
            }
        }

        pub fn grid(&self) -> &GridSpec {
            &self.grid
        }

        pub fn len(&self) -> usize {
            self.cells.len()
        }

        pub fn is_empty(&self) -> bool {
            self.cells.is_empty()
        }

        pub fn cells(&self) -> &[Cell] {
            &self.cells
        }

        pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
            if row >= self.grid.rows || col >= self.grid.cols {
                return None;
            }
            self.cells.get(self.grid.index(col, row))
        }

        /// Update pass: every cell re-samples the frame in place.
        pub fn refresh(&mut self, frame: &VideoFrame<'_>) {
            let sampler = self.sampler;
            for cell in &mut self.cells {
                cell.update(frame, &sampler);
            }
        }

        /// Display pass: one draw command per cell, row-major.
        pub fn display<S: Surface + ?Sized>(
            &self,
            mode: RenderMode,
            config: &SessionConfig,
            surface: &mut S,
        ) -> usize {
            for cell in &self.cells {
                surface.draw(&cell.display(mode, config));
            }
            self.cells.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::cell::*;
    use crate::core_modules::config::SessionConfig;
    use crate::core_modules::frame::VideoFrame;
    use crate::core_modules::grid::GridSpec;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::renderer::{DrawList, RenderMode};

    #[test]
    fn cells_get_fixed_screen_positions() {
        let grid = GridSpec::new(30, 20, 30, 20, 10).unwrap();
        let cells = CellGrid::new(grid);
        assert_eq!(cells.len(), 6);

        let cell = cells.get(1, 2).unwrap();
        assert_eq!((cell.col, cell.row), (2, 1));
        assert_eq!((cell.screen_x, cell.screen_y), (20.0, 10.0));
        assert!(cells.get(2, 0).is_none());
    }

    #[test]
    fn refresh_overwrites_samples_in_place() {
        let grid = GridSpec::new(2, 1, 2, 1, 1).unwrap();
        let mut cells = CellGrid::new(grid);

        let first = [10, 10, 10, 255, 20, 20, 20, 255];
        cells.refresh(&VideoFrame::new(&first, 2, 1).unwrap());
        assert_eq!(cells.get(0, 1).unwrap().sample.pixel(), Pixel::opaque(20, 20, 20));

        let second = [0, 0, 0, 255, 90, 0, 0, 255];
        cells.refresh(&VideoFrame::new(&second, 2, 1).unwrap());
        assert_eq!(cells.get(0, 1).unwrap().sample.pixel(), Pixel::opaque(90, 0, 0));
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn display_emits_one_command_per_cell() {
        let grid = GridSpec::new(4, 4, 4, 4, 2).unwrap();
        let mut cells = CellGrid::new(grid);
        let buffer = vec![128u8; 4 * 4 * 4];
        cells.refresh(&VideoFrame::new(&buffer, 4, 4).unwrap());

        let mut list = DrawList::new();
        let drawn = cells.display(RenderMode::Greyscale, &SessionConfig::new(4, 4), &mut list);
        assert_eq!(drawn, 4);
        assert_eq!(list.commands.len(), 4);
    }
}
