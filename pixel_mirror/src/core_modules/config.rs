// THEORY:
// `SessionConfig` is the single record of everything a user can tweak while the
// mirror runs: cell size, disk radius, HSB saturation, presentation mode, and
// whether the grid is retained between frames. Fields are private; the setters
// clamp to the documented bounds so no other module has to re-validate.
//
// Key handlers do not poke at settings directly. A key press becomes a
// `KeyCommand`, and `SessionConfig::apply` is the one place that interprets it.
// The pipeline reads the config at the start of every frame, so a change made
// between frames shows up on the next one.

use log::debug;

use crate::core_modules::renderer::RenderMode;

pub const DEFAULT_CANVAS_WIDTH: u32 = 640;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 480;

pub const DEFAULT_CELL_SIZE: u32 = 16;
pub const MIN_CELL_SIZE: u32 = 2;
pub const MAX_CELL_SIZE: u32 = 64;
pub const CELL_SIZE_STEP: u32 = 2;

pub const DEFAULT_DISK_RADIUS: u32 = 6;
pub const MIN_DISK_RADIUS: u32 = 1;
pub const MAX_DISK_RADIUS: u32 = 32;
pub const DISK_RADIUS_STEP: u32 = 1;
pub const DEFAULT_DISK_THICKNESS: f32 = 2.0;

pub const DEFAULT_SATURATION: f32 = 100.0;
pub const MAX_SATURATION: f32 = 100.0;

/// Whether cells are rebuilt from scratch each frame or kept in an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridMode {
    /// Sample and draw each cell directly.
    #[default]
    Immediate,
    /// Keep a long-lived `CellGrid`, update it in place, then display it.
    Retained,
}

/// Discrete user input understood by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    GrowCells,
    ShrinkCells,
    GrowDisks,
    ShrinkDisks,
    NextMode,
    ToggleGridMode,
}

impl KeyCommand {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '+' | '=' => Some(KeyCommand::GrowCells),
            '-' | '_' => Some(KeyCommand::ShrinkCells),
            ']' => Some(KeyCommand::GrowDisks),
            '[' => Some(KeyCommand::ShrinkDisks),
            'm' | 'M' => Some(KeyCommand::NextMode),
            'g' | 'G' => Some(KeyCommand::ToggleGridMode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    canvas_width: u32,
    canvas_height: u32,
    cell_size: u32,
    disk_radius: u32,
    disk_thickness: f32,
    saturation: f32,
    mode: RenderMode,
    grid_mode: GridMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            disk_radius: DEFAULT_DISK_RADIUS,
            disk_thickness: DEFAULT_DISK_THICKNESS,
            saturation: DEFAULT_SATURATION,
            mode: RenderMode::default(),
            grid_mode: GridMode::default(),
        }
    }
}

impl SessionConfig {
    /// Canvas dimensions are fixed for the session.
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            canvas_width: canvas_width.max(1),
            canvas_height: canvas_height.max(1),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.set_cell_size(cell_size);
        self
    }

    pub fn with_grid_mode(mut self, grid_mode: GridMode) -> Self {
        self.set_grid_mode(grid_mode);
        self
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    pub fn canvas(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn disk_radius(&self) -> u32 {
        self.disk_radius
    }

    pub fn disk_thickness(&self) -> f32 {
        self.disk_thickness
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn grid_mode(&self) -> GridMode {
        self.grid_mode
    }

    /// Clamped to `[MIN_CELL_SIZE, MAX_CELL_SIZE]`. Returns the stored value.
    pub fn set_cell_size(&mut self, cell_size: u32) -> u32 {
        self.cell_size = clamp_logged("cell_size", cell_size, MIN_CELL_SIZE, MAX_CELL_SIZE);
        self.cell_size
    }

    /// Clamped to `[MIN_DISK_RADIUS, MAX_DISK_RADIUS]`. Returns the stored value.
    pub fn set_disk_radius(&mut self, radius: u32) -> u32 {
        self.disk_radius = clamp_logged("disk_radius", radius, MIN_DISK_RADIUS, MAX_DISK_RADIUS);
        self.disk_radius
    }

    pub fn set_disk_thickness(&mut self, thickness: f32) {
        self.disk_thickness = if thickness.is_finite() { thickness.max(0.0) } else { DEFAULT_DISK_THICKNESS };
    }

    /// Clamped to `[0, 100]` percent.
    pub fn set_saturation(&mut self, saturation: f32) -> f32 {
        let clamped = if saturation.is_finite() {
            saturation.clamp(0.0, MAX_SATURATION)
        } else {
            DEFAULT_SATURATION
        };
        if clamped != saturation {
            debug!("saturation {saturation} clamped to {clamped}");
        }
        self.saturation = clamped;
        clamped
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn set_grid_mode(&mut self, grid_mode: GridMode) {
        self.grid_mode = grid_mode;
    }

    pub fn apply(&mut self, key: KeyCommand) {
        match key {
            KeyCommand::GrowCells => {
                self.set_cell_size(self.cell_size.saturating_add(CELL_SIZE_STEP));
            }
            KeyCommand::ShrinkCells => {
                self.set_cell_size(self.cell_size.saturating_sub(CELL_SIZE_STEP));
            }
            KeyCommand::GrowDisks => {
                self.set_disk_radius(self.disk_radius.saturating_add(DISK_RADIUS_STEP));
            }
            KeyCommand::ShrinkDisks => {
                self.set_disk_radius(self.disk_radius.saturating_sub(DISK_RADIUS_STEP));
            }
            KeyCommand::NextMode => self.mode = self.mode.next(),
            KeyCommand::ToggleGridMode => {
                self.grid_mode = match self.grid_mode {
                    GridMode::Immediate => GridMode::Retained,
                    GridMode::Retained => GridMode::Immediate,
                }
            }
        }
        debug!("applied {key:?}: {self:?}");
    }
}

fn clamp_logged(name: &str, value: u32, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        debug!("{name} {value} clamped to {clamped}");
    }
    clamped
}
