// THEORY:
// The renderer turns one classified `Sample` at one grid position into exactly
// one `DrawCommand`. It is polymorphic over `RenderMode`, a plain runtime value,
// so switching presentation is a config change rather than a code edit.
//
// Draw commands are data. The renderer never touches pixels itself; it hands
// commands to a `Surface`, the seam behind which a real canvas, a GPU backend,
// the CPU `RasterSurface`, or a test recorder can sit.

use std::f32::consts::PI;

use glam::Vec3;

use crate::core_modules::config::SessionConfig;
use crate::core_modules::lighting::LightRig;
use crate::core_modules::palette::PaletteBucket;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::sample::{CHANNEL_MAX, Sample, map_range};

/// HSB brightness used by the rainbow mode, in percent.
pub const RAINBOW_BRIGHTNESS: f32 = 100.0;
/// Depth range disks are spread across, nearest at +100.
pub const DISK_DEPTH_RANGE: (f32, f32) = (-100.0, 100.0);

/// How each cell is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    RawColor,
    Greyscale,
    RainbowHsb,
    PaletteImage,
    Disk3D,
}

impl RenderMode {
    pub const ALL: [RenderMode; 5] = [
        RenderMode::RawColor,
        RenderMode::Greyscale,
        RenderMode::RainbowHsb,
        RenderMode::PaletteImage,
        RenderMode::Disk3D,
    ];

    /// The following mode in declaration order, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn is_3d(self) -> bool {
        matches!(self, RenderMode::Disk3D)
    }

    /// Parses the names the tester accepts on its command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "raw" | "rawcolor" | "raw-color" => Some(RenderMode::RawColor),
            "grey" | "gray" | "greyscale" | "grayscale" => Some(RenderMode::Greyscale),
            "rainbow" | "hsb" | "rainbowhsb" => Some(RenderMode::RainbowHsb),
            "palette" | "image" | "paletteimage" => Some(RenderMode::PaletteImage),
            "disk" | "disks" | "disk3d" | "3d" => Some(RenderMode::Disk3D),
            _ => None,
        }
    }
}

/// Rectangle fill colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Rgba(Pixel),
    /// Hue in degrees, saturation and brightness in percent.
    Hsb {
        hue: f32,
        saturation: f32,
        brightness: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        size: f32,
        fill: Fill,
    },
    Stamp {
        x: f32,
        y: f32,
        size: f32,
        bucket: PaletteBucket,
    },
    Disk {
        /// Centre, in canvas-centred coordinates.
        position: Vec3,
        rotation_x: f32,
        radius: f32,
        thickness: f32,
        color: Pixel,
    },
}

/// Where a cell sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPlacement {
    pub screen_x: f32,
    pub screen_y: f32,
    pub size: f32,
}

/// The rendering collaborator.
pub trait Surface {
    /// Called once per frame before any cell is drawn. `lights` is set only for
    /// modes that are lit.
    fn begin_frame(&mut self, _lights: Option<&LightRig>) {}

    fn draw(&mut self, command: &DrawCommand);
}

/// A `Surface` that records commands instead of drawing them.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    pub lights: Option<LightRig>,
    pub commands: Vec<DrawCommand>,
    pub frames_begun: usize,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for DrawList {
    fn begin_frame(&mut self, lights: Option<&LightRig>) {
        self.lights = lights.copied();
        self.commands.clear();
        self.frames_begun += 1;
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.commands.push(*command);
    }
}

/// Depth of a disk: brightness 0 sits at -100, 255 at +100.
pub fn disk_depth(brightness: f32) -> f32 {
    map_range(brightness, 0.0, CHANNEL_MAX, DISK_DEPTH_RANGE.0, DISK_DEPTH_RANGE.1)
}

/// Rotation about the x axis: brightness 0 is 0 rad, 255 is PI.
///
/// Both ends are edge-on to the viewer; brightness 127.5 (PI/2) faces it.
pub fn disk_rotation(brightness: f32) -> f32 {
    map_range(brightness, 0.0, CHANNEL_MAX, 0.0, PI)
}

/// Builds the one draw command for a cell.
///
/// Rect and stamp commands use the cell's top-left corner in canvas pixels.
/// Disk positions are canvas-centred instead: the origin is the middle of the
/// canvas, so `position.xy = screen + size / 2 - canvas / 2`. A host whose
/// origin is the top-left corner adds `canvas / 2` back before drawing, as
/// `RasterSurface` does.
pub fn render_cell(
    mode: RenderMode,
    sample: &Sample,
    placement: CellPlacement,
    config: &SessionConfig,
) -> DrawCommand {
    let CellPlacement {
        screen_x: x,
        screen_y: y,
        size,
    } = placement;

    match mode {
        RenderMode::RawColor => DrawCommand::Rect {
            x,
            y,
            size,
            fill: Fill::Rgba(sample.pixel()),
        },
        RenderMode::Greyscale => {
            // Channels are u8 on the wire; the fractional part of the average is dropped here.
            let grey = sample.brightness.round() as u8;
            DrawCommand::Rect {
                x,
                y,
                size,
                fill: Fill::Rgba(Pixel::opaque(grey, grey, grey)),
            }
        }
        RenderMode::RainbowHsb => DrawCommand::Rect {
            x,
            y,
            size,
            fill: Fill::Hsb {
                hue: sample.hue_angle,
                saturation: config.saturation(),
                brightness: RAINBOW_BRIGHTNESS,
            },
        },
        RenderMode::PaletteImage => DrawCommand::Stamp {
            x,
            y,
            size,
            bucket: PaletteBucket::classify(sample.hue_angle),
        },
        RenderMode::Disk3D => {
            let half = size / 2.0;
            DrawCommand::Disk {
                position: Vec3::new(
                    x + half - config.canvas_width() as f32 / 2.0,
                    y + half - config.canvas_height() as f32 / 2.0,
                    disk_depth(sample.brightness),
                ),
                rotation_x: disk_rotation(sample.brightness),
                radius: config.disk_radius() as f32,
                thickness: config.disk_thickness(),
                color: Pixel::opaque(sample.red, sample.green, sample.blue),
            }
        }
    }
}
