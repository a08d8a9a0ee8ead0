// THEORY:
// `RasterSurface` is a CPU implementation of the `Surface` seam over an
// `image::RgbaImage`. It exists so the pipeline can run without a window or GPU:
// the tester binary writes its output to PNG, and tests inspect pixels directly.
//
// It draws the three kinds of command the renderer produces:
// - rects, alpha-blended over what is already there (HSB fills converted first)
// - palette stamps, the bucket's image scaled to the cell and overlaid
// - disks, as an orthographic projection: a disk tilted by `rotation_x` about
//   the x axis shows up as an ellipse whose height shrinks with |sin(rotation)|.
//   A depth buffer keeps nearer disks on top, and the frame's `LightRig` shades
//   each disk by its face normal.
//
// The palette images are a setup-time requirement: `PaletteAssets::load` fails
// if any of the eight is missing, so nothing downstream needs a fallback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Vec3;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::debug;

use crate::core_modules::lighting::LightRig;
use crate::core_modules::palette::PaletteBucket;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::renderer::{DrawCommand, Fill, Surface};
use crate::error::MirrorError;

/// Converts HSB (hue in degrees, saturation and brightness in percent) to RGB.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Pixel {
    let hue = if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 };
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let v = (brightness / 100.0).clamp(0.0, 1.0);

    let chroma = v * s;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = v - chroma;
    let to_byte = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Pixel::opaque(to_byte(r), to_byte(g), to_byte(b))
}

/// Porter-Duff "over" in 8-bit integers. Opaque sources replace the destination.
fn source_over(destination: &mut Rgba<u8>, source: Rgba<u8>) {
    let alpha = source[3] as u32;
    match alpha {
        0 => {}
        255 => *destination = source,
        _ => {
            let keep = 255 - alpha;
            for channel in 0..3 {
                destination[channel] =
                    ((source[channel] as u32 * alpha + destination[channel] as u32 * keep + 127) / 255) as u8;
            }
            destination[3] = (alpha + (destination[3] as u32 * keep + 127) / 255) as u8;
        }
    }
}

/// The eight palette images, indexed by bucket.
#[derive(Debug, Clone)]
pub struct PaletteAssets {
    tiles: Vec<RgbaImage>,
}

impl PaletteAssets {
    /// Loads `<dir>/<bucket asset name>` for every bucket.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, MirrorError> {
        let dir = dir.as_ref();
        let mut tiles = Vec::with_capacity(PaletteBucket::ALL.len());
        for bucket in PaletteBucket::ALL {
            let path: PathBuf = dir.join(bucket.asset_name());
            let tile = image::open(&path)
                .map_err(|source| MirrorError::MissingAsset {
                    bucket,
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            debug!("loaded {:?} tile {:?} ({}x{})", bucket, path, tile.width(), tile.height());
            tiles.push(tile);
        }
        Ok(Self { tiles })
    }

    /// Solid tiles in each bucket's swatch colour.
    pub fn swatches(size: u32) -> Self {
        let size = size.max(1);
        let tiles = PaletteBucket::ALL
            .iter()
            .map(|bucket| RgbaImage::from_pixel(size, size, bucket.swatch().into()))
            .collect();
        Self { tiles }
    }

    pub fn tile(&self, bucket: PaletteBucket) -> &RgbaImage {
        &self.tiles[bucket.index()]
    }
}

/// A `Surface` that rasterizes draw commands into an RGBA image.
pub struct RasterSurface {
    image: RgbaImage,
    depth: Vec<f32>,
    lights: Option<LightRig>,
    palette: Option<PaletteAssets>,
    stamp_cache: HashMap<(PaletteBucket, u32), RgbaImage>,
    background: Rgba<u8>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let background = Rgba([0, 0, 0, 255]);
        Self {
            image: RgbaImage::from_pixel(width, height, background),
            depth: vec![f32::NEG_INFINITY; width as usize * height as usize],
            lights: None,
            palette: None,
            stamp_cache: HashMap::new(),
            background,
        }
    }

    pub fn with_palette(mut self, palette: PaletteAssets) -> Self {
        self.palette = Some(palette);
        self.stamp_cache.clear();
        self
    }

    pub fn with_background(mut self, background: Pixel) -> Self {
        self.background = background.into();
        self.clear();
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        Pixel::from(self.image.get_pixel(x, y).0)
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = self.background;
        }
        self.depth.fill(f32::NEG_INFINITY);
    }

    /// Canvas pixel span `[start, end)` of `[origin, origin + size)`, clipped.
    fn span(origin: f32, size: f32, limit: u32) -> (u32, u32) {
        let start = origin.floor().max(0.0);
        let end = (origin + size).floor().clamp(0.0, limit as f32);
        (start as u32, (end as u32).max(start as u32))
    }

    fn fill_rect(&mut self, x: f32, y: f32, size: f32, color: Pixel) {
        let (x0, x1) = Self::span(x, size, self.image.width());
        let (y0, y1) = Self::span(y, size, self.image.height());
        let color: Rgba<u8> = color.into();
        for py in y0..y1 {
            for px in x0..x1 {
                source_over(self.image.get_pixel_mut(px, py), color);
            }
        }
    }

    fn stamp(&mut self, x: f32, y: f32, size: f32, bucket: PaletteBucket) {
        let side = size.round().max(1.0) as u32;
        let Some(palette) = self.palette.as_ref() else {
            self.fill_rect(x, y, size, bucket.swatch());
            return;
        };
        let tile = self
            .stamp_cache
            .entry((bucket, side))
            .or_insert_with(|| imageops::resize(palette.tile(bucket), side, side, FilterType::Nearest));

        let (x0, x1) = Self::span(x, side as f32, self.image.width());
        let (y0, y1) = Self::span(y, side as f32, self.image.height());
        let (left, top) = (x.floor() as i64, y.floor() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                let texel = *tile.get_pixel((px as i64 - left) as u32, (py as i64 - top) as u32);
                source_over(self.image.get_pixel_mut(px, py), texel);
            }
        }
    }

    fn disk(&mut self, position: Vec3, rotation_x: f32, radius: f32, thickness: f32, color: Pixel) {
        let (width, height) = self.image.dimensions();
        let centre_x = position.x + width as f32 / 2.0;
        let centre_y = position.y + height as f32 / 2.0;
        // At least one pixel across, so edge-on disks stay visible.
        let radius_x = radius.max(1.0);
        let radius_y = (radius * rotation_x.sin().abs()).max(thickness / 2.0).max(1.0);

        let normal = Vec3::new(0.0, rotation_x.cos(), rotation_x.sin());
        let light = self
            .lights
            .map(|rig| rig.intensity_at(position, normal))
            .unwrap_or(Vec3::ONE);
        let shade = |channel: u8, k: f32| (channel as f32 * k).round().clamp(0.0, 255.0) as u8;
        let shaded = Rgba([
            shade(color.red, light.x),
            shade(color.green, light.y),
            shade(color.blue, light.z),
            255,
        ]);

        let (x0, x1) = Self::span(centre_x - radius_x, radius_x * 2.0 + 1.0, width);
        let (y0, y1) = Self::span(centre_y - radius_y, radius_y * 2.0 + 1.0, height);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = (px as f32 + 0.5 - centre_x) / radius_x;
                let dy = (py as f32 + 0.5 - centre_y) / radius_y;
                if dx * dx + dy * dy > 1.0 {
                    continue;
                }
                let index = py as usize * width as usize + px as usize;
                if position.z <= self.depth[index] {
                    continue;
                }
                self.depth[index] = position.z;
                self.image.put_pixel(px, py, shaded);
            }
        }
    }
}

impl Surface for RasterSurface {
    fn begin_frame(&mut self, lights: Option<&LightRig>) {
        self.lights = lights.copied();
        self.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        match *command {
            DrawCommand::Rect { x, y, size, fill } => {
                let color = match fill {
                    Fill::Rgba(color) => color,
                    Fill::Hsb {
                        hue,
                        saturation,
                        brightness,
                    } => hsb_to_rgb(hue, saturation, brightness),
                };
                self.fill_rect(x, y, size, color);
            }
            DrawCommand::Stamp { x, y, size, bucket } => self.stamp(x, y, size, bucket),
            DrawCommand::Disk {
                position,
                rotation_x,
                radius,
                thickness,
                color,
            } => self.disk(position, rotation_x, radius, thickness, color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::renderer::disk_rotation;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn hsb_primaries() {
        assert_eq!(hsb_to_rgb(0.0, 100.0, 100.0), Pixel::opaque(255, 0, 0));
        assert_eq!(hsb_to_rgb(120.0, 100.0, 100.0), Pixel::opaque(0, 255, 0));
        assert_eq!(hsb_to_rgb(240.0, 100.0, 100.0), Pixel::opaque(0, 0, 255));
        assert_eq!(hsb_to_rgb(360.0, 100.0, 100.0), Pixel::opaque(255, 0, 0));
        assert_eq!(hsb_to_rgb(200.0, 0.0, 100.0), Pixel::opaque(255, 255, 255));
        assert_eq!(hsb_to_rgb(90.0, 100.0, 0.0), Pixel::opaque(0, 0, 0));
    }

    #[test]
    fn rect_fills_exactly_its_cell() {
        let mut surface = RasterSurface::new(4, 4);
        surface.begin_frame(None);
        surface.draw(&DrawCommand::Rect {
            x: 2.0,
            y: 0.0,
            size: 2.0,
            fill: Fill::Rgba(Pixel::opaque(9, 8, 7)),
        });
        assert_eq!(surface.pixel(2, 0), Pixel::opaque(9, 8, 7));
        assert_eq!(surface.pixel(3, 1), Pixel::opaque(9, 8, 7));
        assert_eq!(surface.pixel(1, 0), Pixel::opaque(0, 0, 0));
        assert_eq!(surface.pixel(2, 2), Pixel::opaque(0, 0, 0));
    }

    #[test]
    fn rects_are_clipped_to_the_canvas() {
        let mut surface = RasterSurface::new(3, 3);
        surface.draw(&DrawCommand::Rect {
            x: 2.0,
            y: 2.0,
            size: 10.0,
            fill: Fill::Rgba(Pixel::opaque(1, 1, 1)),
        });
        assert_eq!(surface.pixel(2, 2), Pixel::opaque(1, 1, 1));
    }

    #[test]
    fn stamps_use_the_palette_tile() {
        let mut surface = RasterSurface::new(8, 8).with_palette(PaletteAssets::swatches(3));
        surface.draw(&DrawCommand::Stamp {
            x: 4.0,
            y: 4.0,
            size: 4.0,
            bucket: PaletteBucket::Green,
        });
        assert_eq!(surface.pixel(5, 5), PaletteBucket::Green.swatch());
        assert_eq!(surface.pixel(7, 7), PaletteBucket::Green.swatch());
        assert_eq!(surface.pixel(3, 3), Pixel::opaque(0, 0, 0));
    }

    #[test]
    fn nearer_disks_win_the_depth_test() {
        let mut surface = RasterSurface::new(20, 20);
        surface.begin_frame(None);
        let disk = |z: f32, color: Pixel| DrawCommand::Disk {
            position: Vec3::new(0.0, 0.0, z),
            rotation_x: FRAC_PI_2,
            radius: 4.0,
            thickness: 1.0,
            color,
        };
        surface.draw(&disk(50.0, Pixel::opaque(200, 0, 0)));
        surface.draw(&disk(-50.0, Pixel::opaque(0, 0, 200)));
        assert_eq!(surface.pixel(10, 10), Pixel::opaque(200, 0, 0));
    }

    #[test]
    fn edge_on_disks_are_thin() {
        let mut surface = RasterSurface::new(20, 20);
        surface.begin_frame(None);
        surface.draw(&DrawCommand::Disk {
            position: Vec3::ZERO,
            rotation_x: 0.0,
            radius: 6.0,
            thickness: 1.0,
            color: Pixel::opaque(255, 255, 255),
        });
        assert_eq!(surface.pixel(14, 10), Pixel::opaque(255, 255, 255));
        assert_eq!(surface.pixel(10, 13), Pixel::opaque(0, 0, 0));
    }

    #[test]
    fn brightest_disks_turn_edge_on_again() {
        let mut surface = RasterSurface::new(20, 20);
        surface.begin_frame(None);
        surface.draw(&DrawCommand::Disk {
            position: Vec3::ZERO,
            rotation_x: disk_rotation(255.0),
            radius: 6.0,
            thickness: 1.0,
            color: Pixel::opaque(255, 255, 255),
        });
        assert_eq!(surface.pixel(14, 10), Pixel::opaque(255, 255, 255));
        assert_eq!(surface.pixel(10, 13), Pixel::opaque(0, 0, 0));

        // Mid brightness faces the viewer: the full circle is drawn.
        let mut surface = RasterSurface::new(20, 20);
        surface.begin_frame(None);
        surface.draw(&DrawCommand::Disk {
            position: Vec3::ZERO,
            rotation_x: disk_rotation(127.5),
            radius: 6.0,
            thickness: 1.0,
            color: Pixel::opaque(255, 255, 255),
        });
        assert_eq!(surface.pixel(10, 13), Pixel::opaque(255, 255, 255));
    }

    #[test]
    fn missing_assets_fail_at_load() {
        let dir = std::env::temp_dir().join("pixel_mirror_no_such_palette");
        let err = PaletteAssets::load(&dir).unwrap_err();
        assert!(matches!(
            err,
            MirrorError::MissingAsset {
                bucket: PaletteBucket::Red,
                ..
            }
        ));
    }
}
