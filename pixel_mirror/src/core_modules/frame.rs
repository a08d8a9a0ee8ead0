// THEORY:
// A `VideoFrame` is a read-only view over the flat RGBA buffer a capture device
// hands us once per tick. The buffer stores inherently 2D data in one dimension:
// rows are laid end to end, and every pixel takes four bytes. All addressing in
// the crate goes through `VideoFrame::offset`, so the row-skip, column and
// channel-stride terms live in exactly one place.
//
// The frame borrows its bytes. The capture collaborator owns the buffer and
// overwrites it between frames; the mirror only ever reads it for the duration
// of one `render_frame` call.

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::error::MirrorError;

/// A borrowed, validated view over one RGBA video frame.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> VideoFrame<'a> {
    /// Wraps a row-major RGBA buffer. The length must be exactly
    /// `width * height * 4`.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, MirrorError> {
        if width == 0 || height == 0 {
            return Err(MirrorError::EmptyFrame);
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(MirrorError::FrameSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Byte offset of pixel (x, y): `(y * width + x) * 4`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) is outside a {}x{} frame",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Reads the four channels at pixel (x, y).
    #[inline]
    pub fn pixel_at(&self, x: u32, y: u32) -> Pixel {
        let offset = self.offset(x, y);
        Pixel::from(&self.data[offset..offset + CHANNELS])
    }
}
