// THEORY:
// A `Sample` is what one cell knows about the frame: the raw channels of the
// pixel it read, plus two derived numbers.
//
// - brightness is the plain average of R, G and B. It is not perceptual luma and
//   nothing here corrects for gamma; a pure blue pixel is exactly as bright as a
//   pure green one.
// - hue_angle is brightness stretched linearly onto the colour wheel, so dark
//   pixels land near 0 degrees and bright ones near 360. It is not a hue extracted
//   from the RGB channels. The rainbow and palette effects are driven by how
//   bright a region is, not by what colour it is.
//
// Samples are rebuilt every frame and never outlive it, except inside a retained
// `Cell`, where the next frame overwrites them in place.

use crate::core_modules::pixel::pixel::Pixel;

pub type Brightness = f32;
pub type HueAngle = f32;

/// Largest channel value; the top of every input range below.
pub const CHANNEL_MAX: f32 = 255.0;
/// One full turn of the colour wheel, in degrees.
pub const FULL_TURN_DEGREES: f32 = 360.0;

/// Linear rescale of `value` from `[in_low, in_high]` onto `[out_low, out_high]`.
///
/// Not clamped: values outside the input range extrapolate.
#[inline]
pub fn map_range(value: f32, in_low: f32, in_high: f32, out_low: f32, out_high: f32) -> f32 {
    out_low + (value - in_low) * (out_high - out_low) / (in_high - in_low)
}

/// Unweighted channel average, as a real number in `[0, 255]`.
#[inline]
pub fn brightness(red: u8, green: u8, blue: u8) -> Brightness {
    (red as f32 + green as f32 + blue as f32) / 3.0
}

/// Brightness reinterpreted as a colour wheel angle: 0 maps to 0, 255 maps to 360.
#[inline]
pub fn hue_angle(brightness: Brightness) -> HueAngle {
    map_range(brightness, 0.0, CHANNEL_MAX, 0.0, FULL_TURN_DEGREES)
}

/// The per-cell colour data for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub brightness: Brightness,
    pub hue_angle: HueAngle,
}

impl Sample {
    pub fn from_pixel(pixel: Pixel) -> Self {
        let brightness = brightness(pixel.red, pixel.green, pixel.blue);
        Self {
            red: pixel.red,
            green: pixel.green,
            blue: pixel.blue,
            alpha: pixel.alpha,
            brightness,
            hue_angle: hue_angle(brightness),
        }
    }

    pub fn pixel(&self) -> Pixel {
        Pixel::new(self.red, self.green, self.blue, self.alpha)
    }
}

impl From<Pixel> for Sample {
    fn from(pixel: Pixel) -> Self {
        Sample::from_pixel(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_is_the_plain_average() {
        assert_eq!(brightness(10, 20, 30), 20.0);
        assert_eq!(brightness(0, 0, 255), brightness(0, 255, 0));
    }

    #[test]
    fn brightness_keeps_fractions() {
        let b = brightness(0, 0, 1);
        assert!((b - 1.0 / 3.0).abs() < 1e-6);
        assert!(b > 0.0);
    }

    #[test]
    fn hue_angle_covers_the_closed_wheel() {
        assert_eq!(hue_angle(0.0), 0.0);
        assert_eq!(hue_angle(255.0), 360.0);
        assert!((hue_angle(127.5) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn map_range_extrapolates() {
        assert_eq!(map_range(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
        assert_eq!(map_range(20.0, 0.0, 10.0, 0.0, 100.0), 200.0);
        assert_eq!(map_range(0.0, 0.0, 255.0, -100.0, 100.0), -100.0);
    }

    #[test]
    fn sample_keeps_raw_channels() {
        let sample = Sample::from_pixel(Pixel::new(30, 60, 90, 128));
        assert_eq!(sample.pixel(), Pixel::new(30, 60, 90, 128));
        assert_eq!(sample.brightness, 60.0);
        assert!((sample.hue_angle - 60.0 * 360.0 / 255.0).abs() < 1e-4);
    }
}
