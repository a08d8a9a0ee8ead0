// THEORY:
// The palette is a discrete classifier over the colour wheel. It cuts [0, 360)
// into eight contiguous 45 degree slices and binds each slice to a colour
// identity: a swatch colour and the file name of the image stamped for it.
//
// Classification is a scan of `BUCKET_TABLE`, never arithmetic on the angle, so
// the table is the single source of truth for the ranges and their order. The
// slices are half-open, `[start, end)`: an angle sitting exactly on a boundary
// belongs to the slice that starts there.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::sample::{FULL_TURN_DEGREES, HueAngle};

/// One of the eight fixed hue slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteBucket {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Indigo,
    Purple,
}

/// One row of the classifier table.
#[derive(Debug, Clone, Copy)]
pub struct BucketEntry {
    pub start: HueAngle,
    pub end: HueAngle,
    pub bucket: PaletteBucket,
    pub swatch: Pixel,
    pub asset_name: &'static str,
}

impl BucketEntry {
    #[inline]
    pub fn contains(&self, angle: HueAngle) -> bool {
        angle >= self.start && angle < self.end
    }
}

const fn entry(
    start: HueAngle,
    bucket: PaletteBucket,
    swatch: Pixel,
    asset_name: &'static str,
) -> BucketEntry {
    BucketEntry {
        start,
        end: start + 45.0,
        bucket,
        swatch,
        asset_name,
    }
}

/// Ranges in wheel order. Contiguous, non-overlapping, covering [0, 360).
pub const BUCKET_TABLE: [BucketEntry; 8] = [
    entry(0.0, PaletteBucket::Red, Pixel::opaque(230, 40, 40), "red.png"),
    entry(45.0, PaletteBucket::Orange, Pixel::opaque(245, 140, 30), "orange.png"),
    entry(90.0, PaletteBucket::Yellow, Pixel::opaque(245, 220, 50), "yellow.png"),
    entry(135.0, PaletteBucket::Green, Pixel::opaque(60, 190, 75), "green.png"),
    entry(180.0, PaletteBucket::Cyan, Pixel::opaque(50, 200, 210), "cyan.png"),
    entry(225.0, PaletteBucket::Blue, Pixel::opaque(40, 90, 220), "blue.png"),
    entry(270.0, PaletteBucket::Indigo, Pixel::opaque(80, 50, 170), "indigo.png"),
    entry(315.0, PaletteBucket::Purple, Pixel::opaque(160, 60, 190), "purple.png"),
];

impl PaletteBucket {
    pub const ALL: [PaletteBucket; 8] = [
        PaletteBucket::Red,
        PaletteBucket::Orange,
        PaletteBucket::Yellow,
        PaletteBucket::Green,
        PaletteBucket::Cyan,
        PaletteBucket::Blue,
        PaletteBucket::Indigo,
        PaletteBucket::Purple,
    ];

    /// Picks the slice an angle falls in.
    ///
    /// Angles are folded onto the wheel first, so 360 (the brightest pixel's
    /// angle) wraps around to `Red`. Non-finite input also lands on `Red`.
    pub fn classify(angle: HueAngle) -> PaletteBucket {
        if !angle.is_finite() {
            return PaletteBucket::Red;
        }
        let folded = angle.rem_euclid(FULL_TURN_DEGREES);
        BUCKET_TABLE
            .iter()
            .find(|entry| entry.contains(folded))
            .map(|entry| entry.bucket)
            // rem_euclid can round up to exactly 360.0 for tiny negative input.
            .unwrap_or(PaletteBucket::Red)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn entry(self) -> &'static BucketEntry {
        &BUCKET_TABLE[self.index()]
    }

    /// `[start, end)` in degrees.
    pub fn range(self) -> (HueAngle, HueAngle) {
        let entry = self.entry();
        (entry.start, entry.end)
    }

    pub fn swatch(self) -> Pixel {
        self.entry().swatch
    }

    pub fn asset_name(self) -> &'static str {
        self.entry().asset_name
    }
}
