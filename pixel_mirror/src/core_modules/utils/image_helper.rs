pub mod image_helper {
    use std::path::Path;

    use image::imageops::FilterType;
    use image::{DynamicImage, ImageEncoder, RgbaImage};

    /// Writes an RGBA image as PNG.
    pub fn save(path: impl AsRef<Path>, image: &RgbaImage) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(())
    }

    /// Scales a still image to a capture resolution, producing the flat RGBA
    /// buffer a camera would hand over.
    pub fn to_capture(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
        let rgba = image.to_rgba8();
        if rgba.dimensions() == (width, height) {
            return rgba;
        }
        image::imageops::resize(&rgba, width, height, FilterType::Triangle)
    }
}
