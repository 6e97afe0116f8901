use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::{DynamicImage, ImageEncoder, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{IwtError, Result};

/// A decoded user image at its natural size.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub pixels: RgbaImage,
    /// File stem, used to name exports in batch mode.
    pub name: String,
    pub path: PathBuf,
}

impl SourceImage {
    pub fn from_pixels(pixels: RgbaImage, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        Self { pixels, name, path }
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Decode any raster format the `image` crate supports into RGBA8.
/// Zero-sized images are rejected so the fit never sees them.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let pixels = image::open(path)?.to_rgba8();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(IwtError::EmptyImage { path: path.to_path_buf() });
    }
    Ok(SourceImage::from_pixels(pixels, path))
}

/// Export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tga,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
        }
    }

    /// Format for a name or extension such as `"jpeg"` or `"PNG"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            "tga" => Some(SaveFormat::Tga),
            _ => None,
        }
    }

    /// Format implied by a path's extension, PNG when unknown.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_name)
            .unwrap_or_default()
    }

    pub fn all() -> &'static [SaveFormat] {
        &[SaveFormat::Png, SaveFormat::Jpeg, SaveFormat::Bmp, SaveFormat::Tga]
    }
}

/// Encode `image` and write it to `path`. `quality` only applies to JPEG.
pub fn encode_and_write(image: &RgbaImage, path: &Path, format: SaveFormat, quality: u8) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder.encode(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )?;
        }
        SaveFormat::Bmp => {
            let mut encoder = BmpEncoder::new(&mut writer);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Tga => {
            TgaEncoder::new(&mut writer).encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_name_and_path() {
        assert_eq!(SaveFormat::from_name("JPEG"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::from_name("gif"), None);
        assert_eq!(SaveFormat::from_path(Path::new("out/shot.TGA")), SaveFormat::Tga);
        assert_eq!(SaveFormat::from_path(Path::new("noext")), SaveFormat::Png);
    }

    #[test]
    fn every_format_names_itself() {
        for format in SaveFormat::all() {
            assert_eq!(SaveFormat::from_name(format.extension()), Some(*format));
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_image(Path::new("/no/such/picture.png")).is_err());
    }

    #[test]
    fn source_name_is_file_stem() {
        let src = SourceImage::from_pixels(RgbaImage::new(2, 3), "/photos/beach.jpg");
        assert_eq!(src.name, "beach");
        assert_eq!(src.natural_size(), (2, 3));
    }
}
