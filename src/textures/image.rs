// Copyright @yucwang 2026

use image::io::Reader as ImageReader;
use image::{ imageops, Rgba, RgbaImage };
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
    // Linear within and between mip levels.
    Trilinear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    Clamp,
}

/// How a renderer should sample the texture once uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerSettings {
    pub generate_mipmaps: bool,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub wrap: WrapMode,
}

impl SamplerSettings {
    pub fn mipmapped() -> Self {
        Self {
            generate_mipmaps: true,
            min_filter: FilterMode::Trilinear,
            mag_filter: FilterMode::Linear,
            wrap: WrapMode::Repeat,
        }
    }

    pub fn clamped() -> Self {
        Self {
            generate_mipmaps: false,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            wrap: WrapMode::Clamp,
        }
    }

    /// Mipmaps are only generated when both sides are powers of two.
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width.is_power_of_two() && height.is_power_of_two() {
            Self::mipmapped()
        } else {
            Self::clamped()
        }
    }
}

/// CPU-side RGBA8 texture. Row 0 is the bottom row of the source image.
#[derive(Clone, Debug)]
pub struct TextureImage {
    pixels: RgbaImage,
    sampler: SamplerSettings,
}

pub const PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 255, 255];

const GRID_ROW: [u8; 4] = [160, 20, 0, 255];
const GRID_COLUMN: [u8; 4] = [0, 160, 0, 255];
const GRID_CROSSING: [u8; 4] = [80, 80, 0, 255];
const GRID_BACKGROUND: [u8; 4] = [255, 255, 255, 255];

impl TextureImage {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, String> {
        let path = path.as_ref();
        let img = ImageReader::open(path)
            .map_err(|e| format!("failed to open image {}: {}", path.display(), e))?
            .decode()
            .map_err(|e| format!("failed to decode image {}: {}", path.display(), e))?;

        let pixels = imageops::flip_vertical(&img.to_rgba8());
        let sampler = SamplerSettings::for_dimensions(pixels.width(), pixels.height());
        log::info!("Texture loaded: {} ({}x{}, mipmaps = {}).",
                   path.display(), pixels.width(), pixels.height(), sampler.generate_mipmaps);
        Ok(Self { pixels, sampler })
    }

    pub fn from_pixels(pixels: RgbaImage) -> Self {
        let sampler = SamplerSettings::for_dimensions(pixels.width(), pixels.height());
        Self { pixels, sampler }
    }

    /// Single opaque blue texel, shown while a real texture is missing.
    pub fn placeholder() -> Self {
        Self::from_pixels(RgbaImage::from_pixel(1, 1, Rgba(PLACEHOLDER_TEXEL)))
    }

    pub fn load_or_placeholder<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{}, using placeholder texture.", e);
                Self::placeholder()
            }
        }
    }

    /// Procedural UV test pattern: a white canvas crossed every `step`
    /// pixels by red rows and green columns.
    pub fn uv_grid(size: u32, step: u32) -> Self {
        let step = step.max(1);
        let mut pixels = RgbaImage::new(size, size);
        for (x, y, pixel) in pixels.enumerate_pixels_mut() {
            let on_row = y % step == 0;
            let on_column = x % step == 0;
            let texel = match (on_row, on_column) {
                (true, true) => GRID_CROSSING,
                (true, false) => GRID_ROW,
                (false, true) => GRID_COLUMN,
                (false, false) => GRID_BACKGROUND,
            };
            *pixel = Rgba(texel);
        }
        Self { pixels, sampler: SamplerSettings::mipmapped() }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn sampler(&self) -> SamplerSettings {
        self.sampler
    }

    pub fn set_sampler(&mut self, sampler: SamplerSettings) {
        self.sampler = sampler;
    }

    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Writes the texture with row 0 back at the top of the file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), String> {
        let path = path.as_ref();
        imageops::flip_vertical(&self.pixels)
            .save(path)
            .map_err(|e| format!("failed to write image {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_policy() {
        assert_eq!(SamplerSettings::for_dimensions(256, 64), SamplerSettings::mipmapped());
        assert_eq!(SamplerSettings::for_dimensions(300, 64), SamplerSettings::clamped());
        assert_eq!(SamplerSettings::clamped().wrap, WrapMode::Clamp);
        assert!(!SamplerSettings::clamped().generate_mipmaps);
    }

    #[test]
    fn test_placeholder_is_blue() {
        let texture = TextureImage::placeholder();
        assert_eq!(texture.dimensions(), (1, 1));
        assert_eq!(texture.texel(0, 0), PLACEHOLDER_TEXEL);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let texture = TextureImage::load_or_placeholder("/nonexistent/meshframe/texture.png");
        assert_eq!(texture.texel(0, 0), PLACEHOLDER_TEXEL);
        assert!(TextureImage::from_file("/nonexistent/meshframe/texture.png").is_err());
    }

    #[test]
    fn test_uv_grid_pixel_classes() {
        let grid = TextureImage::uv_grid(512, 32);
        assert_eq!(grid.dimensions(), (512, 512));
        assert_eq!(grid.texel(0, 0), GRID_CROSSING);
        assert_eq!(grid.texel(64, 96), GRID_CROSSING);
        assert_eq!(grid.texel(5, 32), GRID_ROW);
        assert_eq!(grid.texel(32, 5), GRID_COLUMN);
        assert_eq!(grid.texel(5, 5), GRID_BACKGROUND);
        assert!(grid.sampler().generate_mipmaps);
    }

    #[test]
    fn test_file_round_trip_flips_rows() {
        let mut pixels = RgbaImage::from_pixel(4, 2, Rgba(GRID_BACKGROUND));
        pixels.put_pixel(1, 0, Rgba(GRID_ROW));
        let texture = TextureImage::from_pixels(pixels);

        let path = std::env::temp_dir().join(format!("meshframe_texture_{}.png", std::process::id()));
        texture.save(&path).expect("failed to save png");
        let loaded = TextureImage::from_file(&path).expect("failed to load png");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.texel(1, 0), GRID_ROW);
        assert_eq!(loaded.texel(1, 1), GRID_BACKGROUND);
        assert_eq!(loaded.sampler(), SamplerSettings::mipmapped());
    }
}
