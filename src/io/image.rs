//! PNG export of the coverage mask

use std::path::Path;

use image::{ImageBuffer, LumaA, Rgba, RgbaImage};

use crate::io::error::{EffectError, Result, invalid_parameter};
use crate::mask::surface::MaskSurface;

/// Grayscale image with alpha
pub type MaskImage = ImageBuffer<LumaA<u8>, Vec<u8>>;

fn coverage_to_byte(coverage: f32) -> u8 {
    (coverage.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// White mask whose alpha channel carries the coverage
pub fn surface_to_image(surface: &MaskSurface) -> MaskImage {
    let (width, height) = surface.dimensions();
    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        LumaA([255, coverage_to_byte(surface.pixel(x as usize, y as usize))])
    })
}

/// Opaque RGBA rendering of the mask, coverage as brightness over `background`
pub fn surface_to_rgba(surface: &MaskSurface, background: [u8; 3]) -> RgbaImage {
    let (width, height) = surface.dimensions();
    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let a = surface.pixel(x as usize, y as usize).clamp(0.0, 1.0);
        let mix = |bg: u8| {
            let bg = f32::from(bg);
            coverage_to_byte(a.mul_add(255.0 - bg, bg) / 255.0)
        };
        Rgba([mix(background[0]), mix(background[1]), mix(background[2]), 255])
    })
}

/// Create the parent directory of `path` if needed
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| EffectError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    Ok(())
}

/// Save the mask as a grayscale-alpha PNG
///
/// # Errors
///
/// Returns an error if:
/// - The surface has no pixels
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_surface_as_png(surface: &MaskSurface, output_path: &Path) -> Result<()> {
    let (width, height) = surface.dimensions();
    if width == 0 || height == 0 {
        return Err(invalid_parameter(
            "surface",
            &format!("{width}x{height}"),
            &"cannot export an empty surface",
        ));
    }

    ensure_parent(output_path)?;
    surface_to_image(surface)
        .save(output_path)
        .map_err(|e| EffectError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
