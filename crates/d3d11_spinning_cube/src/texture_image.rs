use std::path::Path;

use eyre::Result;
use eyre::WrapErr;
use image::RgbaImage;

pub const TEXTURE_FILE: &str = "assets/cube_texture.png";

/// Decodes an image file into tightly packed RGBA8 rows.
pub fn load_rgba8(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).wrap_err_with(|| format!("loading texture {}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Bytes between the starts of two rows.
pub fn row_pitch(image: &RgbaImage) -> u32 {
    image.width() * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_texture_decodes_to_rgba() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(TEXTURE_FILE);
        let image = load_rgba8(&path).unwrap();
        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(row_pitch(&image), 256);
        assert_eq!(image.as_raw().len(), 64 * 64 * 4);
        assert!(image.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn missing_texture_names_the_file() {
        let error = load_rgba8(Path::new("does/not/exist.png")).unwrap_err();
        assert!(error.to_string().contains("does/not/exist.png"));
    }
}
