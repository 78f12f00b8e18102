use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::DynamicImage;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn load_image_from_path(path: &Path) -> Result<DynamicImage> {
    let image =
        image::open(path).with_context(|| format!("cannot decode image {}", path.display()))?;
    log::info!(
        "opened {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Native open dialog; `None` when the user cancels.
pub fn pick_image_file(start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Open image to annotate")
        .add_filter("Images", IMAGE_EXTENSIONS);
    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::{DynamicImage, ImageFormat};

    use super::{is_image_file, load_image_from_path};

    #[test]
    fn recognizes_image_extensions() {
        assert!(is_image_file(Path::new("shot.PNG")));
        assert!(is_image_file(Path::new("/tmp/a/photo.jpeg")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn loads_png_from_disk() {
        let path = std::env::temp_dir().join(format!("arrowmark-load-{}.png", std::process::id()));
        DynamicImage::new_rgba8(12, 7)
            .save_with_format(&path, ImageFormat::Png)
            .expect("write fixture");

        let image = load_image_from_path(&path).expect("load fixture");
        assert_eq!((image.width(), image.height()), (12, 7));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_image_from_path(Path::new("/definitely/not/here.png"))
            .expect_err("missing file");
        assert!(format!("{err:#}").contains("/definitely/not/here.png"));
    }
}
