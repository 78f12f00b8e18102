use std::borrow::Cow;

use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;
use image::{DynamicImage, RgbaImage};

pub fn write_text_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("cannot initialize clipboard")?;
    clipboard
        .set_text(Cow::Borrowed(text))
        .context("cannot write text to clipboard")?;
    log::debug!("copied {} bytes of coordinates", text.len());
    Ok(())
}

/// `Ok(None)` when the clipboard holds no image.
pub fn read_image_from_clipboard() -> Result<Option<DynamicImage>> {
    let mut clipboard = Clipboard::new().context("cannot initialize clipboard")?;
    let data = match clipboard.get_image() {
        Ok(data) => data,
        Err(arboard::Error::ContentNotAvailable) => return Ok(None),
        Err(err) => return Err(err).context("cannot read image from clipboard"),
    };

    let rgba = rgba_from_raw(data.width, data.height, data.bytes.into_owned())?;
    Ok(Some(DynamicImage::ImageRgba8(rgba)))
}

fn rgba_from_raw(width: usize, height: usize, bytes: Vec<u8>) -> Result<RgbaImage> {
    let width = u32::try_from(width).context("clipboard image is too wide")?;
    let height = u32::try_from(height).context("clipboard image is too tall")?;
    RgbaImage::from_raw(width, height, bytes)
        .ok_or_else(|| anyhow!("clipboard image has invalid shape {width}x{height}"))
}

#[cfg(test)]
mod tests {
    use super::rgba_from_raw;

    #[test]
    fn raw_pixels_must_match_dimensions() {
        let image = rgba_from_raw(2, 1, vec![0; 8]).expect("2x1 rgba");
        assert_eq!(image.dimensions(), (2, 1));

        let err = rgba_from_raw(2, 2, vec![0; 8]).expect_err("short buffer");
        assert!(err.to_string().contains("2x2"));
    }
}
