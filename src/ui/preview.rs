/// Rounded-corner image preview
///
/// Every preview source goes through the same pixel path: decode to RGBA,
/// round the corners, hand the buffer to the iced image widget. The same
/// treatment applies to the placeholder artwork, a freshly picked local
/// file, and downloaded bytes, so the preview always looks consistent.

use std::path::Path;

use iced::widget::image::Handle;
use image::{Rgba, RgbaImage};

/// Corner radius applied to every preview, in pixels
pub const CORNER_RADIUS: f32 = 15.0;

/// Edge length of the generated placeholder artwork
const PLACEHOLDER_SIZE: u32 = 512;

/// The artwork shown before any image is picked or downloaded
pub fn placeholder() -> Handle {
    let size = PLACEHOLDER_SIZE as f32;
    let img = RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |_, y| {
        // vertical gradient, slate to near-black
        let t = y as f32 / size;
        let channel = |top: f32, bottom: f32| (top + (bottom - top) * t) as u8;
        Rgba([
            channel(58.0, 24.0),
            channel(66.0, 28.0),
            channel(86.0, 44.0),
            255,
        ])
    });
    to_handle(img)
}

/// Decode a locally picked file into a preview handle
pub fn from_path(path: &Path) -> Result<Handle, image::ImageError> {
    let img = image::open(path)?;
    Ok(to_handle(img.to_rgba8()))
}

/// Decode downloaded bytes into a preview handle
pub fn from_bytes(bytes: &[u8]) -> Result<Handle, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    Ok(to_handle(img.to_rgba8()))
}

fn to_handle(mut img: RgbaImage) -> Handle {
    round_corners(&mut img, CORNER_RADIUS);
    let (width, height) = img.dimensions();
    Handle::from_rgba(width, height, img.into_raw())
}

/// Zero the alpha of every pixel outside the rounded rectangle
fn round_corners(img: &mut RgbaImage, radius: f32) {
    let (width, height) = img.dimensions();
    let (w, h) = (width as f32, height as f32);
    let radius = radius.min(w / 2.0).min(h / 2.0);

    for y in 0..height {
        for x in 0..width {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            // nearest center of the four corner arcs
            let cx = px.clamp(radius, w - radius);
            let cy = py.clamp(radius, h - radius);
            let dx = px - cx;
            let dy = py - cy;
            if dx * dx + dy * dy > radius * radius {
                img.get_pixel_mut(x, y).0[3] = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_corners_become_transparent_center_stays_opaque() {
        let mut img = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));

        round_corners(&mut img, 15.0);

        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(63, 0).0[3], 0);
        assert_eq!(img.get_pixel(0, 63).0[3], 0);
        assert_eq!(img.get_pixel(63, 63).0[3], 0);
        assert_eq!(img.get_pixel(32, 32).0[3], 255);
        // straight edges between the arcs are untouched
        assert_eq!(img.get_pixel(32, 0).0[3], 255);
        assert_eq!(img.get_pixel(0, 32).0[3], 255);
    }

    #[test]
    fn test_radius_is_clamped_for_tiny_images() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));

        round_corners(&mut img, 15.0);

        // center of a 4x4 survives even though the radius exceeds the image
        assert_eq!(img.get_pixel(2, 2).0[3], 255);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        assert!(from_bytes(&png).is_ok());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(from_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn test_placeholder_builds() {
        let _ = placeholder();
    }
}
