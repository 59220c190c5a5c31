//! Raw download → opaque PNG.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, WebP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Alpha expansion | `DynamicImage::into_rgba8` |
//! | Flatten | [`flatten_onto`](super::composite::flatten_onto) with [`WHITE`] |
//! | Encode | `image::codecs::png::PngEncoder` |

use super::composite::{WHITE, flatten_onto};
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageError, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] ImageError),
}

/// Decode `bytes` and composite the result onto a white canvas.
pub fn normalize(bytes: &[u8]) -> Result<RgbImage, NormalizeError> {
    let decoded = image::load_from_memory(bytes).map_err(NormalizeError::Decode)?;
    Ok(flatten_onto(&decoded.into_rgba8(), WHITE))
}

/// Serialize a normalized image as PNG.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, NormalizeError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(NormalizeError::Encode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::rgba_png;
    use image::{ImageFormat, Rgb, Rgba};

    #[test]
    fn transparent_png_becomes_white() {
        let bytes = rgba_png(1, 1, Rgba([200, 10, 10, 0]));
        let out = normalize(&bytes).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn opaque_png_keeps_colour() {
        let bytes = rgba_png(1, 1, Rgba([200, 10, 10, 255]));
        let out = normalize(&bytes).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([200, 10, 10]));
    }

    #[test]
    fn half_transparent_png_blends() {
        let bytes = rgba_png(1, 1, Rgba([0, 0, 0, 128]));
        let out = normalize(&bytes).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([127, 127, 127]));
    }

    #[test]
    fn keeps_dimensions() {
        let bytes = rgba_png(7, 3, Rgba([1, 2, 3, 4]));
        assert_eq!(normalize(&bytes).unwrap().dimensions(), (7, 3));
    }

    #[test]
    fn rgb_jpeg_is_accepted() {
        let img = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Jpeg).unwrap();

        let out = normalize(bytes.get_ref()).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
    }

    #[test]
    fn garbage_is_decode_error() {
        let result = normalize(b"<html>404 Not Found</html>");
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([9, 8, 7]));

        let bytes = encode_png(&img).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            ImageFormat::Png
        );
        let back = image::load_from_memory(&bytes).unwrap().into_rgb8();
        assert_eq!(back, img);
    }
}
