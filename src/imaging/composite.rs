//! Source-over compositing onto an opaque background.
//!
//! Pixels are straight (non-premultiplied) RGBA8 as decoded. For each
//! channel:
//!
//! ```text
//! out = (src * a + bg * (255 - a) + 127) / 255
//! ```
//!
//! The `+ 127` rounds to nearest, so `a = 0` yields exactly `bg` and
//! `a = 255` yields exactly `src`.

use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Pure white, the canvas colour of normalized images.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Blend one straight-alpha pixel over an opaque background colour.
pub fn over(src: Rgba<u8>, background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b, a] = src.0;
    let a = u16::from(a);
    let inv = 255 - a;
    Rgb([
        channel(r, background.0[0], a, inv),
        channel(g, background.0[1], a, inv),
        channel(b, background.0[2], a, inv),
    ])
}

fn channel(src: u8, bg: u8, a: u16, inv: u16) -> u8 {
    let sum = u32::from(src) * u32::from(a) + u32::from(bg) * u32::from(inv) + 127;
    (sum / 255) as u8
}

/// Composite a whole image onto a canvas of the same size filled with
/// `background`.
pub fn flatten_onto(src: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(src.width(), src.height(), background);
    for (dst, px) in canvas.pixels_mut().zip(src.pixels()) {
        *dst = over(*px, background);
    }
    canvas
}
