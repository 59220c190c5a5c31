//! Image normalization in pure Rust, no I/O.
//!
//! Downloaded emoji arrive with arbitrary transparency. Training wants an
//! opaque image, so every download is decoded and flattened onto a white
//! canvas of the same size before being re-encoded as PNG.
//!
//! The module is split into:
//! - **Composite**: per-pixel source-over blending (unit testable)
//! - **Normalize**: decode → flatten → encode, built on the `image` crate

pub mod composite;
pub mod normalize;

pub use composite::{WHITE, flatten_onto, over};
pub use normalize::{NormalizeError, encode_png, normalize};
