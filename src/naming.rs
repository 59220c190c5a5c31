//! Centralized filename handling for the `img<N>` convention.
//!
//! Every processed entry is a pair of files sharing a 1-based index:
//!
//! ```text
//! emoji/
//! ├── img1.png    # normalized image
//! ├── img1.txt    # label
//! ├── img2.png
//! └── img2.txt
//! ```
//!
//! The index is the only link between an image and its label, and the
//! highest index on disk is the resume watermark, so parsing is strict: a
//! name that looks like `img*.png` but whose middle is not a plain decimal
//! number is an error rather than something to skip.

use thiserror::Error;

/// Prefix shared by processed image and label files.
pub const IMAGE_PREFIX: &str = "img";
/// Extension of normalized images.
pub const IMAGE_EXTENSION: &str = "png";
/// Extension of label files.
pub const LABEL_EXTENSION: &str = "txt";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Processed file name `{file_name}` has a non-numeric index `{middle}`")]
pub struct InvalidIndex {
    pub file_name: String,
    pub middle: String,
}

/// `img<index>.png`
pub fn image_file_name(index: u32) -> String {
    format!("{IMAGE_PREFIX}{index}.{IMAGE_EXTENSION}")
}

/// `img<index>.txt`
pub fn label_file_name(index: u32) -> String {
    format!("{IMAGE_PREFIX}{index}.{LABEL_EXTENSION}")
}

/// `<name>.png` for the untouched download.
///
/// The name is used verbatim; manifest names are trusted.
pub fn raw_file_name(name: &str) -> String {
    format!("{name}.{IMAGE_EXTENSION}")
}

/// Parse the index out of a processed image file name.
///
/// - `"img12.png"` → `Ok(Some(12))`
/// - `"img12.txt"`, `"notes.png"`, `"IMG1.png"` → `Ok(None)` (not an indexed image)
/// - `"img.png"`, `"imgx.png"`, `"img1.5.png"` → `Err(InvalidIndex)`
pub fn parse_image_index(file_name: &str) -> Result<Option<u32>, InvalidIndex> {
    let Some(rest) = file_name.strip_prefix(IMAGE_PREFIX) else {
        return Ok(None);
    };
    let Some(middle) = rest
        .strip_suffix(IMAGE_EXTENSION)
        .and_then(|m| m.strip_suffix('.'))
    else {
        return Ok(None);
    };

    let invalid = || InvalidIndex {
        file_name: file_name.to_string(),
        middle: middle.to_string(),
    };

    if middle.is_empty() || !middle.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    middle.parse::<u32>().map(Some).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_image_and_label_names() {
        assert_eq!(image_file_name(1), "img1.png");
        assert_eq!(label_file_name(42), "img42.txt");
    }

    #[test]
    fn raw_name_is_verbatim() {
        assert_eq!(raw_file_name("grinning face"), "grinning face.png");
        assert_eq!(raw_file_name("a.b"), "a.b.png");
    }

    #[test]
    fn parses_plain_index() {
        assert_eq!(parse_image_index("img1.png"), Ok(Some(1)));
        assert_eq!(parse_image_index("img1234.png"), Ok(Some(1234)));
    }

    #[test]
    fn leading_zeros_are_numeric() {
        assert_eq!(parse_image_index("img007.png"), Ok(Some(7)));
    }

    #[test]
    fn label_files_are_not_images() {
        assert_eq!(parse_image_index("img3.txt"), Ok(None));
    }

    #[test]
    fn unrelated_names_are_ignored() {
        assert_eq!(parse_image_index("notes.png"), Ok(None));
        assert_eq!(parse_image_index(".DS_Store"), Ok(None));
        assert_eq!(parse_image_index("IMG1.png"), Ok(None));
        assert_eq!(parse_image_index("img1.pngx"), Ok(None));
    }

    #[test]
    fn empty_middle_is_invalid() {
        let err = parse_image_index("img.png").unwrap_err();
        assert_eq!(err.middle, "");
        assert_eq!(err.file_name, "img.png");
    }

    #[test]
    fn non_numeric_middle_is_invalid() {
        assert!(parse_image_index("imgfoo.png").is_err());
        assert!(parse_image_index("img1.5.png").is_err());
        assert!(parse_image_index("img-3.png").is_err());
        assert!(parse_image_index("img+3.png").is_err());
    }

    #[test]
    fn overflowing_index_is_invalid() {
        assert!(parse_image_index("img99999999999.png").is_err());
    }

    #[test]
    fn error_message_names_the_file() {
        let err = parse_image_index("imgx.png").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Processed file name `imgx.png` has a non-numeric index `x`"
        );
    }
}
