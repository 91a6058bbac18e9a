//! The image encodings a GeoPackage tile may carry.
//!
//! ```
//! use gpkgtiles_image::ImageEncoding;
//!
//! assert_eq!(ImageEncoding::parse_str("JPG").unwrap(), ImageEncoding::Jpeg);
//! assert_eq!(ImageEncoding::Png.as_mime_str(), "image/png");
//! assert_eq!(ImageEncoding::detect(b"\x89PNG\r\n\x1a\n...."), Some(ImageEncoding::Png));
//! ```

use anyhow::{Result, bail};
use image::ImageFormat;
use std::fmt::Display;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageEncoding {
	Png,
	Jpeg,
	Webp,
}

impl ImageEncoding {
	pub const ALL: [ImageEncoding; 3] = [ImageEncoding::Png, ImageEncoding::Jpeg, ImageEncoding::Webp];

	/// The encodings a GeoPackage tile pyramid may store.
	pub const TILE: [ImageEncoding; 2] = [ImageEncoding::Png, ImageEncoding::Jpeg];

	pub fn as_str(&self) -> &str {
		match self {
			ImageEncoding::Png => "png",
			ImageEncoding::Jpeg => "jpeg",
			ImageEncoding::Webp => "webp",
		}
	}

	pub fn as_mime_str(&self) -> &str {
		match self {
			ImageEncoding::Png => "image/png",
			ImageEncoding::Jpeg => "image/jpeg",
			ImageEncoding::Webp => "image/webp",
		}
	}

	pub fn parse_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().trim() {
			"png" => ImageEncoding::Png,
			"jpg" | "jpeg" => ImageEncoding::Jpeg,
			"webp" => ImageEncoding::Webp,
			_ => bail!("Unknown image encoding: '{value}'"),
		})
	}

	/// Guesses the encoding from the magic bytes at the start of `bytes`.
	///
	/// Returns `None` for anything that is not PNG, JPEG or WebP.
	pub fn detect(bytes: &[u8]) -> Option<ImageEncoding> {
		match image::guess_format(bytes).ok()? {
			ImageFormat::Png => Some(ImageEncoding::Png),
			ImageFormat::Jpeg => Some(ImageEncoding::Jpeg),
			ImageFormat::WebP => Some(ImageEncoding::Webp),
			_ => None,
		}
	}

	pub fn is_tile_encoding(&self) -> bool {
		ImageEncoding::TILE.contains(self)
	}
}

impl Display for ImageEncoding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("png", ImageEncoding::Png)]
	#[case(" PNG ", ImageEncoding::Png)]
	#[case("jpg", ImageEncoding::Jpeg)]
	#[case("JPEG", ImageEncoding::Jpeg)]
	#[case("webp", ImageEncoding::Webp)]
	fn parse(#[case] value: &str, #[case] expected: ImageEncoding) {
		assert_eq!(ImageEncoding::parse_str(value).unwrap(), expected);
	}

	#[test]
	fn parse_unknown() {
		assert_eq!(
			ImageEncoding::parse_str("tiff").unwrap_err().to_string(),
			"Unknown image encoding: 'tiff'"
		);
	}

	#[rstest]
	#[case(b"\x89PNG\r\n\x1a\n\0\0\0\0", Some(ImageEncoding::Png))]
	#[case(b"\xff\xd8\xff\xe0\0\0\0\0", Some(ImageEncoding::Jpeg))]
	#[case(b"RIFF\0\0\0\0WEBPVP8 ", Some(ImageEncoding::Webp))]
	#[case(b"GIF89a\0\0\0\0", None)]
	#[case(b"not an image", None)]
	#[case(b"", None)]
	fn detect(#[case] bytes: &[u8], #[case] expected: Option<ImageEncoding>) {
		assert_eq!(ImageEncoding::detect(bytes), expected);
	}

	#[test]
	fn tile_encodings() {
		assert!(ImageEncoding::Png.is_tile_encoding());
		assert!(ImageEncoding::Jpeg.is_tile_encoding());
		assert!(!ImageEncoding::Webp.is_tile_encoding());
	}
}
