use crate::{ImageEncoding, jpeg, png, webp};
use anyhow::Result;
use gpkgtiles_derive::context;
use image::DynamicImage;

#[context("decoding {} bytes as {encoding}", bytes.len())]
pub fn decode(bytes: &[u8], encoding: ImageEncoding) -> Result<DynamicImage> {
	match encoding {
		ImageEncoding::Png => png::decode(bytes),
		ImageEncoding::Jpeg => jpeg::decode(bytes),
		ImageEncoding::Webp => webp::decode(bytes),
	}
}

#[context("encoding image as {encoding}")]
pub fn encode(image: &DynamicImage, encoding: ImageEncoding) -> Result<Vec<u8>> {
	match encoding {
		ImageEncoding::Png => png::encode(image),
		ImageEncoding::Jpeg => jpeg::encode(image, None),
		ImageEncoding::Webp => webp::encode(image),
	}
}

/// Returns `true` if `bytes` is a complete, decodable image in `encoding`.
pub fn can_decode(bytes: &[u8], encoding: ImageEncoding) -> bool {
	match decode(bytes, encoding) {
		Ok(_) => true,
		Err(err) => {
			log::trace!("{err:#}");
			false
		}
	}
}

/// Returns `true` if `bytes` is a decodable PNG or JPEG image.
pub fn is_permitted_tile_encoding(bytes: &[u8]) -> bool {
	match ImageEncoding::detect(bytes) {
		Some(encoding) if encoding.is_tile_encoding() => can_decode(bytes, encoding),
		_ => false,
	}
}
