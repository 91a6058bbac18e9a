use anyhow::{Result, anyhow, bail};
use image::{DynamicImage, ImageFormat, codecs::webp::WebPEncoder, load_from_memory_with_format};

/// Encodes lossless WebP. Only 8-bit RGB and RGBA images are supported.
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>> {
	let image = match image {
		DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image.clone(),
		_ if image.color().has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
		_ => DynamicImage::ImageRgb8(image.to_rgb8()),
	};
	if image.width() == 0 || image.height() == 0 {
		bail!("webp does not support empty images");
	}

	let mut buffer: Vec<u8> = Vec::new();
	WebPEncoder::new_lossless(&mut buffer)
		.encode(image.as_bytes(), image.width(), image.height(), image.color().into())
		.map_err(|e| anyhow!("Failed to encode WebP image: {e}"))?;
	Ok(buffer)
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
	load_from_memory_with_format(bytes, ImageFormat::WebP).map_err(|e| anyhow!("Failed to decode WebP image: {e}"))
}
