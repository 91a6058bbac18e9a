use anyhow::{Result, anyhow};
use image::{DynamicImage, ImageFormat, codecs::jpeg::JpegEncoder, load_from_memory_with_format};

/// Encodes with the given quality (default 95). JPEG has no alpha channel, so
/// transparency is dropped.
pub fn encode(image: &DynamicImage, quality: Option<u8>) -> Result<Vec<u8>> {
	let mut buffer: Vec<u8> = Vec::new();
	let quality = quality.unwrap_or(95).clamp(1, 100);
	JpegEncoder::new_with_quality(&mut buffer, quality)
		.encode_image(&image.to_rgb8())
		.map_err(|e| anyhow!("Failed to encode JPEG image: {e}"))?;
	Ok(buffer)
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
	load_from_memory_with_format(bytes, ImageFormat::Jpeg).map_err(|e| anyhow!("Failed to decode JPEG image: {e}"))
}
