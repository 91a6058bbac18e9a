use anyhow::{Result, anyhow};
use image::{DynamicImage, ImageFormat, load_from_memory_with_format};
use std::io::Cursor;

pub fn encode(image: &DynamicImage) -> Result<Vec<u8>> {
	let mut buffer: Vec<u8> = Vec::new();
	image
		.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
		.map_err(|e| anyhow!("Failed to encode PNG image: {e}"))?;
	Ok(buffer)
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
	load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|e| anyhow!("Failed to decode PNG image: {e}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::helper::{create_image_rgb, create_image_rgba};
	use rstest::rstest;

	#[rstest]
	#[case::rgb(create_image_rgb(4, 4))]
	#[case::rgba(create_image_rgba(4, 4))]
	fn png_is_lossless(#[case] image: DynamicImage) -> Result<()> {
		let bytes = encode(&image)?;
		assert_eq!(&bytes[0..4], b"\x89PNG");
		assert_eq!(decode(&bytes)?, image);
		Ok(())
	}

	#[test]
	fn garbage() {
		let err = decode(b"\x89PNG\r\n\x1a\nbroken").unwrap_err();
		assert!(err.to_string().starts_with("Failed to decode PNG image: "));
	}
}
