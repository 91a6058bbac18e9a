//! Generators for small test images.

use anyhow::Result;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// An RGBA gradient.
pub fn create_image_rgba(width: u32, height: u32) -> DynamicImage {
	DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| -> Rgba<u8> {
		Rgba([x as u8, (255 - x) as u8, y as u8, (255 - y) as u8])
	}))
}

/// An RGB gradient.
pub fn create_image_rgb(width: u32, height: u32) -> DynamicImage {
	DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| -> Rgb<u8> {
		Rgb([x as u8, (255 - x) as u8, y as u8])
	}))
}

/// A horizontal grey ramp.
pub fn create_image_grey(width: u32, height: u32) -> DynamicImage {
	DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _y| -> Luma<u8> { Luma([x as u8]) }))
}

/// A PNG encoded RGB gradient, ready to be stored as tile data.
pub fn create_png_tile(size: u32) -> Result<Vec<u8>> {
	crate::png::encode(&create_image_rgb(size, size))
}
