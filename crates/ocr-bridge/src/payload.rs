//! Turning a client image payload into an RGB pixel buffer.
//!
//! Clients send images as base64 strings, frequently copied straight out of a
//! canvas or `FileReader` and therefore still carrying a data-URL header such
//! as `data:image/png;base64,`. The steps here are:
//!
//! 1. [`strip_data_url_prefix`] - drop everything up to and including the first comma
//! 2. [`decode_base64`] - standard alphabet, padded; bytes outside the alphabet
//!    (line breaks from `base64` without `-w0`, stray spaces) are discarded
//! 3. [`load_rgb_image`] - sniff the format, decode, convert to 8-bit RGB

use base64::prelude::*;
use image::{DynamicImage, RgbImage};

use crate::Result;

/// Return the base64 portion of an image payload.
///
/// If the payload contains a comma, everything after the first comma is
/// returned; otherwise the whole string is.
///
/// ```rust
/// use ocr_bridge::payload::strip_data_url_prefix;
///
/// assert_eq!(strip_data_url_prefix("data:image/png;base64,iVBORw0K"), "iVBORw0K");
/// assert_eq!(strip_data_url_prefix("iVBORw0K"), "iVBORw0K");
/// ```
pub fn strip_data_url_prefix(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    }
}

/// Decode a base64 image payload, stripping any data-URL prefix first.
///
/// Characters outside the standard alphabet are skipped before decoding, so
/// wrapped output is accepted. Padding is still required.
///
/// ```rust
/// use ocr_bridge::payload::decode_base64;
///
/// assert_eq!(decode_base64("data:text/plain;base64,aGVs\nbG8=").unwrap(), b"hello");
/// ```
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let data: Vec<u8> = strip_data_url_prefix(payload)
        .bytes()
        .filter(|b| is_base64_symbol(*b))
        .collect();
    Ok(BASE64_STANDARD.decode(data)?)
}

fn is_base64_symbol(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/' | b'=')
}

/// Decode image bytes and normalize them to three-channel 8-bit RGB.
///
/// Images already in RGB8 are moved out without copying; anything else
/// (grayscale, RGBA, 16-bit, palette PNGs expanded by the decoder) is converted.
pub fn load_rgb_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(into_rgb(img))
}

fn into_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            tracing::debug!("Converting {:?} image to RGB8", other.color());
            other.to_rgb8()
        }
    }
}

/// Full payload pipeline: base64 string in, RGB image out.
pub fn decode_image_payload(payload: &str) -> Result<RgbImage> {
    let bytes = decode_base64(payload)?;
    load_rgb_image(&bytes)
}
