//! Recognition pipeline shared by the HTTP handler and the CLI.
//!
//! payload -> bytes -> RGB image -> engine pages -> flat lines

use image::RgbImage;

use crate::Result;
use crate::engine::{OcrEngine, TextLine, flatten_pages};
use crate::payload;

/// Run the engine on an already normalized image and flatten its pages.
pub fn recognize_image(engine: &dyn OcrEngine, image: &RgbImage) -> Result<Vec<TextLine>> {
    let (width, height) = image.dimensions();
    tracing::debug!("Processing image: ({}, {}, 3) with engine '{}'", height, width, engine.name());

    let pages = engine.predict(image)?;
    if pages.is_empty() {
        tracing::info!("No text detected in image");
        return Ok(Vec::new());
    }

    let lines = flatten_pages(&pages);
    tracing::info!("OCR completed: {} lines detected", lines.len());

    Ok(lines)
}

/// Decode raw image file bytes (PNG, JPEG, ...) and recognize them.
pub fn recognize_bytes(engine: &dyn OcrEngine, bytes: &[u8]) -> Result<Vec<TextLine>> {
    let image = payload::load_rgb_image(bytes)?;
    recognize_image(engine, &image)
}

/// Decode a base64 (optionally data-URL prefixed) payload and recognize it.
pub fn recognize_payload(engine: &dyn OcrEngine, image_payload: &str) -> Result<Vec<TextLine>> {
    let image = payload::decode_image_payload(image_payload)?;
    recognize_image(engine, &image)
}
