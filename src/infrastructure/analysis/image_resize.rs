use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Re-encodes oversized images as JPEG at decreasing quality until they fit.
#[derive(Debug, Clone)]
pub struct ImageDownscaler {
    pub max_bytes: usize,
    pub initial_quality: u8,
    pub quality_step: u8,
    /// Encoding stops once quality would drop to or below this value.
    pub min_quality: u8,
}

impl Default for ImageDownscaler {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            initial_quality: 85,
            quality_step: 15,
            min_quality: 20,
        }
    }
}

impl ImageDownscaler {
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Returns `data` untouched when already under the ceiling. The result
    /// may still exceed the ceiling if the quality floor is reached first.
    pub fn fit(&self, data: &[u8]) -> Result<Vec<u8>, image::ImageError> {
        if data.len() <= self.max_bytes {
            return Ok(data.to_vec());
        }

        let rgb = DynamicImage::ImageRgb8(image::load_from_memory(data)?.to_rgb8());
        let mut encoded = data.to_vec();
        let mut quality = self.initial_quality;

        while encoded.len() > self.max_bytes && quality > self.min_quality {
            let mut buffer = Vec::new();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
            encoded = buffer;

            tracing::debug!(quality, bytes = encoded.len(), "Re-encoded image");
            quality = quality.saturating_sub(self.quality_step);
        }

        tracing::info!(
            original_bytes = data.len(),
            resized_bytes = encoded.len(),
            "Resized image for inference"
        );
        Ok(encoded)
    }
}
