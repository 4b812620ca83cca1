use super::types::ImageInput;
use crate::{Error, Result};
use image::{DynamicImage, ImageFormat};
use reqwest::Url;
use std::path::Path;
use tracing::debug;

/// Turns either kind of `ImageInput` into an image file on disk.
#[derive(Clone, Default)]
pub struct InputNormalizer {
    http: reqwest::Client,
}

impl InputNormalizer {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Writes `input` to `dest`. URLs are stored byte-for-byte; pixels are
    /// encoded as PNG.
    pub async fn normalize(&self, input: ImageInput, dest: &Path) -> Result<()> {
        match input {
            ImageInput::Url(url) => self.fetch_to(&url, dest).await,
            ImageInput::Pixels(image) => {
                let dest = dest.to_path_buf();
                tokio::task::spawn_blocking(move || {
                    png_compatible(image).save_with_format(&dest, ImageFormat::Png)
                })
                .await??;
                Ok(())
            }
        }
    }

    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<()> {
        let url = parse_image_url(url)?;
        debug!("Fetching input image from {}", url);

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote(format!(
                "Fetching {} failed with HTTP {}",
                url, status
            )));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        debug!("Stored {} bytes from {} at {}", bytes.len(), url, dest.display());
        Ok(())
    }
}

/// PNG has no float channels; HDR/EXR decodes are narrowed to 16 bits.
fn png_compatible(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(image.to_rgb16()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(image.to_rgba16()),
        other => other,
    }
}

fn parse_image_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::validation(format!("Invalid image URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::validation(format!(
            "Unsupported image URL scheme '{}': only http and https are allowed",
            other
        ))),
    }
}
