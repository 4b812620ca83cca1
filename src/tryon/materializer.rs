use crate::Result;
use image::{DynamicImage, ImageReader};
use std::path::Path;
use tracing::debug;

/// Stores the model output at `dest` and decodes it. The format is sniffed
/// from the bytes, not taken from the file extension.
pub async fn materialize(bytes: Vec<u8>, dest: &Path) -> Result<DynamicImage> {
    tokio::fs::write(dest, &bytes).await?;
    debug!("Wrote {} result bytes to {}", bytes.len(), dest.display());

    let dest = dest.to_path_buf();
    let image = tokio::task::spawn_blocking(move || -> Result<DynamicImage> {
        Ok(ImageReader::open(&dest)?.with_guessed_format()?.decode()?)
    })
    .await??;

    debug!("Decoded result image {}x{}", image.width(), image.height());
    Ok(image)
}
