use super::MockInferenceClient;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::{io::Cursor, path::Path, sync::Arc};
use tempfile::TempDir;
use tryon_rust::{
    config::ReplicateConfig,
    tryon::{InputNormalizer, TryOnService},
};

/// Create a temporary directory for scratch files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A small image with a gradient so encodings are not trivially uniform
pub fn test_image(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 17 % 256) as u8, (y * 29 % 256) as u8, 128])
    });
    DynamicImage::ImageRgb8(image)
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode test image");
    bytes
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&test_image(width, height), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&test_image(width, height), ImageFormat::Jpeg)
}

/// Build a service around `client` whose scratch files land in `scratch_dir`
pub fn create_test_service(client: Arc<MockInferenceClient>, scratch_dir: &Path) -> TryOnService {
    TryOnService::new(
        InputNormalizer::default(),
        client,
        Some(scratch_dir.to_path_buf()),
    )
}

pub fn create_replicate_config(base_url: &str) -> ReplicateConfig {
    ReplicateConfig {
        api_token: "test-token".to_string(),
        base_url: base_url.to_string(),
        model: "cuuupid/idm-vton:c871bb9b046607b680449ecbae55fd8c6d945e0a1948644bf2361b3d021d3ff4"
            .to_string(),
        poll_interval_ms: 10,
    }
}

/// Number of entries left in a scratch directory
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("Failed to read scratch directory")
        .count()
}

/// Hand-rolled multipart/form-data body for router tests
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "tryon-test-boundary-7MA4YWxkTrZu0gW".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the `content-type` header value and the finished body
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}
