use crate::{
    Error, Result,
    tryon::{Category, DEFAULT_SEED, ImageInput, Steps, TryOnParams, TryOnRequest},
};
use axum::extract::Multipart;
use tracing::debug;

/// Raw fields of the try-on form, before validation.
#[derive(Debug, Default)]
pub struct TryOnForm {
    pub garment_upload: Option<Vec<u8>>,
    pub garment_url: Option<String>,
    pub human_upload: Option<Vec<u8>>,
    pub human_url: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub crop: bool,
    pub seed: Option<String>,
    pub steps: Option<String>,
    pub force_dc: bool,
    pub mask_only: bool,
}

impl TryOnForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "garment_image" | "human_image" => {
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part for an untouched file picker.
                    if bytes.is_empty() {
                        continue;
                    }
                    if name == "garment_image" {
                        form.garment_upload = Some(bytes.to_vec());
                    } else {
                        form.human_upload = Some(bytes.to_vec());
                    }
                }
                _ => {
                    let value = field.text().await?;
                    form.set_text(&name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "garment_url" => self.garment_url = non_blank(value),
            "human_url" => self.human_url = non_blank(value),
            "description" => self.description = value,
            "category" => self.category = non_blank(value),
            "crop" => self.crop = parse_checkbox(&value),
            "seed" => self.seed = non_blank(value),
            "steps" => self.steps = non_blank(value),
            "force_dc" => self.force_dc = parse_checkbox(&value),
            "mask_only" => self.mask_only = parse_checkbox(&value),
            other => debug!("Ignoring unknown form field '{}'", other),
        }
    }

    /// Validates every field. Decodes uploads, so call it off the async
    /// executor.
    pub fn into_request(self) -> Result<TryOnRequest> {
        let category = match self.category {
            Some(raw) => raw.parse::<Category>()?,
            None => Category::default(),
        };
        let steps = match self.steps {
            Some(raw) => Steps::new(parse_integer("steps", &raw)?)?,
            None => Steps::default(),
        };
        let seed = match self.seed {
            Some(raw) => parse_integer("seed", &raw)?,
            None => DEFAULT_SEED,
        };

        let garment = image_input("garment", self.garment_upload, self.garment_url)?;
        let human = image_input("human", self.human_upload, self.human_url)?;

        Ok(TryOnRequest {
            garment,
            human,
            params: TryOnParams {
                description: self.description,
                category,
                crop: self.crop,
                seed,
                steps,
                force_dc: self.force_dc,
                mask_only: self.mask_only,
            },
        })
    }
}

fn image_input(label: &str, upload: Option<Vec<u8>>, url: Option<String>) -> Result<ImageInput> {
    if let Some(bytes) = upload {
        let image = image::load_from_memory(&bytes).map_err(|e| {
            Error::validation(format!("Uploaded {} image could not be decoded: {}", label, e))
        })?;
        return Ok(ImageInput::Pixels(image));
    }
    match url {
        Some(url) => Ok(ImageInput::Url(url)),
        None => Err(Error::validation(format!(
            "A {} image is required: upload a file or give a URL",
            label
        ))),
    }
}

/// Accepts `12` and `12.0` (sliders and number inputs may send either).
fn parse_integer(field: &str, raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
        Ok(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(Error::validation(format!(
            "{} must be an integer, got '{}'",
            field, raw
        ))),
    }
}

fn parse_checkbox(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn url_form() -> TryOnForm {
        let mut form = TryOnForm::default();
        form.set_text("garment_url", "https://example.com/shirt.png".to_string());
        form.set_text("human_url", "https://example.com/person.png".to_string());
        form
    }

    #[test]
    fn test_defaults_applied() {
        let request = url_form().into_request().unwrap();

        assert_eq!(request.params, TryOnParams::default());
        assert!(matches!(request.garment, ImageInput::Url(ref u) if u == "https://example.com/shirt.png"));
        assert!(matches!(request.human, ImageInput::Url(_)));
    }

    #[test]
    fn test_all_fields() {
        let mut form = url_form();
        form.set_text("description", "striped polo".to_string());
        form.set_text("category", "lower_body".to_string());
        form.set_text("crop", "on".to_string());
        form.set_text("force_dc", "true".to_string());
        form.set_text("mask_only", "off".to_string());
        form.set_text("seed", "-3".to_string());
        form.set_text("steps", "25".to_string());

        let params = form.into_request().unwrap().params;
        assert_eq!(params.description, "striped polo");
        assert_eq!(params.category, Category::LowerBody);
        assert!(params.crop);
        assert!(params.force_dc);
        assert!(!params.mask_only);
        assert_eq!(params.seed, -3);
        assert_eq!(params.steps.get(), 25);
    }

    #[test]
    fn test_upload_wins_over_url() {
        let mut form = url_form();
        form.garment_upload = Some(png(6, 4));

        let request = form.into_request().unwrap();
        match request.garment {
            ImageInput::Pixels(image) => assert_eq!((image.width(), image.height()), (6, 4)),
            ImageInput::Url(_) => panic!("upload should take precedence"),
        }
    }

    #[rstest]
    #[case("steps", "0")]
    #[case("steps", "41")]
    #[case("steps", "ten")]
    #[case("steps", "12.5")]
    #[case("seed", "abc")]
    #[case("seed", "1e30")]
    #[case("seed", "-1e30")]
    #[case("seed", "inf")]
    #[case("seed", "NaN")]
    #[case("category", "shoes")]
    fn test_invalid_fields_rejected(#[case] field: &str, #[case] value: &str) {
        let mut form = url_form();
        form.set_text(field, value.to_string());

        let err = form.into_request().unwrap_err();
        assert!(err.is_validation(), "unexpected error: {}", err);
    }

    #[test]
    fn test_missing_image_rejected() {
        let mut form = TryOnForm::default();
        form.set_text("garment_url", "https://example.com/shirt.png".to_string());
        form.set_text("human_url", "   ".to_string());

        let err = form.into_request().unwrap_err();
        assert!(err.to_string().contains("human image is required"));
    }

    #[test]
    fn test_undecodable_upload_rejected() {
        let mut form = url_form();
        form.human_upload = Some(b"not an image".to_vec());

        assert!(form.into_request().unwrap_err().is_validation());
    }

    #[rstest]
    #[case("40", 40)]
    #[case("40.0", 40)]
    #[case(" 7 ", 7)]
    #[case("1e3", 1000)]
    fn test_parse_integer(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(parse_integer("steps", raw).unwrap(), expected);
    }
}
