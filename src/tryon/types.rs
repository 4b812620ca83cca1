use crate::{Error, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One of the two images a try-on needs.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Already-decoded pixels, e.g. from a browser upload.
    Pixels(DynamicImage),
    /// A remote image, fetched and stored verbatim.
    Url(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    UpperBody,
    LowerBody,
    Dress,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::UpperBody, Category::LowerBody, Category::Dress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpperBody => "upper_body",
            Self::LowerBody => "lower_body",
            Self::Dress => "dress",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| {
                Error::validation(format!(
                    "Invalid category '{}': expected one of upper_body, lower_body, dress",
                    s
                ))
            })
    }
}

/// Diffusion step count, always within `Steps::MIN..=Steps::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Steps(u8);

impl Steps {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 40;

    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::validation(format!(
                "steps must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Steps {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for Steps {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

pub const DEFAULT_SEED: i64 = 42;

/// Scalar knobs forwarded to the model alongside the two images.
#[derive(Debug, Clone, PartialEq)]
pub struct TryOnParams {
    pub description: String,
    pub category: Category,
    pub crop: bool,
    pub seed: i64,
    pub steps: Steps,
    pub force_dc: bool,
    pub mask_only: bool,
}

impl Default for TryOnParams {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: Category::default(),
            crop: false,
            seed: DEFAULT_SEED,
            steps: Steps::default(),
            force_dc: false,
            mask_only: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TryOnRequest {
    pub garment: ImageInput,
    pub human: ImageInput,
    pub params: TryOnParams,
}

/// What the page shows: the composite, or an error string in its place.
#[derive(Debug)]
pub enum TryOnOutcome {
    Image(DynamicImage),
    Error(String),
}

impl TryOnOutcome {
    pub fn from_result(result: Result<DynamicImage>) -> Self {
        match result {
            Ok(image) => Self::Image(image),
            Err(e) => Self::Error(format!("Error: {}", e)),
        }
    }
}
