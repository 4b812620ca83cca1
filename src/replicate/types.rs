use crate::{Error, Result, tryon::Category};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// `owner/name:version`, the form Replicate uses to pin a model build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: String,
}

impl FromStr for ModelRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::config(format!(
                "Invalid model identifier '{}': expected owner/name:version",
                s
            ))
        };

        let (slug, version) = s.trim().split_once(':').ok_or_else(invalid)?;
        let (owner, name) = slug.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || version.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.name, self.version)
    }
}

/// Input schema of the IDM-VTON model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub garm_img: String,
    pub human_img: String,
    pub garment_des: String,
    pub category: Category,
    pub crop: bool,
    pub seed: i64,
    pub steps: u8,
    pub force_dc: bool,
    pub mask_only: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatePrediction<'a> {
    pub version: &'a str,
    pub input: &'a PredictionInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub get: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

impl Prediction {
    pub fn poll_url(&self) -> Option<&str> {
        self.urls
            .as_ref()
            .and_then(|u| u.get.as_deref())
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// The output file URL. The model returns a single URL, but a list is
    /// accepted too and its first entry used.
    pub fn output_url(&self) -> Option<&str> {
        let url = match self.output.as_ref()? {
            Value::String(url) => Some(url.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(msg)) => msg.clone(),
            Some(Value::Null) | None => "no error message".to_string(),
            Some(other) => other.to_string(),
        }
    }
}
