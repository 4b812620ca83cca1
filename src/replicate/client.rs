use super::types::*;
use crate::{Error, Result, config::ReplicateConfig};
use async_trait::async_trait;
use reqwest::Response;
use std::time::Duration;
use tracing::{debug, info};

/// A hosted model that turns a prediction input into output file bytes.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn run(&self, input: &PredictionInput) -> Result<Vec<u8>>;
}

pub struct ReplicateClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    model: ModelRef,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(config: &ReplicateConfig, http: reqwest::Client) -> Result<Self> {
        let model: ModelRef = config.model.parse()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            model,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    pub fn model(&self) -> &ModelRef {
        &self.model
    }

    async fn create_prediction(&self, input: &PredictionInput) -> Result<Prediction> {
        let endpoint = format!("{}/predictions", self.base_url);
        let body = CreatePrediction {
            version: &self.model.version,
            input,
        };

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::remote(format!("Replicate request failed ({}): {}", endpoint, e)))?;

        parse_prediction("Replicate create prediction", response).await
    }

    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction> {
        loop {
            if prediction.status.is_terminal() {
                return Ok(prediction);
            }
            if prediction.status == PredictionStatus::Unknown {
                return Err(Error::remote(format!(
                    "Prediction {} reported an unrecognized status",
                    prediction.id
                )));
            }

            let poll_url = prediction
                .poll_url()
                .ok_or_else(|| Error::remote("Replicate prediction missing poll URL"))?
                .to_string();

            debug!(
                "Prediction {} is {:?}, polling again in {:?}",
                prediction.id, prediction.status, self.poll_interval
            );
            tokio::time::sleep(self.poll_interval).await;

            let response = self
                .http
                .get(&poll_url)
                .bearer_auth(&self.api_token)
                .send()
                .await
                .map_err(|e| {
                    Error::remote(format!("Replicate poll request failed ({}): {}", poll_url, e))
                })?;
            prediction = parse_prediction("Replicate poll", response).await?;
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(|e| {
            Error::remote(format!("Failed downloading Replicate output ({}): {}", url, e))
        })?;
        let response = ensure_success("Replicate output download", response).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl InferenceClient for ReplicateClient {
    async fn run(&self, input: &PredictionInput) -> Result<Vec<u8>> {
        info!("Running model {}", self.model);

        let created = self.create_prediction(input).await?;
        debug!("Created prediction {} ({:?})", created.id, created.status);

        let prediction = self.wait_for(created).await?;
        if prediction.status != PredictionStatus::Succeeded {
            return Err(Error::remote(format!(
                "Prediction {} {:?}: {}",
                prediction.id,
                prediction.status,
                prediction.error_message()
            )));
        }

        let output_url = prediction.output_url().ok_or_else(|| {
            Error::remote(format!("Prediction {} returned no output file", prediction.id))
        })?;
        let bytes = self.download(output_url).await?;

        info!(
            "Prediction {} succeeded, downloaded {} bytes",
            prediction.id,
            bytes.len()
        );
        Ok(bytes)
    }
}

async fn ensure_success(context: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::remote(format!(
        "{} failed with HTTP {}: {}",
        context,
        status,
        truncate(&body, 512)
    )))
}

async fn parse_prediction(context: &str, response: Response) -> Result<Prediction> {
    let response = ensure_success(context, response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        Error::remote(format!(
            "{} returned an unreadable prediction: {} ({})",
            context,
            e,
            truncate(&body, 200)
        ))
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
