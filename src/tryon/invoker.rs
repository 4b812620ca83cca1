use super::types::TryOnParams;
use crate::{
    Result,
    replicate::{InferenceClient, PredictionInput},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::Path;
use tracing::debug;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Packs both image files and the scalar params into the model's input schema.
pub async fn build_input(
    garment: &Path,
    human: &Path,
    params: &TryOnParams,
) -> Result<PredictionInput> {
    let garm_img = data_uri(&tokio::fs::read(garment).await?);
    let human_img = data_uri(&tokio::fs::read(human).await?);

    Ok(PredictionInput {
        garm_img,
        human_img,
        garment_des: params.description.clone(),
        category: params.category,
        crop: params.crop,
        seed: params.seed,
        steps: params.steps.get(),
        force_dc: params.force_dc,
        mask_only: params.mask_only,
    })
}

/// One call to the remote model, no retries.
pub async fn invoke(
    client: &dyn InferenceClient,
    garment: &Path,
    human: &Path,
    params: &TryOnParams,
) -> Result<Vec<u8>> {
    let input = build_input(garment, human, params).await?;
    debug!(
        "Invoking model: category={} steps={} seed={} crop={} force_dc={} mask_only={}",
        input.category, input.steps, input.seed, input.crop, input.force_dc, input.mask_only
    );
    client.run(&input).await
}

pub fn data_uri(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME);
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
