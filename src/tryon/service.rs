use super::{
    invoker, materializer,
    normalizer::InputNormalizer,
    scratch::ScratchFiles,
    types::{TryOnOutcome, TryOnRequest},
};
use crate::{Result, replicate::InferenceClient};
use image::DynamicImage;
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};
use uuid::Uuid;

/// Runs one try-on end to end: normalize inputs, call the model, decode the
/// result. Holds no per-request state, so one instance serves every request.
pub struct TryOnService {
    normalizer: InputNormalizer,
    client: Arc<dyn InferenceClient>,
    scratch_dir: Option<PathBuf>,
}

impl TryOnService {
    pub fn new(
        normalizer: InputNormalizer,
        client: Arc<dyn InferenceClient>,
        scratch_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            normalizer,
            client,
            scratch_dir,
        }
    }

    /// Every scratch file created here is removed before returning, whether
    /// the run succeeded or not.
    pub async fn process(&self, request: TryOnRequest) -> Result<DynamicImage> {
        let request_id = Uuid::new_v4();
        self.process_with_id(request_id, request).await
    }

    pub async fn process_with_id(
        &self,
        request_id: Uuid,
        request: TryOnRequest,
    ) -> Result<DynamicImage> {
        info!(
            "Starting try-on {} (category: {})",
            request_id, request.params.category
        );

        let mut scratch = ScratchFiles::new(self.scratch_dir.clone());
        let result = self.run(request, &mut scratch).await;
        scratch.cleanup();

        if result.is_ok() {
            info!("Try-on {} finished", request_id);
        }
        result
    }

    /// Like `process`, but failures become an `Error: ...` string for display.
    pub async fn process_for_display(
        &self,
        request_id: Uuid,
        request: TryOnRequest,
    ) -> TryOnOutcome {
        let result = self.process_with_id(request_id, request).await;
        if let Err(e) = &result {
            error!("Error in try-on {}: {}", request_id, e);
        }
        TryOnOutcome::from_result(result)
    }

    async fn run(
        &self,
        request: TryOnRequest,
        scratch: &mut ScratchFiles,
    ) -> Result<DynamicImage> {
        let garment_path = scratch.create(".png")?;
        self.normalizer.normalize(request.garment, &garment_path).await?;

        let human_path = scratch.create(".png")?;
        self.normalizer.normalize(request.human, &human_path).await?;

        let output = invoker::invoke(
            self.client.as_ref(),
            &garment_path,
            &human_path,
            &request.params,
        )
        .await?;

        let result_path = scratch.create(".jpg")?;
        materializer::materialize(output, &result_path).await
    }
}
