use super::{
    form::TryOnForm,
    types::{ErrorResponse, HealthResponse, TryOnResponse},
};
use crate::{
    Error, Result,
    tryon::{TryOnOutcome, TryOnService},
};
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{Html, Json},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat};
use std::{io::Cursor, sync::Arc};
use tracing::{error, info, warn};
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TryOnService>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn try_on(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<TryOnResponse>, HandlerError> {
    let request_id = Uuid::new_v4();
    info!("Received try-on request {}", request_id);

    let multipart = multipart.map_err(|rejection| {
        warn!("Rejected non-multipart body for {}: {}", request_id, rejection.body_text());
        reject(rejection.status(), rejection.body_text())
    })?;

    let form = TryOnForm::from_multipart(multipart).await.map_err(|e| {
        warn!("Rejected malformed form for {}: {}", request_id, e);
        let status = match &e {
            Error::Multipart(m) => m.status(),
            _ => StatusCode::BAD_REQUEST,
        };
        reject(status, e.to_string())
    })?;

    let request = tokio::task::spawn_blocking(move || form.into_request())
        .await
        .map_err(Error::from)
        .and_then(|r| r)
        .map_err(|e| {
            warn!("Rejected invalid form for {}: {}", request_id, e);
            let status = if e.is_validation() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            reject(status, e.to_string())
        })?;

    let image = match state.service.process_for_display(request_id, request).await {
        TryOnOutcome::Image(image) => image,
        TryOnOutcome::Error(message) => {
            return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, message));
        }
    };

    let (width, height) = (image.width(), image.height());
    let encoded = tokio::task::spawn_blocking(move || png_data_uri(&image))
        .await
        .map_err(Error::from)
        .and_then(|r| r)
        .map_err(|e| {
            error!("Failed to encode result for {}: {}", request_id, e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        })?;

    Ok(Json(TryOnResponse {
        request_id: request_id.to_string(),
        image: encoded,
        width,
        height,
    }))
}

fn reject(status: StatusCode, message: String) -> HandlerError {
    (status, Json(ErrorResponse { error: message }))
}

pub fn png_data_uri(image: &DynamicImage) -> Result<String> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&bytes)))
}
