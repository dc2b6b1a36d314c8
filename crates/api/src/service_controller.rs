use std::sync::Arc;

use axum::extract::Path;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use log::{error, info};
use serde_json::json;

use price_engine::InferenceEngine;

pub struct ServiceController {
    inference_engine: Arc<InferenceEngine>,
}

impl ServiceController {
    pub fn new(inference_engine: Arc<InferenceEngine>) -> Self {
        Self { inference_engine }
    }

    pub fn router(self) -> Router {
        let inference_engine = self.inference_engine.clone();

        Router::new()
            .route("/", get(ServiceController::status))
            .route("/api/health", get(ServiceController::status))
            .route(
                "/inference/:token",
                get({
                    let inference_engine = inference_engine.clone();
                    move |Path(token): Path<String>| async move {
                        ServiceController::get_inference(inference_engine.clone(), token).await
                    }
                }),
            )
    }

    /// Health check endpoint
    pub async fn status() -> impl IntoResponse {
        let response = json!({
            "message": "Service is running...",
            "status": "ok"
        });
        (StatusCode::OK, Json(response))
    }

    /// Adjusted USD price for a token symbol or block height, as plain text
    pub async fn get_inference(
        inference_engine: Arc<InferenceEngine>,
        token: String,
    ) -> impl IntoResponse {
        info!("Inference requested for {}", token);

        match inference_engine.infer(&token).await {
            Ok(price) => (StatusCode::OK, price),
            Err(err) => {
                error!("Inference for {} failed: {}", token, err);
                let status = if err.is_bad_request() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, format!("Error: {}", err))
            }
        }
    }
}
