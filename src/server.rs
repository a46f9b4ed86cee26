use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::pipeline::{score_reading, PipelineError};
use crate::posture_classifier::{InferenceError, PostureClassifier};
use crate::unit_converter::ConversionConfig;

/// Estado compartido del servidor. El clasificador se carga una sola vez;
/// el mutex existe únicamente porque `Session::run` exige `&mut self`,
/// nadie escribe el modelo después del arranque.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Mutex<PostureClassifier>>,
    pub conversion: ConversionConfig,
    pub timeout_secs: u64,
}

impl AppState {
    pub fn new(classifier: PostureClassifier, config: &ServiceConfig) -> Self {
        Self {
            classifier: Arc::new(Mutex::new(classifier)),
            conversion: config.conversion,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}

/// Sonda de vida: el servidor solo llega a arrancar con el modelo cargado.
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    let body = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    };
    (StatusCode::OK, Json(body))
}

/// POST /predict: payload con los 18 campos `ax1..gz3`.
///
/// La inferencia es síncrona y de CPU, así que corre en `spawn_blocking`
/// acotada por el timeout configurado. Errores de validación e inferencia
/// vuelven como 400 con mensaje descriptivo; nunca tumban el proceso.
///
/// Ojo: un timeout responde al cliente pero NO cancela la tarea bloqueante;
/// la sesión (y su mutex) siguen ocupados hasta que el modelo termine, y las
/// peticiones siguientes esperan detrás de la atascada.
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Response {
    let timeout_secs = state.timeout_secs;
    let classifier = state.classifier.clone();
    let conversion = state.conversion;

    let task = tokio::task::spawn_blocking(move || {
        // Un pánico previo envenena el mutex pero no deja estado a medias:
        // la sesión es de solo lectura, así que se recupera el guard.
        let mut guard = classifier
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        score_reading(&mut guard, &conversion, &payload)
    });

    let outcome = match tokio::time::timeout(Duration::from_secs(timeout_secs), task).await {
        Err(_) => Err(PipelineError::Inference(InferenceError::Timeout(
            timeout_secs,
        ))),
        Ok(Err(join_err)) => {
            log::error!("❌ Tarea de inferencia abortada: {}", join_err);
            let body = ErrorResponse {
                error: "internal inference failure".to_string(),
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
        Ok(Ok(result)) => result,
    };

    match outcome {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => {
            log::warn!("⚠️  Petición rechazada: {}", err);
            let body = ErrorResponse {
                error: err.to_string(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}
