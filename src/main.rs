/*
Servicio de puntuación ergonómica de postura - Rust + ONNX

Recibe muestras crudas de 3 sensores MPU6050 corporales vía HTTP POST,
las convierte a unidades físicas, arma el vector de características en el
orden de entrenamiento y predice la severidad por ubicación corporal con
un modelo preentrenado.

El modelo ONNX y las etiquetas se configuran en posturoscopio.toml
(o vía POSTUROSCOPIO_CONFIG). Sin artefacto de modelo el proceso no arranca.
*/

use anyhow::{Context, Result};
use log::info;

use posturoscopio::config::ServiceConfig;
use posturoscopio::posture_classifier::PostureClassifier;
use posturoscopio::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServiceConfig::load().context("Configuración inválida")?;

    info!("🔧 Inicializando clasificador ONNX...");
    // Fallo fatal: sin modelo no se acepta ninguna petición.
    let classifier = PostureClassifier::new(&config.model_path, &config.labels_path)
        .with_context(|| format!("No se pudo cargar el modelo {:?}", config.model_path))?;
    info!("✅ Clasificador cargado ({} ubicaciones)", classifier.labels().len());

    let state = AppState::new(classifier, &config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("No se pudo escuchar en {}", config.listen))?;
    info!("✅ Servidor escuchando en {}", config.listen);

    axum::serve(listener, app).await?;
    Ok(())
}
