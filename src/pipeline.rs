use serde_json::{Map, Value};
use thiserror::Error;

use crate::feature_vector::assemble;
use crate::posture_classifier::{InferenceError, PostureClassifier};
use crate::sample_parser::{parse_reading, ValidationError};
use crate::score_aggregator::{aggregate, PostureReport};
use crate::unit_converter::ConversionConfig;

/// Fallos de la tubería que se reportan al cliente. Cualquier etapa que
/// falle corta las etapas restantes; no hay reintentos.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Tubería completa: Parse → Convert → Assemble → Classify → Aggregate.
/// Sin estado entre peticiones; idempotente ante entrada idéntica.
pub fn score_reading(
    classifier: &mut PostureClassifier,
    conversion: &ConversionConfig,
    payload: &Map<String, Value>,
) -> Result<PostureReport, PipelineError> {
    let reading = parse_reading(payload)?;
    let calibrated = reading.sensors.map(|sensor| conversion.convert_sample(&sensor));
    let features = assemble(&calibrated);
    let scores = classifier.predict(&features)?;
    Ok(aggregate(scores))
}
