use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::ValueType;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::TOTAL_FEATURES;

/// Error fatal de arranque: sin artefacto de modelo no se sirve nada.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("ONNX Runtime error: {0}")]
    Onnx(#[from] ort::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing ONNX {kind}")]
    MissingIo { kind: &'static str },

    #[error("label artifact defines no body locations")]
    NoLabels,

    #[error("label artifact indices are not contiguous from 0 (missing index {0})")]
    NonContiguousLabels(usize),
}

/// Error de inferencia: siempre se reporta al cliente, nunca tumba el proceso.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Invalid feature size: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("ONNX Runtime error: {0}")]
    Onnx(#[from] ort::Error),

    #[error("No output tensor found")]
    MissingOutput,

    #[error("Model returned {actual} scores for {expected} body locations")]
    OutputArity { expected: usize, actual: usize },

    #[error("Inference timed out after {0} seconds")]
    Timeout(u64),
}

/// Frontera entre la tubería y el runtime de inferencia. Permite sustituir
/// la sesión ONNX por un doble en pruebas sin artefacto real.
pub trait ModelBackend: Send {
    /// Dimensión de entrada declarada por el modelo, si el grafo la expone.
    fn input_dim(&self) -> Option<usize>;

    /// Ejecuta el modelo sobre un vector ya validado y devuelve una
    /// puntuación cruda por ubicación corporal.
    fn run(&mut self, features: &[f32]) -> Result<Vec<f32>, InferenceError>;
}

/// Backend real: sesión ONNX Runtime con los nombres de tensores
/// resueltos una sola vez al cargar.
#[derive(Debug)]
pub struct OnnxBackend {
    session: Session,
    input_name: String,
    output_name: String,
    input_dim: Option<usize>,
}

impl OnnxBackend {
    pub fn load(model_path: &str) -> Result<Self, ModelLoadError> {
        if !Path::new(model_path).exists() {
            return Err(ModelLoadError::ArtifactNotFound(model_path.to_string()));
        }

        let session = Session::builder()?.commit_from_file(model_path)?;

        let input = session
            .inputs
            .first()
            .ok_or(ModelLoadError::MissingIo { kind: "input" })?;
        let input_name = input.name.clone();

        // Última dimensión declarada del tensor de entrada; las dimensiones
        // dinámicas (-1) se ignoran.
        let input_dim = match &input.input_type {
            ValueType::Tensor { shape, .. } => shape
                .last()
                .copied()
                .filter(|&dim| dim > 0)
                .map(|dim| dim as usize),
            _ => None,
        };

        let output_name = session
            .outputs
            .iter()
            .find(|output| {
                matches!(
                    output.output_type,
                    ValueType::Tensor {
                        ty: TensorElementType::Float32,
                        ..
                    }
                )
            })
            .or_else(|| session.outputs.first())
            .map(|output| output.name.clone())
            .ok_or(ModelLoadError::MissingIo { kind: "output" })?;

        log::info!("[ONNX] Modelo cargado: {}", model_path);
        log::info!("[ONNX] Input: {} (dim={:?})", input_name, input_dim);
        log::info!("[ONNX] Output: {}", output_name);

        Ok(Self {
            session,
            input_name,
            output_name,
            input_dim,
        })
    }
}

impl ModelBackend for OnnxBackend {
    fn input_dim(&self) -> Option<usize> {
        self.input_dim
    }

    fn run(&mut self, features: &[f32]) -> Result<Vec<f32>, InferenceError> {
        // Tensor de entrada [1, n]
        let shape = vec![1_usize, features.len()];
        let input_value = ort::value::Value::from_array((shape, features.to_vec()))?;

        let outputs = self.session.run(ort::inputs![
            self.input_name.as_str() => &input_value,
        ])?;

        let (out_shape, out_data) = outputs
            .get(self.output_name.as_str())
            .ok_or(InferenceError::MissingOutput)?
            .try_extract_tensor::<f32>()?;

        let count = if out_shape.len() >= 2 {
            out_shape[1] as usize
        } else {
            out_shape.first().copied().unwrap_or(0) as usize
        };
        if count == 0 || out_data.len() < count {
            return Err(InferenceError::MissingOutput);
        }

        Ok(out_data[..count].to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct LocationsJson {
    index_to_class: HashMap<String, String>,
}

/// Ordena el artefacto {"index_to_class": {"0": "meja", ...}} por índice.
/// El índice i del tensor de salida corresponde a la etiqueta i.
pub fn parse_labels(content: &str) -> Result<Vec<String>, ModelLoadError> {
    let data: LocationsJson = serde_json::from_str(content)?;

    let mut pairs: Vec<(usize, String)> = data
        .index_to_class
        .into_iter()
        .filter_map(|(k, v)| k.parse::<usize>().ok().map(|idx| (idx, v)))
        .collect();
    pairs.sort_by_key(|(idx, _)| *idx);

    if pairs.is_empty() {
        return Err(ModelLoadError::NoLabels);
    }

    // Un hueco en los índices desplazaría cada etiqueta posterior a la
    // salida equivocada del modelo.
    for (expected, (idx, _)) in pairs.iter().enumerate() {
        if *idx != expected {
            return Err(ModelLoadError::NonContiguousLabels(expected));
        }
    }

    Ok(pairs.into_iter().map(|(_, name)| name).collect())
}

/// Envuelve el artefacto preentrenado. Se construye una única vez en el
/// arranque y es de solo lectura durante toda la vida del proceso.
pub struct PostureClassifier {
    backend: Box<dyn ModelBackend>,
    labels: Vec<String>,
    expected_dim: usize,
}

impl PostureClassifier {
    /// Carga el modelo ONNX y las etiquetas de ubicación corporal.
    pub fn new(model_path: &str, labels_path: &str) -> Result<Self, ModelLoadError> {
        let labels = parse_labels(&fs::read_to_string(labels_path)?)?;
        let backend = OnnxBackend::load(model_path)?;

        log::info!("[ONNX] Ubicaciones corporales: {:?}", labels);

        Ok(Self::from_parts(Box::new(backend), labels))
    }

    /// Construye el clasificador sobre un backend arbitrario (dobles de
    /// prueba incluidos). Si el modelo no declara dimensión de entrada se
    /// asume el ancho del vector de entrenamiento.
    pub fn from_parts(backend: Box<dyn ModelBackend>, labels: Vec<String>) -> Self {
        let expected_dim = backend.input_dim().unwrap_or(TOTAL_FEATURES);
        Self {
            backend,
            labels,
            expected_dim,
        }
    }

    /// Predice la severidad por ubicación corporal.
    ///
    /// La longitud del vector se valida ANTES de invocar el modelo; con un
    /// tamaño incorrecto el backend ni se toca. Las puntuaciones negativas
    /// del regresor se truncan a cero: el contrato de salida es un entero
    /// de severidad no negativo.
    pub fn predict(&mut self, features: &[f32]) -> Result<BTreeMap<String, u32>, InferenceError> {
        if features.len() != self.expected_dim {
            return Err(InferenceError::DimensionMismatch {
                expected: self.expected_dim,
                actual: features.len(),
            });
        }

        let raw_scores = self.backend.run(features)?;
        if raw_scores.len() != self.labels.len() {
            return Err(InferenceError::OutputArity {
                expected: self.labels.len(),
                actual: raw_scores.len(),
            });
        }

        let scores = self
            .labels
            .iter()
            .zip(&raw_scores)
            .map(|(label, &value)| (label.clone(), value.round().max(0.0) as u32))
            .collect();

        Ok(scores)
    }

    /// Etiquetas de ubicación corporal en orden de índice del modelo.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{body_locations, StubBackend};
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn wrong_length_fails_without_invoking_backend() {
        let stub = StubBackend::new(vec![2.0, 3.0, 1.0, 2.0]);
        let calls = stub.calls.clone();
        let mut classifier = PostureClassifier::from_parts(Box::new(stub), body_locations());

        let err = classifier.predict(&[0.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::DimensionMismatch {
                expected: 18,
                actual: 5
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn declared_input_dim_overrides_default() {
        let mut stub = StubBackend::new(vec![0.0; 4]);
        stub.dim = Some(12);
        let mut classifier = PostureClassifier::from_parts(Box::new(stub), body_locations());

        assert!(classifier.predict(&[0.0; 18]).is_err());
        assert!(classifier.predict(&[0.0; 12]).is_ok());
    }

    #[test]
    fn scores_map_to_labels_in_index_order() {
        let stub = StubBackend::new(vec![2.0, 3.0, 1.0, 2.0]);
        let mut classifier = PostureClassifier::from_parts(Box::new(stub), body_locations());

        let scores = classifier.predict(&[0.0; 18]).unwrap();
        assert_eq!(scores["meja"], 2);
        assert_eq!(scores["mulut"], 3);
        assert_eq!(scores["kepala_depan"], 1);
        assert_eq!(scores["kepala_belakang"], 2);
    }

    #[test]
    fn regressor_noise_is_rounded_and_clamped() {
        let stub = StubBackend::new(vec![1.6, -0.04, 2.49, 0.0]);
        let mut classifier = PostureClassifier::from_parts(Box::new(stub), body_locations());

        let scores = classifier.predict(&[0.0; 18]).unwrap();
        assert_eq!(scores["meja"], 2);
        assert_eq!(scores["mulut"], 0);
        assert_eq!(scores["kepala_depan"], 2);
        assert_eq!(scores["kepala_belakang"], 0);
    }

    #[test]
    fn output_arity_mismatch_is_an_error() {
        let stub = StubBackend::new(vec![1.0, 2.0]);
        let mut classifier = PostureClassifier::from_parts(Box::new(stub), body_locations());

        let err = classifier.predict(&[0.0; 18]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::OutputArity {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn labels_parse_sorted_by_model_index() {
        let labels = parse_labels(
            r#"{"index_to_class": {"2": "kepala_depan", "0": "meja", "3": "kepala_belakang", "1": "mulut"}}"#,
        )
        .unwrap();
        assert_eq!(labels, body_locations());
    }

    #[test]
    fn gapped_label_indices_are_rejected() {
        let err = parse_labels(r#"{"index_to_class": {"0": "meja", "2": "mulut"}}"#).unwrap_err();
        assert!(matches!(err, ModelLoadError::NonContiguousLabels(1)));
    }

    #[test]
    fn empty_label_artifact_is_rejected() {
        let err = parse_labels(r#"{"index_to_class": {}}"#).unwrap_err();
        assert!(matches!(err, ModelLoadError::NoLabels));
    }

    #[test]
    fn missing_model_artifact_fails_at_load() {
        let err = OnnxBackend::load("no_existe/posture_rf.onnx").unwrap_err();
        assert!(matches!(err, ModelLoadError::ArtifactNotFound(_)));
    }
}
