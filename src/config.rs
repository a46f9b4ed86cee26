use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::unit_converter::ConversionConfig;

/// Variable de entorno que apunta al archivo de configuración TOML.
pub const CONFIG_ENV: &str = "POSTUROSCOPIO_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "posturoscopio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML error in {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Configuración del servicio. Todos los campos tienen valor por defecto;
/// el archivo TOML solo necesita declarar lo que cambia.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Dirección de escucha del servidor HTTP
    pub listen: String,
    /// Ruta del artefacto ONNX preentrenado
    pub model_path: String,
    /// Ruta del artefacto JSON con las ubicaciones corporales
    pub labels_path: String,
    /// Tiempo máximo de inferencia por petición, en segundos
    pub timeout_secs: u64,
    /// Constantes físicas de conversión
    pub conversion: ConversionConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
            model_path: "posture_rf.onnx".to_string(),
            labels_path: "body_locations.json".to_string(),
            timeout_secs: 10,
            conversion: ConversionConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Lee la configuración desde un archivo TOML.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_string(),
            source,
        })
    }

    /// Resuelve la configuración del proceso: `POSTUROSCOPIO_CONFIG` si está
    /// definida, si no `posturoscopio.toml` cuando existe, si no los defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }
        Ok(Self::default())
    }
}
