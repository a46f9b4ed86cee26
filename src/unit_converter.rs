use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::types::{CalibratedSample, RawSensorSample};

/// Constantes físicas de conversión para el MPU6050 en rango ±2g / ±250°/s.
/// Son parte de la configuración del servicio: nunca se hornean en los
/// puntos de uso.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    /// Sensibilidad del acelerómetro en cuentas por g
    pub acc_sensitivity: f32,
    /// Sensibilidad del giroscopio en cuentas por (°/s)
    pub gyro_sensitivity: f32,
    /// Aceleración gravitacional estándar en m/s²
    pub gravity: f32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            acc_sensitivity: 16384.0,
            gyro_sensitivity: 131.0,
            gravity: 9.80665,
        }
    }
}

impl ConversionConfig {
    /// Cuentas crudas del acelerómetro → m/s²
    pub fn accel_to_ms2(&self, raw: f32) -> f32 {
        (raw / self.acc_sensitivity) * self.gravity
    }

    /// Cuentas crudas del giroscopio → rad/s
    pub fn gyro_to_rads(&self, raw: f32) -> f32 {
        (raw / self.gyro_sensitivity) * (PI / 180.0)
    }

    /// Convierte los seis canales de un sensor a unidades físicas.
    pub fn convert_sample(&self, raw: &RawSensorSample) -> CalibratedSample {
        CalibratedSample {
            ax: self.accel_to_ms2(raw.ax),
            ay: self.accel_to_ms2(raw.ay),
            az: self.accel_to_ms2(raw.az),
            gx: self.gyro_to_rads(raw.gx),
            gy: self.gyro_to_rads(raw.gy),
            gz: self.gyro_to_rads(raw.gz),
        }
    }
}
