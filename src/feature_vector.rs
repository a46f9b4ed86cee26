use crate::types::{CalibratedSample, FeatureVector, CHANNELS_PER_SENSOR, NUM_SENSORS};

/// Concatena las muestras calibradas de los 3 sensores en el vector de
/// características que consume el clasificador.
///
/// El orden es un contrato fijado en entrenamiento y NO puede cambiar:
/// sensores en orden de id (1, 2, 3) y dentro de cada sensor
/// [ax, ay, az, gx, gy, gz]. Un reordenamiento no falla: produce
/// predicciones incorrectas en silencio.
pub fn assemble(samples: &[CalibratedSample; NUM_SENSORS]) -> FeatureVector {
    let mut features = FeatureVector::default();
    for (sensor_idx, sample) in samples.iter().enumerate() {
        let base = sensor_idx * CHANNELS_PER_SENSOR;
        features[base] = sample.ax;
        features[base + 1] = sample.ay;
        features[base + 2] = sample.az;
        features[base + 3] = sample.gx;
        features[base + 4] = sample.gy;
        features[base + 5] = sample.gz;
    }
    features
}
