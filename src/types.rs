/// Muestra cruda de un sensor MPU6050: cuentas del acelerómetro y giroscopio
/// tal como llegan del firmware, sin calibrar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawSensorSample {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

/// Lectura completa de una petición: los 3 sensores corporales en orden de id (1, 2, 3).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawReading {
    pub sensors: [RawSensorSample; NUM_SENSORS],
}

/// Muestra de un sensor ya convertida a unidades físicas:
/// aceleración en m/s², velocidad angular en rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibratedSample {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

/// Vector de características en el orden exacto de entrenamiento:
/// [ax1, ay1, az1, gx1, gy1, gz1, ax2..gz2, ax3..gz3]
pub type FeatureVector = [f32; TOTAL_FEATURES];

/// Constantes del sistema
pub const NUM_SENSORS: usize = 3;
pub const CHANNELS_PER_SENSOR: usize = 6; // ax, ay, az, gx, gy, gz
pub const TOTAL_FEATURES: usize = NUM_SENSORS * CHANNELS_PER_SENSOR; // 18

/// Nombres canónicos de canal, en el orden interno de cada sensor.
pub const CHANNEL_NAMES: [&str; CHANNELS_PER_SENSOR] = ["ax", "ay", "az", "gx", "gy", "gz"];

/// Nombre de campo del protocolo para un canal de un sensor: "ax1", "gy3", etc.
/// Los ids de sensor del protocolo empiezan en 1.
pub fn field_name(channel: &str, sensor_idx: usize) -> String {
    format!("{}{}", channel, sensor_idx + 1)
}

/// Los 18 nombres de campo en orden canónico (el mismo orden que el vector final).
pub fn canonical_fields() -> Vec<String> {
    let mut fields = Vec::with_capacity(TOTAL_FEATURES);
    for sensor_idx in 0..NUM_SENSORS {
        for channel in CHANNEL_NAMES {
            fields.push(field_name(channel, sensor_idx));
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_fields_cover_all_channels() {
        let fields = canonical_fields();
        assert_eq!(fields.len(), TOTAL_FEATURES);
        assert_eq!(fields[0], "ax1");
        assert_eq!(fields[5], "gz1");
        assert_eq!(fields[6], "ax2");
        assert_eq!(fields[17], "gz3");
    }
}
