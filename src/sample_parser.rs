use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{RawReading, RawSensorSample, CHANNEL_NAMES, NUM_SENSORS};

/// Error de validación del payload: acumula TODOS los campos problemáticos
/// para que el cliente pueda corregirlos en una sola vuelta.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid sensor payload: {}", issues.join(", "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

/// Extrae un valor numérico de un campo JSON. Los clientes del firmware
/// envían tanto números como cadenas numéricas ("16384").
fn numeric_value(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

/// Valida y extrae los 18 campos `ax1..gz3` de un mapa sin tipar.
/// Cada sensor se materializa una sola vez como registro estructurado;
/// ningún campo ausente recibe un valor por defecto.
pub fn parse_reading(payload: &Map<String, Value>) -> Result<RawReading, ValidationError> {
    let mut reading = RawReading::default();
    let mut issues = Vec::new();

    for sensor_idx in 0..NUM_SENSORS {
        let mut sample = RawSensorSample::default();

        for channel in CHANNEL_NAMES {
            let field = crate::types::field_name(channel, sensor_idx);
            match payload.get(&field) {
                None => issues.push(format!("missing field {}", field)),
                Some(value) => match numeric_value(value) {
                    Some(parsed) => {
                        let slot = match channel {
                            "ax" => &mut sample.ax,
                            "ay" => &mut sample.ay,
                            "az" => &mut sample.az,
                            "gx" => &mut sample.gx,
                            "gy" => &mut sample.gy,
                            _ => &mut sample.gz,
                        };
                        *slot = parsed;
                    }
                    None => issues.push(format!("non-numeric field {}", field)),
                },
            }
        }

        reading.sensors[sensor_idx] = sample;
    }

    if issues.is_empty() {
        Ok(reading)
    } else {
        Err(ValidationError { issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::canonical_fields;
    use serde_json::json;

    fn full_payload() -> Map<String, Value> {
        let mut payload = Map::new();
        for (idx, field) in canonical_fields().into_iter().enumerate() {
            payload.insert(field, json!(idx as f64));
        }
        payload
    }

    #[test]
    fn parses_complete_payload() {
        let reading = parse_reading(&full_payload()).unwrap();
        // ax1 es el campo 0, gz3 el 17
        assert_eq!(reading.sensors[0].ax, 0.0);
        assert_eq!(reading.sensors[0].gz, 5.0);
        assert_eq!(reading.sensors[1].ax, 6.0);
        assert_eq!(reading.sensors[2].gz, 17.0);
    }

    #[test]
    fn accepts_numeric_strings() {
        let mut payload = full_payload();
        payload.insert("ax1".to_string(), json!("16384"));
        payload.insert("gy2".to_string(), json!(" -131.5 "));
        let reading = parse_reading(&payload).unwrap();
        assert_eq!(reading.sensors[0].ax, 16384.0);
        assert_eq!(reading.sensors[1].gy, -131.5);
    }

    #[test]
    fn missing_field_is_named() {
        let mut payload = full_payload();
        payload.remove("gy2");
        let err = parse_reading(&payload).unwrap_err();
        assert_eq!(err.issues, vec!["missing field gy2".to_string()]);
    }

    #[test]
    fn every_offending_field_is_reported() {
        let mut payload = full_payload();
        payload.remove("ax1");
        payload.remove("gz3");
        payload.insert("az2".to_string(), json!("not-a-number"));
        payload.insert("gx3".to_string(), json!(null));

        let err = parse_reading(&payload).unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                "missing field ax1".to_string(),
                "non-numeric field az2".to_string(),
                "non-numeric field gx3".to_string(),
                "missing field gz3".to_string(),
            ]
        );
        let message = err.to_string();
        assert!(message.contains("ax1"));
        assert!(message.contains("gz3"));
    }

    #[test]
    fn empty_payload_reports_all_eighteen_fields() {
        let err = parse_reading(&Map::new()).unwrap_err();
        assert_eq!(err.issues.len(), 18);
    }
}
