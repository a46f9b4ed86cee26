use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde_json::{Map, Value};

use crate::sample_parser::parse_reading;
use crate::types::RawReading;

/// Carga lecturas crudas desde un CSV con cabecera `ax1,ay1,...,gz3`
/// (una lectura por fila, columnas en cualquier orden).
pub fn load_readings_from_csv(path: impl AsRef<Path>) -> Result<Vec<RawReading>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;
    readings_from_reader(file).with_context(|| format!("CSV inválido: {:?}", path))
}

/// Cada fila pasa por el mismo validador que el payload HTTP: campos
/// faltantes o no numéricos se reportan con nombre y número de fila.
pub fn readings_from_reader<R: Read>(reader: R) -> Result<Vec<RawReading>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut readings = Vec::new();

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("Fila {} ilegible", row_idx + 1))?;

        let payload: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), Value::String(value.to_string())))
            .collect();

        let reading = parse_reading(&payload)
            .with_context(|| format!("Fila {} inválida", row_idx + 1))?;
        readings.push(reading);
    }

    if readings.is_empty() {
        bail!("El CSV no contiene lecturas");
    }

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::canonical_fields;

    fn header() -> String {
        canonical_fields().join(",")
    }

    #[test]
    fn loads_rows_in_canonical_column_order() {
        let csv = format!(
            "{}\n16384,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,131\n",
            header()
        );
        let readings = readings_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensors[0].ax, 16384.0);
        assert_eq!(readings[0].sensors[2].gz, 131.0);
    }

    #[test]
    fn column_order_does_not_matter() {
        let mut fields = canonical_fields();
        fields.reverse();
        let values: Vec<String> = (0..18).map(|v| v.to_string()).collect();
        let csv = format!("{}\n{}\n", fields.join(","), values.join(","));

        let readings = readings_from_reader(csv.as_bytes()).unwrap();
        // gz3 es la primera columna invertida
        assert_eq!(readings[0].sensors[2].gz, 0.0);
        assert_eq!(readings[0].sensors[0].ax, 17.0);
    }

    #[test]
    fn row_with_missing_column_names_the_field() {
        let truncated = canonical_fields()[..17].join(",");
        let values: Vec<String> = (0..17).map(|v| v.to_string()).collect();
        let csv = format!("{}\n{}\n", truncated, values.join(","));

        let err = readings_from_reader(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("gz3"));
    }

    #[test]
    fn empty_csv_is_rejected() {
        let csv = format!("{}\n", header());
        assert!(readings_from_reader(csv.as_bytes()).is_err());
    }
}
