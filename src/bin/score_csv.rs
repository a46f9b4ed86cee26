use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use posturoscopio::config::ServiceConfig;
use posturoscopio::csv_loader::load_readings_from_csv;
use posturoscopio::feature_vector::assemble;
use posturoscopio::posture_classifier::PostureClassifier;
use posturoscopio::score_aggregator::aggregate;

struct ReplayOptions {
    dump_features: bool,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut dump_features = false;
    let mut csv_path: Option<PathBuf> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dump-features" => dump_features = true,
            _ => {
                if csv_path.is_some() {
                    bail!("Uso: score_csv [--dump-features] <lecturas.csv>");
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((csv_path, ReplayOptions { dump_features }))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Puntuando lecturas desde {:?}", csv_path);

    let config = ServiceConfig::load()?;
    let mut classifier = PostureClassifier::new(&config.model_path, &config.labels_path)?;

    let readings = load_readings_from_csv(&csv_path)?;
    println!("📄 {} lecturas cargadas\n", readings.len());

    for (idx, reading) in readings.iter().enumerate() {
        let calibrated = reading
            .sensors
            .map(|sensor| config.conversion.convert_sample(&sensor));
        let features = assemble(&calibrated);

        if opts.dump_features {
            println!("📊 Lectura {} - 18 features (orden exacto):", idx + 1);
            for (pos, value) in features.iter().enumerate() {
                println!("  {:02}: {:>12.6}", pos, value);
            }
        }

        let report = aggregate(classifier.predict(&features)?);

        println!("🎯 Lectura {} → total {}", idx + 1, report.total);
        for (label, score) in &report.scores {
            println!("  {:<18} {:>3}", label, score);
        }
        println!();
    }

    Ok(())
}
