pub mod config;
pub mod csv_loader;
pub mod feature_vector;
pub mod pipeline;
pub mod posture_classifier;
pub mod sample_parser;
pub mod score_aggregator;
pub mod server;
pub mod types;
pub mod unit_converter;
