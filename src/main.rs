//! Crop Advisor - Main Entry Point
//!
//! Loads the trained artifacts, asks for soil and weather measurements on the
//! terminal and prints the recommended crop.

use anyhow::{Context, Result};
use crop_advisor::{
    config::{AppConfig, LoggingConfig, OutputFormat},
    metrics::InferenceMetrics,
    ArtifactStore, InferenceEngine, InputCollector,
};
use std::io::{self, Write};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn")
            .add_directive(format!("crop_advisor={}", logging.level).parse()?),
    };

    // Logs go to stderr so they do not interleave with the form.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Crop Advisor");

    let engine = InferenceEngine::new(ArtifactStore::from_config(&config.artifacts))
        .with_alternatives(config.output.alternatives);

    // A broken artifact set is fatal before the form is shown
    let artifacts = engine
        .warm_up()
        .context("Failed to load the trained artifacts")?;
    info!(
        classifier = artifacts.classifier().name(),
        crops = artifacts.label_encoder().len(),
        "Inference engine initialized"
    );

    let metrics = InferenceMetrics::new();
    let stdin = io::stdin();
    let mut collector = InputCollector::new(stdin.lock(), io::stdout());

    loop {
        let Some(features) = collector.collect()? else {
            break;
        };

        let started = Instant::now();
        match engine.recommend(&features) {
            Ok(recommendation) => {
                metrics.record_prediction(started.elapsed(), &recommendation.crop);
                info!(
                    recommendation_id = %recommendation.recommendation_id,
                    crop = %recommendation.crop,
                    confidence = recommendation.confidence,
                    latency_us = started.elapsed().as_micros() as u64,
                    "Recommendation made"
                );

                let out = collector.writer();
                match config.output.format {
                    OutputFormat::Text => writeln!(out, "\n{}\n", recommendation.render_text())?,
                    OutputFormat::Json => {
                        serde_json::to_writer(&mut *out, &recommendation)?;
                        writeln!(out)?;
                    }
                }
            }
            Err(e) => {
                metrics.record_failure(e.kind());
                error!(error = %e, "Recommendation failed");
                writeln!(collector.writer(), "\nCould not make a recommendation: {}\n", e)?;
            }
        }

        if !collector.confirm("Get another recommendation?")? {
            break;
        }
    }

    info!("Crop Advisor shutting down...");
    metrics.print_summary();

    Ok(())
}
