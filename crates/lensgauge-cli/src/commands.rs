//! `serve` and `measure` commands.

use std::path::Path;

use anyhow::{Context, Result};
use lensgauge_api::Server;
use lensgauge_core::pipeline::save_result;
use lensgauge_core::{AnnotationStyle, GaugeConfig, Measurement, measure_bytes};

/// Apply command-line overrides to the server settings.
pub fn apply_serve_overrides(config: &mut GaugeConfig, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

/// Run the HTTP server until interrupted.
pub async fn serve(config: GaugeConfig) -> Result<()> {
    let server = Server::new(config).context("Failed to initialise server")?;
    server.run().await.context("Server terminated with an error")
}

/// Measure one local image, optionally writing the annotated copy.
pub fn measure(config: &GaugeConfig, image: &Path, output: Option<&Path>) -> Result<Measurement> {
    config.validate()?;
    let style = AnnotationStyle::from_font_setting(config.annotation.font.as_deref())?;
    let bytes =
        std::fs::read(image).with_context(|| format!("Failed to read {}", image.display()))?;

    let (measurement, annotated) = measure_bytes(&bytes, config, &style)
        .with_context(|| format!("Failed to measure {}", image.display()))?;

    if let Some(output) = output {
        save_result(&annotated, output)?;
    }
    Ok(measurement)
}
