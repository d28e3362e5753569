//! Logging and trace export for PivotHire
//!
//! Installs a `tracing-subscriber` registry with a text or JSON console
//! layer and, when an exporter is configured, OTLP span export.

mod resource;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use pivothire_config::{ExportProtocol, ExporterConfig, LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps exporters alive; flushes and shuts them down on drop
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown tracer provider: {e}");
        }
    }
}

/// Initialize logging and optional trace export
///
/// `log_filter` is an `EnvFilter` directive; an invalid one falls back to
/// `info`. The returned guard must be held for the lifetime of the process.
///
/// # Errors
///
/// Returns an error if the OTLP exporter cannot be built
pub fn init(config: Option<&TelemetryConfig>, log_filter: &str) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let format = config.map(|c| c.log_format).unwrap_or_default();

    let mut guard = TelemetryGuard { tracer_provider: None };

    let exporter = config.and_then(|c| c.exporter.as_ref().map(|exporter| (c, exporter)));

    let otel_layer = match exporter {
        Some((telemetry_config, exporter_config)) => {
            let tracer_provider = init_tracer(telemetry_config, exporter_config)?;
            let tracer = tracer_provider.tracer("pivothire");
            global::set_tracer_provider(tracer_provider.clone());
            guard.tracer_provider = Some(tracer_provider);

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt_layer(format))
        .with(otel_layer)
        .with(filter)
        .init();

    Ok(guard)
}

/// Console layer in the configured format
fn fmt_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
    }
}

/// Build the OTLP tracer provider
fn init_tracer(config: &TelemetryConfig, exporter_config: &ExporterConfig) -> anyhow::Result<SdkTracerProvider> {
    let exporter = build_span_exporter(exporter_config)?;

    let provider = SdkTracerProvider::builder()
        .with_resource(resource::build_resource(config))
        .with_batch_exporter(exporter)
        .build();

    Ok(provider)
}

/// Build OTLP span exporter based on protocol
fn build_span_exporter(config: &ExporterConfig) -> anyhow::Result<opentelemetry_otlp::SpanExporter> {
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};

    let exporter = match config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build gRPC span exporter: {e}"))?,
        ExportProtocol::HttpProto => SpanExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP span exporter: {e}"))?,
    };

    Ok(exporter)
}
