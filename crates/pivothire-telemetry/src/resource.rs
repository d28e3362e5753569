use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource as semconv;
use pivothire_config::TelemetryConfig;

/// Describe this process to the trace collector
pub fn build_resource(config: &TelemetryConfig) -> Resource {
    Resource::builder()
        .with_attributes([
            KeyValue::new(semconv::SERVICE_NAME, config.service_name.clone()),
            KeyValue::new(semconv::SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        ])
        .build()
}
