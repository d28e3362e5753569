use serde::Deserialize;
use url::Url;

/// Logging and trace export configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Service name attached to exported spans
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Console log format
    #[serde(default)]
    pub log_format: LogFormat,
    /// OTLP span exporter; spans stay local when absent
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_format: LogFormat::default(),
            exporter: None,
        }
    }
}

/// Console log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// OTLP exporter endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    /// Collector endpoint
    pub endpoint: Url,
    /// Transport protocol
    #[serde(default)]
    pub protocol: ExportProtocol,
}

/// OTLP transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProtocol {
    /// gRPC via tonic
    #[default]
    Grpc,
    /// Protobuf over HTTP
    HttpProto,
}

fn default_service_name() -> String {
    "pivothire".to_owned()
}
