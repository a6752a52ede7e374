//! Logging and tracing setup.

use crate::settings::{LogFormat, TelemetrySettings};
use animebot_error::{AnimebotError, AnimebotResult, ConfigError};
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use opentelemetry_stdout::SpanExporter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Keeps the tracer provider alive until shutdown.
#[derive(Debug, Default)]
pub struct Telemetry {
    provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    /// Flush and stop span export.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to shut down tracer provider");
            }
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the default `info` filter. With
/// `otel_stdout` set, spans are also bridged to OpenTelemetry and exported
/// to stdout.
///
/// # Errors
///
/// Returns a configuration error if the filter is invalid or a subscriber
/// is already installed.
pub fn init_observability(settings: &TelemetrySettings) -> AnimebotResult<Telemetry> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        .map_err(|e| config_error(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = match settings.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed(),
    };

    let provider = settings.otel_stdout.then(|| {
        let resource = Resource::builder()
            .with_service_name(settings.service_name.clone())
            .with_attributes(vec![KeyValue::new(
                "service.version",
                env!("CARGO_PKG_VERSION"),
            )])
            .build();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(SpanExporter::default())
            .with_resource(resource)
            .build();
        global::set_tracer_provider(provider.clone());
        provider
    });

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(settings.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| config_error(format!("Failed to install subscriber: {}", e)))?;

    Ok(Telemetry { provider })
}

fn config_error(message: String) -> AnimebotError {
    AnimebotError::from(ConfigError::new(message))
}
