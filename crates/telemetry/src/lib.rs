//! Tracing subscriber bootstrap.

use anyhow::Context;
use shopfront_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
///
/// Returns `Ok(false)` when a subscriber was already installed (tests, embedding).
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<bool> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .try_init(),
    };

    match installed {
        Ok(()) => {
            tracing::info!(
                target: "shopfront-telemetry",
                format = ?settings.log_format,
                "telemetry initialized"
            );
            Ok(true)
        }
        Err(err) => {
            tracing::debug!(
                target: "shopfront-telemetry",
                error = %err,
                "subscriber already installed"
            );
            Ok(false)
        }
    }
}

fn build_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .with_context(|| format!("invalid log filter '{}'", settings.filter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_parsed() {
        let settings = TelemetrySettings {
            log_format: LogFormat::Json,
            filter: "info,shopfront_db=debug".to_string(),
        };
        assert!(build_filter(&settings).is_ok());
    }

    #[test]
    fn second_init_reports_existing_subscriber() {
        let settings = TelemetrySettings::default();
        let _ = init(&settings).unwrap();
        assert!(!init(&settings).unwrap());
    }
}
