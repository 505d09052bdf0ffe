//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing-subscriber` para todo el proceso. El nivel base viene
//! de la configuración; si `RUST_LOG` está definido, tiene prioridad.

use clap::ValueEnum;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Formato de salida de los logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Texto compacto: timestamp LEVEL target - mensaje
    Compact,
    /// JSON Lines para logging estructurado
    Json,
}

/// Construye el filtro a partir del nivel configurado
fn build_env_filter(level: &str) -> Result<EnvFilter, String> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))
}

/// Instala el subscriber global
///
/// Retorna error si el nivel es inválido o si ya había un subscriber instalado.
pub fn init(level: &str, format: LogFormat) -> Result<(), String> {
    let filter = build_env_filter(level)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_span_events(FmtSpan::CLOSE);

    let installed = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed.map_err(|e| format!("Failed to install log subscriber: {}", e))?;

    tracing::debug!(level, ?format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_cli_value() {
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("compact", true), Ok(LogFormat::Compact));
        assert!(LogFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn test_level_filter_builds() {
        assert!(build_env_filter("info").is_ok());
        assert!(build_env_filter("jobrunner=debug,warn").is_ok());
    }
}
