//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./jobrunner --port 3000 --max-jobs 4 --default-duration 20
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! PORT=3000 MAX_JOBS=4 LOG_FORMAT=json ./jobrunner
//! ```

use crate::logging::LogFormat;
use clap::Parser;

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "jobrunner")]
#[command(about = "Servidor HTTP/1.0 que ejecuta trabajos sobre archivos subidos")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "3000", env = "PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HOST")]
    pub host: String,

    /// Directorio donde se guardan los archivos subidos
    #[arg(long, default_value = "./.data", env = "DATA_DIR")]
    pub data_dir: String,

    /// Directorio de archivos estáticos (index.html, js, css)
    #[arg(long, default_value = "./public", env = "PUBLIC_DIR")]
    pub public_dir: String,

    // === Jobs ===

    /// Máximo de jobs registrados simultáneamente
    #[arg(long = "max-jobs", default_value = "1", env = "MAX_JOBS")]
    pub max_jobs: usize,

    /// Duración de un job cuando el cliente no envía `time` (segundos)
    #[arg(long = "default-duration", default_value = "10", env = "DEFAULT_DURATION_SECS")]
    pub default_duration_secs: u64,

    /// Frecuencia del loop de progreso (pasos por segundo)
    #[arg(long = "steps-per-second", default_value = "10", env = "STEPS_PER_SECOND")]
    pub steps_per_second: u64,

    // === Límites ===

    /// Tamaño máximo del body de un request (bytes)
    #[arg(long = "max-body-bytes", default_value = "10485760", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // === Logging ===

    /// Nivel de log (error, warn, info, debug, trace); RUST_LOG tiene prioridad
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Formato de log: compact o json
    #[arg(long = "log-format", default_value = "compact", env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use jobrunner::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:3000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.max_jobs == 0 {
            return Err("Max jobs must be >= 1".to_string());
        }
        if self.steps_per_second == 0 {
            return Err("Steps per second must be >= 1".to_string());
        }
        if self.steps_per_second > 1000 {
            return Err("Steps per second must be <= 1000".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("Max body bytes must be > 0".to_string());
        }
        if self.data_dir.trim().is_empty() {
            return Err("Data dir must not be empty".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║                jobrunner HTTP/1.0 Server                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Data dir:     {}", self.data_dir);
        println!("   Public dir:   {}", self.public_dir);
        println!("   Max body:     {} bytes", self.max_body_bytes);
        println!();
        println!("👷 Jobs:");
        println!("   Capacity:     {}", self.max_jobs);
        println!("   Duration:     {} s (default)", self.default_duration_secs);
        println!("   Frequency:    {} steps/s", self.steps_per_second);
        println!();
        println!("📝 Logging:");
        println!("   Level:        {}", self.log_level);
        println!("   Format:       {:?}", self.log_format);
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            data_dir: "./.data".to_string(),
            public_dir: "./public".to_string(),
            max_jobs: 1,
            default_duration_secs: 10,
            steps_per_second: 10,
            max_body_bytes: 10 * 1024 * 1024,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_jobs, 1);
        assert_eq!(config.default_duration_secs, 10);
        assert_eq!(config.steps_per_second, 10);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 8080;
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.max_jobs = 0;
        assert!(config.validate().unwrap_err().contains("Max jobs"));
    }

    #[test]
    fn test_validate_steps_per_second() {
        let mut config = Config::default();
        config.steps_per_second = 0;
        assert!(config.validate().unwrap_err().contains("Steps per second"));

        config.steps_per_second = 5000;
        assert!(config.validate().is_err());

        config.steps_per_second = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_body_limit() {
        let mut config = Config::default();
        config.max_body_bytes = 0;
        assert!(config.validate().unwrap_err().contains("Max body"));
    }

    #[test]
    fn test_parse_cli_args() {
        let config = Config::try_parse_from([
            "jobrunner",
            "--port",
            "9000",
            "--max-jobs",
            "3",
            "--default-duration",
            "2",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.max_jobs, 3);
        assert_eq!(config.default_duration_secs, 2);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_parse_rejects_unknown_log_format() {
        let result = Config::try_parse_from(["jobrunner", "--log-format", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_print_summary() {
        // No debe hacer panic
        Config::default().print_summary();
    }
}
