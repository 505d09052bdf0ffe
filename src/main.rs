//! # jobrunner - Entry Point
//! src/main.rs
//!
//! Lee la configuración (CLI + entorno), inicializa el logging y arranca
//! el servidor.

use jobrunner::config::Config;
use jobrunner::logging;
use jobrunner::server::Server;

fn main() {
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = logging::init(&config.log_level, config.log_format) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let mut server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "failed to prepare server");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
