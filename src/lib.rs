//! # jobrunner
//! src/lib.rs
//!
//! Servidor HTTP/1.0 que recibe archivos, ejecuta un trabajo simulado por
//! cada uno y entrega el resultado una sola vez.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests (incluye multipart) y construcción de responses
//! - `router`: enrutamiento a handlers y archivos estáticos
//! - `server`: aceptación de conexiones, un thread por conexión
//! - `jobs`: registro acotado de jobs y su máquina de estados
//! - `storage`: almacén en disco de los archivos subidos
//! - `config` / `logging`: CLI, variables de entorno y `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use jobrunner::config::Config;
//! use jobrunner::server::Server;
//!
//! let config = Config::default();
//! let mut server = Server::new(config).expect("data dir");
//! server.run().expect("server");
//! ```

pub mod config;
pub mod http;
pub mod jobs;
pub mod logging;
pub mod router;
pub mod server;
pub mod state;
pub mod storage;
