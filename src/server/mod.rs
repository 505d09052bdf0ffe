//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP que escucha en un puerto, lee requests HTTP/1.0 completos
//! y los despacha al router, un thread por conexión.

pub mod tcp;

pub use tcp::Server;
