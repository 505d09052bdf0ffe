//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Implementación del protocolo HTTP/1.0 desde cero, sin librerías de alto
//! nivel. Incluye:
//!
//! - Parsing de requests (headers + body binario)
//! - Bodies `application/x-www-form-urlencoded` y `multipart/form-data`
//! - Construcción de responses
//! - Códigos de estado
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 16\r\n
//! \r\n
//! {"success":true}
//! ```

pub mod multipart;
pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
