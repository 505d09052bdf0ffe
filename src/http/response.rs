//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP/1.0 y convertirlas a bytes para
//! enviarlas al cliente.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use jobrunner::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"success": true}"#);
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::StatusCode;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers HTTP (ordenados para que la salida sea estable)
    headers: BTreeMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (si ya existe, se sobrescribe)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo desde un string y calcula `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes (archivos descargados, etc.)
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Respuesta JSON con el código de estado dado
    pub fn json_with_status(status: StatusCode, value: &Value) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&value.to_string())
    }

    /// Respuesta JSON exitosa (200 OK)
    pub fn json(value: &Value) -> Self {
        Self::json_with_status(StatusCode::Ok, value)
    }

    /// Respuesta de error con mensaje JSON
    ///
    /// Formato: `{"success": false, "error": "mensaje"}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json_with_status(status, &json!({ "success": false, "error": message }))
    }

    /// Respuesta genérica para fallos internos (no expone detalles)
    pub fn internal_error() -> Self {
        Self::error(
            StatusCode::InternalServerError,
            "An internal error occurred. Please try again or contact system admin.",
        )
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.body.len() + 256);

        // 1. Status line
        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        // 2. Headers
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");

        // 4. Body
        result.extend_from_slice(&self.body);

        result
    }

    /// Igual que `to_bytes` pero sin body (respuestas a HEAD)
    pub fn head_bytes(&self) -> Vec<u8> {
        let bytes = self.to_bytes();
        bytes[..bytes.len() - self.body.len()].to_vec()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Interpreta el body como JSON
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}
