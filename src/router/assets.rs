//! # Archivos Estáticos
//! src/router/assets.rs
//!
//! Sirve archivos del directorio público (la interfaz web). `/` se resuelve
//! a `index.html`. Nunca se sale del directorio público.

use crate::http::{Response, StatusCode};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Sirve un archivo estático para el path pedido
pub fn serve(request_path: &str, public_dir: &Path) -> Response {
    let Some(path) = resolve(request_path, public_dir) else {
        return Response::error(StatusCode::Forbidden, "Forbidden path");
    };

    match fs::read(&path) {
        Ok(content) => Response::new(StatusCode::Ok)
            .with_header("Content-Type", content_type(&path))
            .with_body_bytes(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Response::error(StatusCode::NotFound, &format!("Route not found: {}", request_path))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read static file");
            Response::internal_error()
        }
    }
}

/// Traduce el path HTTP a una ruta dentro de `public_dir`
///
/// Retorna `None` si el path intenta salir del directorio (`..`, rutas absolutas).
fn resolve(request_path: &str, public_dir: &Path) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() { "index.html" } else { relative };

    let mut resolved = public_dir.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if resolved.is_dir() {
        resolved.push("index.html");
    }

    Some(resolved)
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
