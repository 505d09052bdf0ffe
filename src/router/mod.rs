//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(método, path)` a handlers.
//!
//! ```text
//! Request → Router → Handler(&Request, &AppState) → Response
//! ```
//!
//! Si ninguna ruta coincide, los GET/HEAD se sirven como archivos estáticos
//! y el resto recibe 404. Un path registrado con otro método recibe 405.

pub mod assets;

use crate::http::{Method, Request, Response, StatusCode};
use crate::state::AppState;

/// Un handler recibe el Request y el estado compartido y retorna una Response
pub type Handler = fn(&Request, &AppState) -> Response;

/// Router que mapea rutas a handlers
pub struct Router {
    routes: Vec<(Method, String, Handler)>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    pub fn register(&mut self, method: Method, path: &str, handler: Handler) {
        self.routes.push((method, path.to_string(), handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request, state: &AppState) -> Response {
        let mut response = self.dispatch(request, state);
        Self::add_common_headers(&mut response);
        response
    }

    fn dispatch(&self, request: &Request, state: &AppState) -> Response {
        let path = request.path();
        let method = request.method();

        // HEAD se resuelve como GET; el servidor omite el body
        let lookup_method = if method == Method::HEAD { Method::GET } else { method };

        if let Some((_, _, handler)) = self
            .routes
            .iter()
            .find(|(m, p, _)| *m == lookup_method && p == path)
        {
            return handler(request, state);
        }

        let path_known = self.routes.iter().any(|(_, p, _)| p == path);

        match method {
            // Preflight de CORS
            Method::OPTIONS => Response::new(StatusCode::NoContent),
            _ if path_known => {
                Response::error(StatusCode::MethodNotAllowed, &format!("Method not allowed: {}", method.as_str()))
            }
            Method::GET | Method::HEAD => assets::serve(path, &state.public_dir),
            _ => Response::error(StatusCode::NotFound, &format!("Route not found: {}", path)),
        }
    }

    /// Headers comunes a todas las respuestas
    fn add_common_headers(response: &mut Response) {
        response.add_header("Server", "jobrunner/0.1");
        response.add_header("Connection", "close");
        response.add_header("Access-Control-Allow-Origin", "*");
        response.add_header("Access-Control-Allow-Methods", "GET, POST");
        response.add_header("Access-Control-Allow-Headers", "Content-Type");
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::registry::{JobRegistry, RegistryConfig};
    use crate::storage::ArtifactStore;
    use serde_json::json;

    fn test_state(dir: &std::path::Path) -> AppState {
        AppState::new(
            JobRegistry::new(RegistryConfig::default()),
            ArtifactStore::new(dir.join("data")).unwrap(),
            dir.join("public"),
        )
    }

    fn ok_handler(_req: &Request, _state: &AppState) -> Response {
        Response::json(&json!({ "test": "ok" }))
    }

    #[test]
    fn test_route_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let mut router = Router::new();
        router.register(Method::POST, "/test", ok_handler);

        let request = Request::parse(b"POST /test HTTP/1.0\r\n\r\n").unwrap();
        let response = router.route(&request, &state);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_route_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let router = Router::new();

        let request = Request::parse(b"POST /nonexistent HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(router.route(&request, &state).status(), StatusCode::NotFound);
    }

    #[test]
    fn test_wrong_method() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let mut router = Router::new();
        router.register(Method::POST, "/test", ok_handler);

        let request = Request::parse(b"GET /test HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(router.route(&request, &state).status(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn test_options_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let mut router = Router::new();
        router.register(Method::POST, "/test", ok_handler);

        let request = Request::parse(b"OPTIONS /test HTTP/1.0\r\n\r\n").unwrap();
        let response = router.route(&request, &state);

        assert_eq!(response.status(), StatusCode::NoContent);
        assert_eq!(response.header("Access-Control-Allow-Methods"), Some("GET, POST"));
    }

    #[test]
    fn test_get_falls_back_to_static_files() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        std::fs::create_dir_all(&state.public_dir).unwrap();
        std::fs::write(state.public_dir.join("index.html"), "<h1>hola</h1>").unwrap();

        let router = Router::new();
        let request = Request::parse(b"GET / HTTP/1.0\r\n\r\n").unwrap();
        let response = router.route(&request, &state);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"<h1>hola</h1>");
    }
}
